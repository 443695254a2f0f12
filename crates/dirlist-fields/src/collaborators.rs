//! External collaborators consumed by field types
//!
//! The field types never reach out to a media library, an HTML sanitizer,
//! a locale or the site URL on their own. They receive these through the
//! traits below; every default implementation here is read-only after
//! construction and safe to share behind an `Arc`.

use crate::markup::escape_attr;
use crate::settings::FieldSettings;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Extensions treated as images when no MIME type is known
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "avif"];

/// A resolved media-store entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
	pub id: u64,
	pub url: String,
	pub file_path: String,
	pub mime_type: Option<String>,
	/// Size in bytes, when the store knows it
	pub size: Option<u64>,
	pub title: Option<String>,
}

impl Attachment {
	pub fn new(id: u64, url: impl Into<String>, file_path: impl Into<String>) -> Self {
		Self {
			id,
			url: url.into(),
			file_path: file_path.into(),
			mime_type: None,
			size: None,
			title: None,
		}
	}

	pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
		self.mime_type = Some(mime_type.into());
		self
	}

	pub fn with_size(mut self, size: u64) -> Self {
		self.size = Some(size);
		self
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	/// Last path segment of the stored file (or URL when no path is known)
	pub fn file_name(&self) -> &str {
		let source = if self.file_path.is_empty() {
			self.url.split(['?', '#']).next().unwrap_or(&self.url)
		} else {
			&self.file_path
		};
		source.rsplit(['/', '\\']).next().unwrap_or(source)
	}

	/// Lower-case extension of the file name
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::Attachment;
	///
	/// let file = Attachment::new(3, "https://cdn.test/menu.PDF?v=2", "");
	/// assert_eq!(file.extension().as_deref(), Some("pdf"));
	/// ```
	pub fn extension(&self) -> Option<String> {
		let name = self.file_name();
		let (stem, ext) = name.rsplit_once('.')?;
		if stem.is_empty() || ext.is_empty() {
			return None;
		}
		Some(ext.to_lowercase())
	}

	pub fn looks_like_image(&self) -> bool {
		match &self.mime_type {
			Some(mime) => mime.starts_with("image/"),
			None => self
				.extension()
				.is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str())),
		}
	}
}

/// Lookup into the external media store
pub trait AttachmentLookup: Send + Sync {
	fn resolve(&self, id: u64) -> Option<Attachment>;

	fn is_image(&self, id: u64) -> bool;

	/// Rich thumbnail markup, when the store can produce one
	fn thumbnail_html(&self, _id: u64) -> Option<String> {
		None
	}
}

/// Attachment store held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttachments {
	items: HashMap<u64, Attachment>,
}

impl InMemoryAttachments {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, attachment: Attachment) -> Option<Attachment> {
		self.items.insert(attachment.id, attachment)
	}

	/// Builder-style insert
	pub fn with(mut self, attachment: Attachment) -> Self {
		self.insert(attachment);
		self
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl AttachmentLookup for InMemoryAttachments {
	fn resolve(&self, id: u64) -> Option<Attachment> {
		self.items.get(&id).cloned()
	}

	fn is_image(&self, id: u64) -> bool {
		self.items.get(&id).is_some_and(Attachment::looks_like_image)
	}
}

/// Allow-list HTML sanitizer
pub trait HtmlSanitizer: Send + Sync {
	fn sanitize(&self, html: &str) -> String;
}

/// Tags whose content is dropped along with the tag
const DROP_CONTENT_TAGS: &[&str] = &[
	"script", "style", "iframe", "object", "embed", "noscript", "template", "textarea",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

const SAFE_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Default [`HtmlSanitizer`]: keeps allowed tags and attributes, unwraps
/// everything else, removes script-like elements with their content and
/// drops URL attributes with unsafe schemes. Output is stable under repeated
/// sanitization.
#[derive(Debug, Clone)]
pub struct AllowListSanitizer {
	tags: BTreeMap<String, Vec<String>>,
}

impl AllowListSanitizer {
	/// Sanitizer with the stock allow-list for listing descriptions
	pub fn new() -> Self {
		let mut sanitizer = Self::empty();
		for tag in [
			"p", "br", "hr", "strong", "b", "em", "i", "u", "s", "ul", "ol", "li", "blockquote",
			"code", "pre", "h2", "h3", "h4", "h5", "h6", "span",
		] {
			sanitizer.allow_tag(tag, &[]);
		}
		sanitizer.allow_tag("a", &["href", "title", "target", "rel"]);
		sanitizer.allow_tag("img", &["src", "alt", "width", "height"]);
		sanitizer
	}

	/// Sanitizer that allows nothing (plain text output)
	pub fn empty() -> Self {
		Self {
			tags: BTreeMap::new(),
		}
	}

	pub fn allow_tag(&mut self, tag: &str, attributes: &[&str]) -> &mut Self {
		self.tags.insert(
			tag.to_lowercase(),
			attributes.iter().map(|a| a.to_lowercase()).collect(),
		);
		self
	}

	pub fn is_allowed(&self, tag: &str) -> bool {
		self.tags.contains_key(tag)
	}
}

impl Default for AllowListSanitizer {
	fn default() -> Self {
		Self::new()
	}
}

impl HtmlSanitizer for AllowListSanitizer {
	fn sanitize(&self, html: &str) -> String {
		let chars: Vec<char> = html.chars().collect();
		let len = chars.len();
		let mut out = String::with_capacity(html.len());
		let mut i = 0;

		while i < len {
			match chars[i] {
				'<' => {
					let next = chars.get(i + 1).copied();
					match next {
						Some('!') | Some('?') => {
							i = skip_declaration(&chars, i);
						}
						Some('/') if chars.get(i + 2).is_some_and(|c| c.is_ascii_alphabetic()) => {
							let tag = parse_tag(&chars, i + 2);
							if self.is_allowed(&tag.name) && !VOID_TAGS.contains(&tag.name.as_str()) {
								out.push_str(&format!("</{}>", tag.name));
							}
							i = tag.end;
						}
						Some(c) if c.is_ascii_alphabetic() => {
							let tag = parse_tag(&chars, i + 1);
							if DROP_CONTENT_TAGS.contains(&tag.name.as_str()) {
								i = skip_element_content(&chars, tag.end, &tag.name);
								continue;
							}
							if let Some(allowed_attrs) = self.tags.get(&tag.name) {
								out.push('<');
								out.push_str(&tag.name);
								for (name, value) in &tag.attributes {
									if !allowed_attrs.contains(name) {
										continue;
									}
									if matches!(name.as_str(), "href" | "src") && !is_safe_url(value) {
										continue;
									}
									out.push_str(&format!(r#" {}="{}""#, name, escape_attr(value)));
								}
								if VOID_TAGS.contains(&tag.name.as_str()) {
									out.push_str(" />");
								} else {
									out.push('>');
								}
							}
							i = tag.end;
						}
						_ => {
							out.push_str("&lt;");
							i += 1;
						}
					}
				}
				'>' => {
					out.push_str("&gt;");
					i += 1;
				}
				c => {
					out.push(c);
					i += 1;
				}
			}
		}
		out
	}
}

struct ParsedTag {
	name: String,
	attributes: Vec<(String, String)>,
	/// Index just past the closing `>` (or end of input)
	end: usize,
}

fn parse_tag(chars: &[char], start: usize) -> ParsedTag {
	let len = chars.len();
	let mut i = start;
	let mut name = String::new();
	while i < len && (chars[i].is_ascii_alphanumeric() || chars[i] == '-') {
		name.push(chars[i].to_ascii_lowercase());
		i += 1;
	}

	let mut attributes = Vec::new();
	loop {
		while i < len && (chars[i].is_whitespace() || chars[i] == '/') {
			i += 1;
		}
		if i >= len {
			return ParsedTag { name, attributes, end: len };
		}
		if chars[i] == '>' {
			return ParsedTag {
				name,
				attributes,
				end: i + 1,
			};
		}

		let mut attr_name = String::new();
		while i < len && !chars[i].is_whitespace() && !matches!(chars[i], '=' | '>' | '/') {
			attr_name.push(chars[i].to_ascii_lowercase());
			i += 1;
		}
		while i < len && chars[i].is_whitespace() {
			i += 1;
		}

		let mut value = String::new();
		if i < len && chars[i] == '=' {
			i += 1;
			while i < len && chars[i].is_whitespace() {
				i += 1;
			}
			if i < len && (chars[i] == '"' || chars[i] == '\'') {
				let quote = chars[i];
				i += 1;
				while i < len && chars[i] != quote {
					value.push(chars[i]);
					i += 1;
				}
				i += 1;
			} else {
				while i < len && !chars[i].is_whitespace() && chars[i] != '>' {
					value.push(chars[i]);
					i += 1;
				}
			}
		}

		if !attr_name.is_empty() {
			attributes.push((attr_name, decode_entities(&value)));
		} else if i < len && chars[i] != '>' {
			i += 1;
		}
	}
}

fn skip_declaration(chars: &[char], start: usize) -> usize {
	let len = chars.len();
	if chars.get(start + 2) == Some(&'-') && chars.get(start + 3) == Some(&'-') {
		let mut i = start + 4;
		while i + 2 < len {
			if chars[i] == '-' && chars[i + 1] == '-' && chars[i + 2] == '>' {
				return i + 3;
			}
			i += 1;
		}
		return len;
	}
	chars[start..]
		.iter()
		.position(|&c| c == '>')
		.map(|p| start + p + 1)
		.unwrap_or(len)
}

fn skip_element_content(chars: &[char], start: usize, name: &str) -> usize {
	let len = chars.len();
	let closing: Vec<char> = format!("</{}", name).chars().collect();
	let mut i = start;
	while i + closing.len() <= len {
		let window = &chars[i..i + closing.len()];
		if window
			.iter()
			.zip(closing.iter())
			.all(|(a, b)| a.to_ascii_lowercase() == *b)
		{
			return chars[i..]
				.iter()
				.position(|&c| c == '>')
				.map(|p| i + p + 1)
				.unwrap_or(len);
		}
		i += 1;
	}
	len
}

fn decode_entities(value: &str) -> String {
	value
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&#x27;", "'")
		.replace("&#39;", "'")
		.replace("&#10;", "\n")
		.replace("&#13;", "\r")
		.replace("&amp;", "&")
}

fn is_safe_url(value: &str) -> bool {
	let compact: String = value
		.chars()
		.filter(|c| !c.is_whitespace() && !c.is_control())
		.collect::<String>()
		.to_lowercase();
	match compact.find(':') {
		Some(colon) => {
			let before = &compact[..colon];
			if before.contains(['/', '?', '#']) {
				return true;
			}
			SAFE_URL_SCHEMES.contains(&before)
		}
		None => true,
	}
}

/// Locale-aware formatting of dates and numbers
pub trait LocaleFormatter: Send + Sync {
	/// Format a UTC unix timestamp with a strftime pattern
	fn format_date(&self, timestamp: i64, pattern: &str) -> String;

	/// Format a number with `decimals` fraction digits and grouped thousands
	fn format_number(&self, value: f64, decimals: u32) -> String {
		group_number(value, decimals, ",", ".")
	}
}

/// Default [`LocaleFormatter`] backed by chrono's strftime implementation
#[derive(Debug, Clone)]
pub struct ChronoFormatter {
	thousands_separator: String,
	decimal_point: String,
}

impl ChronoFormatter {
	pub fn new(thousands_separator: impl Into<String>, decimal_point: impl Into<String>) -> Self {
		Self {
			thousands_separator: thousands_separator.into(),
			decimal_point: decimal_point.into(),
		}
	}

	pub fn from_settings(settings: &FieldSettings) -> Self {
		Self::new(&settings.thousands_separator, &settings.decimal_point)
	}
}

impl Default for ChronoFormatter {
	fn default() -> Self {
		Self::new(",", ".")
	}
}

impl LocaleFormatter for ChronoFormatter {
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{ChronoFormatter, LocaleFormatter};
	///
	/// let formatter = ChronoFormatter::default();
	/// // 2024-06-15T14:30:00Z
	/// assert_eq!(formatter.format_date(1_718_461_800, "%Y/%m/%d %H:%M"), "2024/06/15 14:30");
	/// assert_eq!(formatter.format_date(1_718_461_800, "%Q"), "");
	/// ```
	fn format_date(&self, timestamp: i64, pattern: &str) -> String {
		let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
		if items.iter().any(|item| matches!(item, Item::Error)) {
			tracing::warn!(pattern = %pattern, "invalid date display pattern");
			return String::new();
		}
		match DateTime::<Utc>::from_timestamp(timestamp, 0) {
			Some(dt) => dt.format_with_items(items.iter()).to_string(),
			None => String::new(),
		}
	}

	fn format_number(&self, value: f64, decimals: u32) -> String {
		group_number(
			value,
			decimals,
			&self.thousands_separator,
			&self.decimal_point,
		)
	}
}

/// Fixed-point rendering with grouped thousands
///
/// # Examples
///
/// ```
/// use dirlist_fields::collaborators::group_number;
///
/// assert_eq!(group_number(1234567.891, 2, ",", "."), "1,234,567.89");
/// assert_eq!(group_number(-1000.0, 0, ".", ","), "-1.000");
/// ```
pub fn group_number(value: f64, decimals: u32, thousands: &str, point: &str) -> String {
	if !value.is_finite() {
		return String::new();
	}
	let fixed = format!("{:.*}", decimals as usize, value.abs());
	let (int_part, frac_part) = match fixed.split_once('.') {
		Some((i, f)) => (i, Some(f)),
		None => (fixed.as_str(), None),
	};

	let digits: Vec<char> = int_part.chars().collect();
	let mut grouped = String::new();
	for (idx, digit) in digits.iter().enumerate() {
		if idx > 0 && (digits.len() - idx) % 3 == 0 {
			grouped.push_str(thousands);
		}
		grouped.push(*digit);
	}

	let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
	let mut out = String::new();
	if negative {
		out.push('-');
	}
	out.push_str(&grouped);
	if let Some(frac) = frac_part {
		out.push_str(point);
		out.push_str(frac);
	}
	out
}

/// Resolves the site's own host, used to tell internal from external links
pub trait HostUrlResolver: Send + Sync {
	fn home_host(&self) -> String;
}

/// Fixed host name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHost {
	host: String,
}

impl StaticHost {
	pub fn new(host: impl Into<String>) -> Self {
		Self {
			host: host.into().to_lowercase(),
		}
	}

	/// Take the host from a full URL such as the configured home URL
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{HostUrlResolver, StaticHost};
	///
	/// let host = StaticHost::from_url("https://Listings.Example.com/dir/").unwrap();
	/// assert_eq!(host.home_host(), "listings.example.com");
	/// assert!(StaticHost::from_url("not a url").is_none());
	/// ```
	pub fn from_url(home_url: &str) -> Option<Self> {
		let parsed = url::Url::parse(home_url).ok()?;
		parsed.host_str().map(Self::new)
	}
}

impl HostUrlResolver for StaticHost {
	fn home_host(&self) -> String {
		self.host.clone()
	}
}

/// The collaborator set handed to field types at construction
#[derive(Clone)]
pub struct Collaborators {
	pub attachments: Arc<dyn AttachmentLookup>,
	pub sanitizer: Arc<dyn HtmlSanitizer>,
	pub formatter: Arc<dyn LocaleFormatter>,
	pub host: Arc<dyn HostUrlResolver>,
}

impl Collaborators {
	/// Defaults derived from settings, with an empty attachment store
	pub fn from_settings(settings: &FieldSettings) -> Self {
		let host = StaticHost::from_url(&settings.home_url).unwrap_or_else(|| {
			tracing::warn!(home_url = %settings.home_url, "home_url has no host; falling back to localhost");
			StaticHost::new("localhost")
		});
		Self {
			attachments: Arc::new(InMemoryAttachments::new()),
			sanitizer: Arc::new(AllowListSanitizer::new()),
			formatter: Arc::new(ChronoFormatter::from_settings(settings)),
			host: Arc::new(host),
		}
	}

	pub fn with_attachments(mut self, attachments: Arc<dyn AttachmentLookup>) -> Self {
		self.attachments = attachments;
		self
	}

	pub fn with_sanitizer(mut self, sanitizer: Arc<dyn HtmlSanitizer>) -> Self {
		self.sanitizer = sanitizer;
		self
	}

	pub fn with_formatter(mut self, formatter: Arc<dyn LocaleFormatter>) -> Self {
		self.formatter = formatter;
		self
	}

	pub fn with_host(mut self, host: Arc<dyn HostUrlResolver>) -> Self {
		self.host = host;
		self
	}
}

impl Default for Collaborators {
	fn default() -> Self {
		Self::from_settings(&FieldSettings::default())
	}
}
