use crate::collaborators::{HostUrlResolver, StaticHost};
use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, sanitize_line, validate_base};
use crate::markup::{Attributes, Markup, escape_html, input_tag};
use crate::value::FieldValue;
use std::sync::Arc;

/// Schemes that never survive sanitizing
const BLOCKED_SCHEMES: &[&str] = &["javascript", "data", "vbscript"];

fn has_blocked_scheme(input: &str) -> bool {
	let compact: String = input
		.chars()
		.filter(|c| !c.is_whitespace() && !c.is_control())
		.collect::<String>()
		.to_lowercase();
	BLOCKED_SCHEMES
		.iter()
		.any(|scheme| compact.starts_with(&format!("{}:", scheme)))
}

/// Absolute `http`/`https` URL with a host
fn parse_web_url(input: &str) -> Option<url::Url> {
	let parsed = url::Url::parse(input).ok()?;
	if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
		return None;
	}
	Some(parsed)
}

fn bare_host(host: &str) -> &str {
	host.strip_prefix("www.").unwrap_or(host)
}

/// Web address
#[derive(Clone)]
pub struct UrlField {
	markup: Markup,
	host: Arc<dyn HostUrlResolver>,
}

impl UrlField {
	pub fn new(markup: Markup, host: Arc<dyn HostUrlResolver>) -> Self {
		Self { markup, host }
	}

	/// Whether a URL points away from the site's own host
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{Markup, StaticHost, fields::UrlField};
	/// use std::sync::Arc;
	///
	/// let url = UrlField::new(Markup::default(), Arc::new(StaticHost::new("listings.test")));
	/// assert!(url.is_external("https://example.com/menu"));
	/// assert!(!url.is_external("https://www.listings.test/about"));
	/// ```
	pub fn is_external(&self, value: &str) -> bool {
		let Some(parsed) = parse_web_url(value) else {
			return false;
		};
		let home = self.host.home_host().to_lowercase();
		match parsed.host_str() {
			Some(host) => bare_host(&host.to_lowercase()) != bare_host(&home),
			None => false,
		}
	}
}

impl Default for UrlField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(StaticHost::new("localhost")))
	}
}

impl std::fmt::Debug for UrlField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("UrlField")
			.field("markup", &self.markup)
			.finish_non_exhaustive()
	}
}

impl FieldType for UrlField {
	fn field_type(&self) -> &'static str {
		"url"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Searchable, Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let mut attrs = self.markup.input("url", field, value.as_str().unwrap_or_default());
		if field.placeholder.is_none() {
			attrs.set("placeholder", "https://");
		}
		attrs.set("inputmode", "url");
		self.markup.apply_custom(&mut attrs, field);
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// Script-capable schemes are dropped outright
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		let cleaned = sanitize_line(&raw_to_string(raw));
		if has_blocked_scheme(&cleaned) {
			return FieldValue::text("");
		}
		FieldValue::Text(cleaned.replace(' ', "%20"))
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		match value.as_str().and_then(parse_web_url) {
			Some(_) => Ok(()),
			None => Err(ValidationError::new(ErrorCode::InvalidUrl, "Enter a valid URL.")),
		}
	}

	/// Link with the protocol hidden; external hosts open in a new tab
	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		let Some(url) = value.as_str().filter(|s| parse_web_url(s).is_some()) else {
			return String::new();
		};
		let display = url
			.split_once("://")
			.map(|(_, rest)| rest)
			.unwrap_or(url)
			.trim_end_matches('/');

		let mut attrs = Attributes::new();
		attrs.set("href", url);
		if self.is_external(url) {
			attrs.set("target", "_blank").set("rel", "noopener noreferrer");
		}
		format!("<a{}>{}</a>", attrs.render(), escape_html(display))
	}
}
