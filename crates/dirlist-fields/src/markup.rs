//! Markup helpers shared by every field type
//!
//! Escaping, tag stripping, attribute string building and the id/name
//! derivation that ties rendered markup back to a field definition.

use crate::definition::FieldDefinition;

/// Escape HTML special characters
///
/// # Examples
///
/// ```
/// use dirlist_fields::markup::escape_html;
///
/// assert_eq!(
///     escape_html("<b>Tom & 'Jerry'</b>"),
///     "&lt;b&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
/// );
/// ```
pub fn escape_html(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			c => out.push(c),
		}
	}
	out
}

/// Escape a value placed inside a double-quoted attribute
pub fn escape_attr(input: &str) -> String {
	escape_html(input)
		.replace('\n', "&#10;")
		.replace('\r', "&#13;")
}

/// Strip HTML tags and comments, tolerating `>` inside quoted attributes
///
/// A `<` only opens a tag when a letter, `/`, `!` or `?` follows it and a
/// closing `>` exists; any other `<` is ordinary text. An unclosed comment
/// swallows the rest of the input. Passes repeat until nothing changes, so
/// the output never contains a tag.
///
/// # Examples
///
/// ```
/// use dirlist_fields::markup::strip_tags;
///
/// assert_eq!(strip_tags("<p>Hello <b>World</b></p>"), "Hello World");
/// assert_eq!(strip_tags(r#"<a title="x>y">Link</a>"#), "Link");
/// assert_eq!(strip_tags("Hello<!-- note -->World"), "HelloWorld");
/// assert_eq!(strip_tags("Kids <12 free, a < b, a<b"), "Kids <12 free, a < b, a<b");
/// ```
pub fn strip_tags(html: &str) -> String {
	let mut current = strip_pass(html);
	loop {
		let next = strip_pass(&current);
		if next == current {
			return current;
		}
		current = next;
	}
}

fn opens_tag(next: Option<char>) -> bool {
	next.is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

fn strip_pass(html: &str) -> String {
	let mut out = String::with_capacity(html.len());
	let mut rest = html;
	while let Some(start) = rest.find('<') {
		out.push_str(&rest[..start]);
		let body = &rest[start + 1..];
		if !opens_tag(body.chars().next()) {
			out.push('<');
			rest = body;
			continue;
		}
		match tag_len(body) {
			Some(len) => rest = &body[len..],
			None if body.starts_with("!--") => return out,
			// never closed, so not markup
			None => {
				out.push('<');
				rest = body;
			}
		}
	}
	out.push_str(rest);
	out
}

/// Byte length of a tag body up to and including its closing `>`
fn tag_len(body: &str) -> Option<usize> {
	if let Some(comment) = body.strip_prefix("!--") {
		return comment.find("-->").map(|pos| "!--".len() + pos + "-->".len());
	}
	let mut quote: Option<char> = None;
	for (pos, c) in body.char_indices() {
		match (quote, c) {
			(Some(open), c) if c == open => quote = None,
			(Some(_), _) => {}
			(None, '"' | '\'') => quote = Some(c),
			(None, '>') => return Some(pos + 1),
			_ => {}
		}
	}
	None
}

/// Attribute value as rendered into markup
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
	/// `true` renders the bare attribute name, `false` omits it
	Flag(bool),
	Text(String),
}

impl AttrValue {
	/// Convert a free-form JSON attribute; `null` yields `None`
	pub fn from_json(value: &serde_json::Value) -> Option<Self> {
		match value {
			serde_json::Value::Null => None,
			serde_json::Value::Bool(b) => Some(Self::Flag(*b)),
			serde_json::Value::String(s) => Some(Self::Text(s.clone())),
			serde_json::Value::Number(n) => Some(Self::Text(n.to_string())),
			serde_json::Value::Array(items) => Some(Self::Text(
				items
					.iter()
					.filter_map(|item| match item {
						serde_json::Value::String(s) => Some(s.clone()),
						serde_json::Value::Number(n) => Some(n.to_string()),
						_ => None,
					})
					.collect::<Vec<_>>()
					.join(" "),
			)),
			serde_json::Value::Object(_) => Some(Self::Text(value.to_string())),
		}
	}
}

impl From<bool> for AttrValue {
	fn from(value: bool) -> Self {
		Self::Flag(value)
	}
}

impl From<&str> for AttrValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<&String> for AttrValue {
	fn from(value: &String) -> Self {
		Self::Text(value.clone())
	}
}

/// Ordered attribute set; setting an existing name replaces its value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
	entries: Vec<(String, AttrValue)>,
}

impl Attributes {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
		let name = name.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(n, _)| *n == name) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((name, value)),
		}
		self
	}

	/// Set the attribute only when a value is present
	pub fn set_opt<V: Into<AttrValue>>(
		&mut self,
		name: impl Into<String>,
		value: Option<V>,
	) -> &mut Self {
		if let Some(value) = value {
			self.set(name, value);
		}
		self
	}

	pub fn get(&self, name: &str) -> Option<&AttrValue> {
		self.entries
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v)
	}

	pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
		let pos = self.entries.iter().position(|(n, _)| n == name)?;
		Some(self.entries.remove(pos).1)
	}

	/// Render as a string with a leading space per attribute
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::markup::Attributes;
	///
	/// let mut attrs = Attributes::new();
	/// attrs.set("type", "text").set("required", true).set("disabled", false);
	/// assert_eq!(attrs.render(), r#" type="text" required"#);
	/// ```
	pub fn render(&self) -> String {
		let mut out = String::new();
		for (name, value) in &self.entries {
			let name = sanitize_attr_name(name);
			if name.is_empty() {
				continue;
			}
			match value {
				AttrValue::Flag(true) => {
					out.push(' ');
					out.push_str(&name);
				}
				AttrValue::Flag(false) => {}
				AttrValue::Text(text) => {
					out.push_str(&format!(r#" {}="{}""#, name, escape_attr(text)));
				}
			}
		}
		out
	}
}

fn sanitize_attr_name(name: &str) -> String {
	name.chars()
		.filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
		.collect()
}

/// Derives element ids and form names from field names under a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
	namespace: String,
}

impl Markup {
	pub const DEFAULT_NAMESPACE: &'static str = "dirlist";

	pub fn new(namespace: impl Into<String>) -> Self {
		Self {
			namespace: namespace.into(),
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	/// Element id: `<namespace>-field-<name>`
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::markup::Markup;
	///
	/// let markup = Markup::new("dirlist");
	/// assert_eq!(markup.field_id("phone"), "dirlist-field-phone");
	/// assert_eq!(markup.field_name("phone"), "dirlist_field_phone");
	/// ```
	pub fn field_id(&self, name: &str) -> String {
		format!("{}-field-{}", self.namespace, name)
	}

	/// Form control name: `<namespace>_field_<name>`
	pub fn field_name(&self, name: &str) -> String {
		format!("{}_field_{}", self.namespace, name)
	}

	pub fn description_id(&self, name: &str) -> String {
		format!("{}-description", self.field_id(name))
	}

	/// Attributes every interactive control carries: id, name, class,
	/// placeholder, required semantics, description link and custom attributes
	pub fn base_attributes(&self, field: &FieldDefinition) -> Attributes {
		let mut attrs = Attributes::new();
		attrs
			.set("id", self.field_id(&field.name))
			.set("name", self.field_name(&field.name));
		attrs.set(
			"class",
			match &field.class {
				Some(class) => format!("{}-input {}", self.namespace, class),
				None => format!("{}-input", self.namespace),
			},
		);
		attrs.set_opt("placeholder", field.placeholder.as_deref());
		self.apply_required(&mut attrs, field);
		if field.description.is_some() {
			attrs.set("aria-describedby", self.description_id(&field.name));
		}
		self.apply_custom(&mut attrs, field);
		attrs
	}

	pub fn apply_required(&self, attrs: &mut Attributes, field: &FieldDefinition) {
		if field.required {
			attrs.set("required", true).set("aria-required", "true");
		}
	}

	/// Merge the definition's free-form attributes
	pub fn apply_custom(&self, attrs: &mut Attributes, field: &FieldDefinition) {
		for (name, value) in &field.attributes {
			match AttrValue::from_json(value) {
				Some(value) => {
					attrs.set(name.clone(), value);
				}
				None => {
					attrs.remove(name);
				}
			}
		}
	}

	pub fn label(&self, field: &FieldDefinition) -> String {
		self.label_for(field, &self.field_id(&field.name))
	}

	pub fn label_for(&self, field: &FieldDefinition, for_id: &str) -> String {
		format!(
			r#"<label for="{}">{}{}</label>"#,
			escape_attr(for_id),
			escape_html(field.display_label()),
			self.required_marker(field)
		)
	}

	/// Visual asterisk shown next to labels of required fields
	pub fn required_marker(&self, field: &FieldDefinition) -> &'static str {
		if field.required {
			r#" <span class="required" aria-hidden="true">*</span>"#
		} else {
			""
		}
	}

	/// `<legend>` for grouped controls rendered inside a fieldset
	pub fn legend(&self, field: &FieldDefinition) -> String {
		format!(
			"<legend>{}{}</legend>",
			escape_html(field.display_label()),
			self.required_marker(field)
		)
	}

	/// Description block, empty when the field has none
	pub fn description(&self, field: &FieldDefinition) -> String {
		match field.description.as_deref() {
			Some(text) => format!(
				r#"<p class="description" id="{}">{}</p>"#,
				escape_attr(&self.description_id(&field.name)),
				escape_html(text)
			),
			None => String::new(),
		}
	}

	/// Wrap a control with its label and description
	pub fn wrap(&self, field: &FieldDefinition, type_tag: &str, control: &str) -> String {
		self.wrap_with_label(field, type_tag, &self.label(field), control)
	}

	pub fn wrap_with_label(
		&self,
		field: &FieldDefinition,
		type_tag: &str,
		label: &str,
		control: &str,
	) -> String {
		format!(
			r#"<div class="{ns}-field {ns}-field-{tag}">{label}{control}{description}</div>"#,
			ns = self.namespace,
			tag = type_tag,
			label = label,
			control = control,
			description = self.description(field),
		)
	}

	/// Render a single `<input>` with the base attributes plus overrides
	pub fn input(&self, input_type: &str, field: &FieldDefinition, value: &str) -> Attributes {
		let mut attrs = Attributes::new();
		attrs.set("type", input_type);
		for (name, val) in self.base_attributes(field).entries {
			attrs.set(name, val);
		}
		attrs.set("value", value);
		attrs
	}
}

impl Default for Markup {
	fn default() -> Self {
		Self::new(Self::DEFAULT_NAMESPACE)
	}
}

/// Render a void `<input>` element from a prepared attribute set
pub fn input_tag(attrs: &Attributes) -> String {
	format!("<input{} />", attrs.render())
}
