//! Declarative field definitions
//!
//! A [`FieldDefinition`] describes one custom field: its name, the type tag
//! used to look up behaviour in the registry, presentation metadata and the
//! validation constraints. It carries no behaviour of its own.

use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type CallbackFn = dyn Fn(&FieldValue, &FieldDefinition) -> bool + Send + Sync;

/// Caller-supplied predicate evaluated last by the rule engine
#[derive(Clone)]
pub struct ValidationCallback(Arc<CallbackFn>);

impl ValidationCallback {
	pub fn new<F>(callback: F) -> Self
	where
		F: Fn(&FieldValue, &FieldDefinition) -> bool + Send + Sync + 'static,
	{
		Self(Arc::new(callback))
	}

	pub fn call(&self, value: &FieldValue, field: &FieldDefinition) -> bool {
		(self.0)(value, field)
	}
}

impl fmt::Debug for ValidationCallback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ValidationCallback(..)")
	}
}

/// Generic rules shared by every field type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationRules {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_length: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_length: Option<usize>,
	/// Regular expression the whole value must match
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pattern: Option<String>,
	#[serde(skip)]
	pub callback: Option<ValidationCallback>,
}

/// Description of one custom field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDefinition {
	pub name: String,
	#[serde(rename = "type")]
	pub field_type: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub placeholder: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
	/// Extra markup attributes; `true` renders bare, `false`/`null` are omitted
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, serde_json::Value>,
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub validation: ValidationRules,
	/// Lower bound: a number for numeric types, an ISO string for temporal ones
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub precision: Option<u32>,
	/// Ordered `(key, label)` choices for select-like types
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub options: Vec<(String, String)>,
	/// Lower-case file extensions accepted by file-like types
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub allowed_types: Vec<String>,
	/// Maximum attachment size in bytes
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_size: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub separator: Option<String>,
	/// strftime pattern overriding the configured display format
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_format: Option<String>,
}

impl FieldDefinition {
	/// Create a new definition for the given name and type tag
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldDefinition;
	///
	/// let field = FieldDefinition::new("price", "decimal");
	/// assert_eq!(field.name, "price");
	/// assert_eq!(field.field_type, "decimal");
	/// assert!(!field.required);
	/// ```
	pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			field_type: field_type.into(),
			..Default::default()
		}
	}

	/// Mark the field as required
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldDefinition;
	///
	/// let field = FieldDefinition::new("title", "text").required();
	/// assert!(field.required);
	/// ```
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = Some(placeholder.into());
		self
	}

	pub fn with_class(mut self, class: impl Into<String>) -> Self {
		self.class = Some(class.into());
		self
	}

	/// Add a free-form markup attribute
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldDefinition;
	/// use serde_json::json;
	///
	/// let field = FieldDefinition::new("bio", "textarea")
	///     .with_attribute("rows", 6)
	///     .with_attribute("spellcheck", true);
	/// assert_eq!(field.attributes.get("rows"), Some(&json!(6)));
	/// ```
	pub fn with_attribute(
		mut self,
		name: impl Into<String>,
		value: impl Into<serde_json::Value>,
	) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	pub fn with_min_length(mut self, min_length: usize) -> Self {
		self.validation.min_length = Some(min_length);
		self
	}

	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.validation.max_length = Some(max_length);
		self
	}

	pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.validation.pattern = Some(pattern.into());
		self
	}

	/// Attach a caller-supplied predicate
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldDefinition;
	///
	/// let field = FieldDefinition::new("code", "text")
	///     .with_callback(|value, _| value.as_str().is_some_and(|s| s.starts_with("DL-")));
	/// assert!(field.validation.callback.is_some());
	/// ```
	pub fn with_callback<F>(mut self, callback: F) -> Self
	where
		F: Fn(&FieldValue, &FieldDefinition) -> bool + Send + Sync + 'static,
	{
		self.validation.callback = Some(ValidationCallback::new(callback));
		self
	}

	pub fn with_min(mut self, min: impl Into<serde_json::Value>) -> Self {
		self.min = Some(min.into());
		self
	}

	pub fn with_max(mut self, max: impl Into<serde_json::Value>) -> Self {
		self.max = Some(max.into());
		self
	}

	pub fn with_step(mut self, step: impl Into<serde_json::Value>) -> Self {
		self.step = Some(step.into());
		self
	}

	pub fn with_precision(mut self, precision: u32) -> Self {
		self.precision = Some(precision);
		self
	}

	/// Append one `(key, label)` choice
	pub fn with_option(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
		self.options.push((key.into(), label.into()));
		self
	}

	/// Append several choices in order
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldDefinition;
	///
	/// let field = FieldDefinition::new("amenities", "checkbox_group")
	///     .with_options([("wifi", "Wi-Fi"), ("pool", "Pool")]);
	/// assert!(field.has_option("pool"));
	/// assert_eq!(field.option_label("wifi"), Some("Wi-Fi"));
	/// ```
	pub fn with_options<I, K, L>(mut self, options: I) -> Self
	where
		I: IntoIterator<Item = (K, L)>,
		K: Into<String>,
		L: Into<String>,
	{
		self.options
			.extend(options.into_iter().map(|(k, l)| (k.into(), l.into())));
		self
	}

	pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.allowed_types = types
			.into_iter()
			.map(|t| {
				let t: String = t.into();
				t.trim_start_matches('.').to_lowercase()
			})
			.collect();
		self
	}

	pub fn with_max_size(mut self, max_size: u64) -> Self {
		self.max_size = Some(max_size);
		self
	}

	pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = Some(separator.into());
		self
	}

	pub fn with_display_format(mut self, format: impl Into<String>) -> Self {
		self.display_format = Some(format.into());
		self
	}

	pub fn has_option(&self, key: &str) -> bool {
		self.options.iter().any(|(k, _)| k == key)
	}

	pub fn option_label(&self, key: &str) -> Option<&str> {
		self.options
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, label)| label.as_str())
	}

	/// Label to display, falling back to the field name
	pub fn display_label(&self) -> &str {
		self.label.as_deref().unwrap_or(&self.name)
	}

	/// Numeric lower bound, if one is configured
	pub fn min_number(&self) -> Option<f64> {
		self.min.as_ref().and_then(json_number)
	}

	pub fn max_number(&self) -> Option<f64> {
		self.max.as_ref().and_then(json_number)
	}

	/// String lower bound, if one is configured (temporal types)
	pub fn min_str(&self) -> Option<&str> {
		self.min.as_ref().and_then(non_empty_str)
	}

	pub fn max_str(&self) -> Option<&str> {
		self.max.as_ref().and_then(non_empty_str)
	}

	/// Whether an extension passes the `allowed_types` list (empty list allows all)
	pub fn allows_extension(&self, extension: &str) -> bool {
		self.allowed_types.is_empty()
			|| self
				.allowed_types
				.iter()
				.any(|allowed| allowed.eq_ignore_ascii_case(extension))
	}
}

fn json_number(value: &serde_json::Value) -> Option<f64> {
	match value {
		serde_json::Value::Number(n) => n.as_f64(),
		serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
		_ => None,
	}
}

fn non_empty_str(value: &serde_json::Value) -> Option<&str> {
	value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
