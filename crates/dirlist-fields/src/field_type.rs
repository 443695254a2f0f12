//! The contract every field type implements
//!
//! Most methods have defaults that suit plain text values; concrete types
//! override only what differs. The free functions at the bottom are the
//! shared building blocks those overrides reach for.

use crate::definition::FieldDefinition;
use crate::error::{FieldResult, ValidationError};
use crate::markup::{escape_html, strip_tags};
use crate::rules;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cross-cutting behaviours a field type may take part in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
	/// Values are indexed for keyword search
	Searchable,
	/// Values can narrow listing queries
	Filterable,
	/// Values can order listing queries
	Sortable,
	/// The field may appear inside repeatable groups
	Repeater,
}

impl Feature {
	pub const ALL: [Feature; 4] = [
		Feature::Searchable,
		Feature::Filterable,
		Feature::Sortable,
		Feature::Repeater,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Feature::Searchable => "searchable",
			Feature::Filterable => "filterable",
			Feature::Sortable => "sortable",
			Feature::Repeater => "repeater",
		}
	}
}

impl fmt::Display for Feature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Behaviour of one kind of custom field
///
/// Implementations are immutable once built and shared across threads.
///
/// # Examples
///
/// ```
/// use dirlist_fields::{FieldDefinition, FieldType, FieldValue, fields::TextField};
/// use serde_json::json;
///
/// let text = TextField::default();
/// let field = FieldDefinition::new("title", "text").required();
///
/// let value = text.sanitize(&json!("  <b>Joe's</b> Diner "));
/// assert_eq!(value, FieldValue::text("Joe's Diner"));
/// assert!(text.validate(&value, &field).is_ok());
/// assert_eq!(text.prepare_value_for_storage(&value), "Joe's Diner");
/// ```
pub trait FieldType: Send + Sync {
	/// Stable type tag
	fn field_type(&self) -> &'static str;

	fn features(&self) -> &'static [Feature] {
		&[]
	}

	fn supports(&self, feature: Feature) -> bool {
		self.features().contains(&feature)
	}

	/// Editable markup for the field
	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String;

	/// Coerce untrusted input into this type's canonical value; never fails
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Text(sanitize_line(&raw_to_string(raw)))
	}

	/// Like [`FieldType::sanitize`], for types whose coercion depends on the
	/// definition (decimal precision)
	fn sanitize_for(&self, raw: &serde_json::Value, _field: &FieldDefinition) -> FieldValue {
		self.sanitize(raw)
	}

	/// Whether the value counts as absent for the `required` gate
	fn is_value_empty(&self, value: &FieldValue) -> bool {
		rules::is_empty(value)
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		validate_base(self, value, field).map(|_| ())
	}

	/// Read-only display string; `""` for empty or unusable values
	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		format_plain(value)
	}

	/// The canonical "nothing set" value
	fn default_value(&self) -> FieldValue {
		FieldValue::text("")
	}

	fn prepare_value_for_storage(&self, value: &FieldValue) -> String {
		value.to_plain_string()
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		FieldValue::text(stored)
	}
}

/// Required gate followed by the generic rule engine
///
/// Returns `Ok(false)` when the value is empty on an optional field, in which
/// case no further checks apply; `Ok(true)` when type-specific checks should
/// run next.
pub fn validate_base<T>(field_type: &T, value: &FieldValue, field: &FieldDefinition) -> FieldResult<bool>
where
	T: FieldType + ?Sized,
{
	if field_type.is_value_empty(value) {
		if field.required {
			return Err(ValidationError::required());
		}
		return Ok(false);
	}
	rules::apply_validation_rules(value, field)?;
	Ok(true)
}

/// Scalar JSON input as a string; arrays, objects and `null` yield `""`
///
/// # Examples
///
/// ```
/// use dirlist_fields::field_type::raw_to_string;
/// use serde_json::json;
///
/// assert_eq!(raw_to_string(&json!("x")), "x");
/// assert_eq!(raw_to_string(&json!(12.5)), "12.5");
/// assert_eq!(raw_to_string(&json!(true)), "1");
/// assert_eq!(raw_to_string(&json!(false)), "");
/// assert_eq!(raw_to_string(&json!(["x"])), "");
/// ```
pub fn raw_to_string(raw: &serde_json::Value) -> String {
	match raw {
		serde_json::Value::String(s) => s.clone(),
		serde_json::Value::Number(n) => n.to_string(),
		serde_json::Value::Bool(true) => "1".to_string(),
		serde_json::Value::Bool(false)
		| serde_json::Value::Null
		| serde_json::Value::Array(_)
		| serde_json::Value::Object(_) => String::new(),
	}
}

/// Single-line text: tags stripped, whitespace runs collapsed, trimmed
pub fn sanitize_line(input: &str) -> String {
	strip_tags(input)
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
}

/// Multi-line text: tags stripped, line endings normalized, trimmed
pub fn sanitize_multiline(input: &str) -> String {
	strip_tags(input)
		.replace("\r\n", "\n")
		.replace('\r', "\n")
		.trim()
		.to_string()
}

/// Option key: tags stripped and trimmed, inner whitespace kept so keys
/// compare exactly against the definition's options
pub fn sanitize_key(input: &str) -> String {
	strip_tags(input).trim().to_string()
}

/// Elementwise [`sanitize_key`] over a JSON array; scalars become a
/// one-element list, blanks are dropped
pub fn sanitize_list(raw: &serde_json::Value) -> Vec<String> {
	let items: Vec<String> = match raw {
		serde_json::Value::Array(items) => items.iter().map(raw_to_string).collect(),
		serde_json::Value::Null => Vec::new(),
		other => vec![raw_to_string(other)],
	};
	items
		.iter()
		.map(|item| sanitize_key(item))
		.filter(|item| !item.is_empty())
		.collect()
}

/// Escaped scalar or `", "`-joined list
pub fn format_plain(value: &FieldValue) -> String {
	match value {
		FieldValue::List(items) => items
			.iter()
			.map(|item| escape_html(item))
			.collect::<Vec<_>>()
			.join(", "),
		other => escape_html(&other.to_plain_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorCode;
	use rstest::rstest;
	use serde_json::json;

	struct Plain;

	impl FieldType for Plain {
		fn field_type(&self) -> &'static str {
			"plain"
		}

		fn features(&self) -> &'static [Feature] {
			&[Feature::Searchable]
		}

		fn render(&self, _field: &FieldDefinition, value: &FieldValue) -> String {
			format_plain(value)
		}
	}

	#[rstest]
	fn test_default_methods() {
		// Arrange
		let plain = Plain;
		let field = FieldDefinition::new("note", "plain");

		// Act
		let value = plain.sanitize(&json!(" <i>hi</i>   there "));

		// Assert
		assert_eq!(value, FieldValue::text("hi there"));
		assert!(plain.supports(Feature::Searchable));
		assert!(!plain.supports(Feature::Sortable));
		assert_eq!(plain.default_value(), FieldValue::text(""));
		assert_eq!(plain.format_value(&FieldValue::text("a<b"), &field), "a&lt;b");
		assert_eq!(
			plain.prepare_value_from_storage(&plain.prepare_value_for_storage(&value)),
			value
		);
	}

	#[rstest]
	fn test_validate_base_gate() {
		// Arrange
		let plain = Plain;
		let optional = FieldDefinition::new("note", "plain").with_min_length(5);
		let required = optional.clone().required();

		// Act & Assert
		assert_eq!(validate_base(&plain, &FieldValue::text(""), &optional), Ok(false));
		assert_eq!(
			validate_base(&plain, &FieldValue::text(""), &required)
				.unwrap_err()
				.code,
			ErrorCode::Required
		);
		assert_eq!(
			validate_base(&plain, &FieldValue::text("abc"), &optional)
				.unwrap_err()
				.code,
			ErrorCode::MinLength
		);
		assert_eq!(validate_base(&plain, &FieldValue::text("abcdef"), &optional), Ok(true));
	}

	#[rstest]
	#[case(json!(["  wifi  ", "<b>pool</b>", "", 3]), vec!["wifi", "pool", "3"])]
	#[case(json!("single"), vec!["single"])]
	#[case(json!([" sea  view "]), vec!["sea  view"])]
	#[case(json!(null), vec![])]
	#[case(json!({"a": 1}), vec![])]
	fn test_sanitize_list(#[case] raw: serde_json::Value, #[case] expected: Vec<&str>) {
		assert_eq!(sanitize_list(&raw), expected);
	}

	#[rstest]
	fn test_sanitize_multiline_keeps_newlines() {
		assert_eq!(
			sanitize_multiline("  line one\r\n<b>line</b> two\n"),
			"line one\nline two"
		);
	}

	#[rstest]
	fn test_feature_serde_names() {
		assert_eq!(serde_json::to_value(Feature::Repeater).unwrap(), json!("repeater"));
		assert_eq!(Feature::Filterable.to_string(), "filterable");
	}
}
