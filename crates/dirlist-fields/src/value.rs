//! In-memory field values
//!
//! Every field type sanitizes raw input into one canonical [`FieldValue`]
//! shape. Validation, formatting and storage conversion only ever see
//! these shapes, never the raw `serde_json::Value` that came in.

use serde::{Deserialize, Serialize};

/// Start/end pair held by date range fields. Each side is an ISO date
/// (`YYYY-MM-DD`) or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
	#[serde(default)]
	pub start: String,
	#[serde(default)]
	pub end: String,
}

impl DateRange {
	pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
		Self {
			start: start.into(),
			end: end.into(),
		}
	}

	/// True when neither side carries a date
	pub fn is_blank(&self) -> bool {
		self.start.trim().is_empty() && self.end.trim().is_empty()
	}
}

/// Canonical in-memory value of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
	/// Nothing set (numeric fields)
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	Text(String),
	List(Vec<String>),
	Range(DateRange),
	/// Reference id into the media store; `0` means no file
	Attachment(u64),
}

impl FieldValue {
	/// Shorthand for a text value
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldValue;
	///
	/// assert_eq!(FieldValue::text("wifi"), FieldValue::Text("wifi".to_string()));
	/// ```
	pub fn text(value: impl Into<String>) -> Self {
		Self::Text(value.into())
	}

	/// Shorthand for a list value
	pub fn list<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::List(values.into_iter().map(Into::into).collect())
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Integer(i) => Some(*i),
			_ => None,
		}
	}

	/// Numeric view of the value; integers widen to `f64`
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Integer(i) => Some(*i as f64),
			Self::Float(f) => Some(*f),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[String]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_range(&self) -> Option<&DateRange> {
		match self {
			Self::Range(range) => Some(range),
			_ => None,
		}
	}

	pub fn as_attachment(&self) -> Option<u64> {
		match self {
			Self::Attachment(id) => Some(*id),
			_ => None,
		}
	}

	/// Raw-input form of this value
	///
	/// Feeding the result back into a field type's `sanitize` must yield the
	/// same value again.
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldValue;
	/// use serde_json::json;
	///
	/// assert_eq!(FieldValue::list(["wifi", "pool"]).to_json(), json!(["wifi", "pool"]));
	/// assert_eq!(FieldValue::Null.to_json(), json!(null));
	/// ```
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Self::Null => serde_json::Value::Null,
			Self::Bool(b) => serde_json::Value::Bool(*b),
			Self::Integer(i) => serde_json::json!(i),
			Self::Float(f) => serde_json::Number::from_f64(*f)
				.map(serde_json::Value::Number)
				.unwrap_or(serde_json::Value::Null),
			Self::Text(s) => serde_json::Value::String(s.clone()),
			Self::List(items) => serde_json::json!(items),
			Self::Range(range) => serde_json::json!({"start": range.start, "end": range.end}),
			Self::Attachment(id) => serde_json::json!(id),
		}
	}

	/// Plain string form used for length rules and generic display
	pub fn to_plain_string(&self) -> String {
		match self {
			Self::Null => String::new(),
			Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
			Self::Integer(i) => i.to_string(),
			Self::Float(f) => f.to_string(),
			Self::Text(s) => s.clone(),
			Self::List(items) => items.join(", "),
			Self::Range(range) => format!("{} - {}", range.start, range.end),
			Self::Attachment(id) => id.to_string(),
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

impl From<f64> for FieldValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<DateRange> for FieldValue {
	fn from(value: DateRange) -> Self {
		Self::Range(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_numeric_views() {
		// Arrange
		let int = FieldValue::Integer(7);
		let float = FieldValue::Float(2.5);

		// Act & Assert
		assert_eq!(int.as_f64(), Some(7.0));
		assert_eq!(int.as_i64(), Some(7));
		assert_eq!(float.as_f64(), Some(2.5));
		assert_eq!(float.as_i64(), None);
		assert_eq!(FieldValue::text("7").as_f64(), None);
	}

	#[rstest]
	fn test_range_to_json() {
		// Arrange
		let value = FieldValue::Range(DateRange::new("2024-06-15", ""));

		// Act
		let raw = value.to_json();

		// Assert
		assert_eq!(raw, json!({"start": "2024-06-15", "end": ""}));
	}

	#[rstest]
	#[case(DateRange::new("", ""), true)]
	#[case(DateRange::new("  ", ""), true)]
	#[case(DateRange::new("2024-06-15", ""), false)]
	#[case(DateRange::new("", "2024-06-15"), false)]
	fn test_date_range_blank(#[case] range: DateRange, #[case] expected: bool) {
		assert_eq!(range.is_blank(), expected);
	}

	#[rstest]
	fn test_plain_string_forms() {
		assert_eq!(FieldValue::Null.to_plain_string(), "");
		assert_eq!(FieldValue::Bool(true).to_plain_string(), "1");
		assert_eq!(FieldValue::list(["a", "b"]).to_plain_string(), "a, b");
		assert_eq!(FieldValue::Attachment(12).to_plain_string(), "12");
	}
}
