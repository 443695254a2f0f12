use super::temporal::{BoundCodes, check_bounds, datetime_timestamp, normalize_datetime, temporal_input};
use crate::collaborators::{ChronoFormatter, LocaleFormatter};
use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, validate_base};
use crate::markup::{Markup, escape_html, input_tag};
use crate::settings::FieldSettings;
use crate::value::FieldValue;
use std::sync::Arc;

/// Local date and time stored as `YYYY-MM-DDTHH:MM`
///
/// Input must use the `T` separator; stored values written by older
/// importers with a space are still read back.
#[derive(Clone)]
pub struct DateTimeField {
	markup: Markup,
	formatter: Arc<dyn LocaleFormatter>,
	display_format: String,
}

impl DateTimeField {
	pub fn new(markup: Markup, formatter: Arc<dyn LocaleFormatter>) -> Self {
		Self {
			markup,
			formatter,
			display_format: FieldSettings::default().datetime_format,
		}
	}

	pub fn with_display_format(mut self, pattern: impl Into<String>) -> Self {
		self.display_format = pattern.into();
		self
	}
}

impl Default for DateTimeField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(ChronoFormatter::default()))
	}
}

impl std::fmt::Debug for DateTimeField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DateTimeField")
			.field("markup", &self.markup)
			.field("display_format", &self.display_format)
			.finish_non_exhaustive()
	}
}

impl FieldType for DateTimeField {
	fn field_type(&self) -> &'static str {
		"datetime"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Filterable, Feature::Sortable, Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let attrs = temporal_input(
			&self.markup,
			"datetime-local",
			field,
			value.as_str().unwrap_or_default(),
		);
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldType, FieldValue, fields::DateTimeField};
	/// use serde_json::json;
	///
	/// let datetime = DateTimeField::default();
	/// assert_eq!(datetime.sanitize(&json!("2024-06-15T14:30")), FieldValue::text("2024-06-15T14:30"));
	/// assert_eq!(datetime.sanitize(&json!("2024-06-15 14:30")), FieldValue::text(""));
	/// assert_eq!(
	///     datetime.prepare_value_from_storage("2024-06-15 14:30"),
	///     FieldValue::text("2024-06-15T14:30")
	/// );
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Text(normalize_datetime(&raw_to_string(raw), false).unwrap_or_default())
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let Some(datetime) = value.as_str().and_then(|s| normalize_datetime(s, false)) else {
			return Err(ValidationError::new(
				ErrorCode::InvalidDatetime,
				"Enter a valid date and time.",
			));
		};
		check_bounds(
			&datetime,
			field,
			BoundCodes {
				early: ErrorCode::DatetimeTooEarly,
				late: ErrorCode::DatetimeTooLate,
				noun: "date and time",
			},
		)
	}

	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		let Some(timestamp) = value.as_str().and_then(datetime_timestamp) else {
			return String::new();
		};
		let pattern = field.display_format.as_deref().unwrap_or(&self.display_format);
		escape_html(&self.formatter.format_date(timestamp, pattern))
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		if stored.trim().is_empty() {
			return self.default_value();
		}
		match normalize_datetime(stored, true) {
			Some(datetime) => FieldValue::Text(datetime),
			None => {
				tracing::warn!(stored = %stored, "unreadable stored datetime; using default");
				self.default_value()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("2024-06-15T09:00", None)]
	#[case("2024-06-14T23:59", Some(ErrorCode::DatetimeTooEarly))]
	#[case("2024-06-16T00:01", Some(ErrorCode::DatetimeTooLate))]
	#[case("2024-06-15 10:00", Some(ErrorCode::InvalidDatetime))]
	#[case("2024-06-15", Some(ErrorCode::InvalidDatetime))]
	fn test_datetime_validate(#[case] input: &str, #[case] expected: Option<ErrorCode>) {
		// Arrange
		let datetime = DateTimeField::default();
		let field = FieldDefinition::new("event", "datetime")
			.with_min("2024-06-15T00:00")
			.with_max("2024-06-16T00:00");

		// Act
		let result = datetime.validate(&FieldValue::text(input), &field);

		// Assert
		assert_eq!(result.err().map(|e| e.code), expected);
	}

	#[rstest]
	fn test_datetime_format() {
		// Arrange
		let datetime = DateTimeField::default();
		let field = FieldDefinition::new("event", "datetime");

		// Act
		let display = datetime.format_value(&FieldValue::text("2024-06-15T14:30"), &field);

		// Assert
		assert_eq!(display, "June 15, 2024 2:30 pm");
	}

	#[rstest]
	fn test_datetime_storage_accepts_seconds_and_space() {
		// Arrange
		let datetime = DateTimeField::default();

		// Act & Assert
		assert_eq!(
			datetime.prepare_value_from_storage("2024-06-15 14:30:00"),
			FieldValue::text("2024-06-15T14:30")
		);
		assert_eq!(datetime.prepare_value_from_storage("yesterday"), FieldValue::text(""));
	}

	#[rstest]
	fn test_datetime_render_uses_local_input() {
		// Act
		let html = DateTimeField::default().render(
			&FieldDefinition::new("event", "datetime"),
			&FieldValue::text("2024-06-15T14:30"),
		);

		// Assert
		assert!(html.contains(r#"type="datetime-local""#));
	}
}
