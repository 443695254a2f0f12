use super::temporal::{BoundCodes, check_bounds, normalize_time, temporal_input, time_timestamp};
use crate::collaborators::{ChronoFormatter, LocaleFormatter};
use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, validate_base};
use crate::markup::{Markup, escape_html, input_tag};
use crate::settings::FieldSettings;
use crate::value::FieldValue;
use std::sync::Arc;

/// Time of day stored as `HH:MM`
#[derive(Clone)]
pub struct TimeField {
	markup: Markup,
	formatter: Arc<dyn LocaleFormatter>,
	display_format: String,
}

impl TimeField {
	pub fn new(markup: Markup, formatter: Arc<dyn LocaleFormatter>) -> Self {
		Self {
			markup,
			formatter,
			display_format: FieldSettings::default().time_format,
		}
	}

	pub fn with_display_format(mut self, pattern: impl Into<String>) -> Self {
		self.display_format = pattern.into();
		self
	}
}

impl Default for TimeField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(ChronoFormatter::default()))
	}
}

impl std::fmt::Debug for TimeField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TimeField")
			.field("markup", &self.markup)
			.field("display_format", &self.display_format)
			.finish_non_exhaustive()
	}
}

impl FieldType for TimeField {
	fn field_type(&self) -> &'static str {
		"time"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Sortable, Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let attrs = temporal_input(&self.markup, "time", field, value.as_str().unwrap_or_default());
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// Seconds are accepted and dropped
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldType, FieldValue, fields::TimeField};
	/// use serde_json::json;
	///
	/// let time = TimeField::default();
	/// assert_eq!(time.sanitize(&json!("14:30:59")), FieldValue::text("14:30"));
	/// assert_eq!(time.sanitize(&json!("25:00")), FieldValue::text(""));
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Text(normalize_time(&raw_to_string(raw)).unwrap_or_default())
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let Some(time) = value.as_str().and_then(normalize_time) else {
			return Err(ValidationError::new(ErrorCode::InvalidTime, "Enter a valid time."));
		};
		check_bounds(
			&time,
			field,
			BoundCodes {
				early: ErrorCode::TimeTooEarly,
				late: ErrorCode::TimeTooLate,
				noun: "time",
			},
		)
	}

	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		let Some(timestamp) = value.as_str().and_then(time_timestamp) else {
			return String::new();
		};
		let pattern = field.display_format.as_deref().unwrap_or(&self.display_format);
		escape_html(&self.formatter.format_date(timestamp, pattern))
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		if stored.trim().is_empty() {
			return self.default_value();
		}
		match normalize_time(stored) {
			Some(time) => FieldValue::Text(time),
			None => {
				tracing::warn!(stored = %stored, "unreadable stored time; using default");
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
	#[case("09:00", None)]
	#[case("17:30", None)]
	#[case("08:59", Some(ErrorCode::TimeTooEarly))]
	#[case("17:31", Some(ErrorCode::TimeTooLate))]
	#[case("7pm", Some(ErrorCode::InvalidTime))]
	fn test_time_validate_bounds(#[case] input: &str, #[case] expected: Option<ErrorCode>) {
		// Arrange
		let time = TimeField::default();
		let field = FieldDefinition::new("opens", "time")
			.with_min("09:00")
			.with_max("17:30");

		// Act
		let result = time.validate(&FieldValue::text(input), &field);

		// Assert
		assert_eq!(result.err().map(|e| e.code), expected);
	}

	#[rstest]
	fn test_time_format() {
		// Arrange
		let time = TimeField::default();
		let field = FieldDefinition::new("opens", "time");

		// Act & Assert
		assert_eq!(time.format_value(&FieldValue::text("14:05"), &field), "2:05 pm");
		assert_eq!(
			time.format_value(&FieldValue::text("14:05"), &field.clone().with_display_format("%H.%M")),
			"14.05"
		);
	}

	#[rstest]
	fn test_time_storage_normalizes_seconds() {
		assert_eq!(TimeField::default().prepare_value_from_storage("08:15:00"), FieldValue::text("08:15"));
	}

	#[rstest]
	fn test_time_render_step() {
		// Arrange
		let time = TimeField::default();
		let field = FieldDefinition::new("opens", "time").with_step(900);

		// Act
		let html = time.render(&field, &FieldValue::text("09:00"));

		// Assert
		assert!(html.contains(r#"type="time""#));
		assert!(html.contains(r#"step="900""#));
	}

	#[rstest]
	fn test_custom_step_overrides_definition_step() {
		// Arrange
		let time = TimeField::default();
		let field = FieldDefinition::new("opens", "time")
			.with_step(900)
			.with_attribute("step", 60)
			.with_attribute("data-slot", "am");

		// Act
		let html = time.render(&field, &FieldValue::text("09:00"));

		// Assert
		assert_eq!(html.matches("step=").count(), 1, "{}", html);
		assert!(html.contains(r#"step="60""#));
		assert_eq!(html.matches("data-slot=").count(), 1, "{}", html);
	}
}
