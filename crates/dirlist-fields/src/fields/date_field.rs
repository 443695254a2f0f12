use super::temporal::{BoundCodes, check_bounds, date_timestamp, normalize_date, temporal_input};
use crate::collaborators::{ChronoFormatter, LocaleFormatter};
use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, validate_base};
use crate::markup::{Markup, escape_html, input_tag};
use crate::settings::FieldSettings;
use crate::value::FieldValue;
use std::sync::Arc;

/// Calendar date stored as `YYYY-MM-DD`
#[derive(Clone)]
pub struct DateField {
	markup: Markup,
	formatter: Arc<dyn LocaleFormatter>,
	display_format: String,
}

impl DateField {
	pub fn new(markup: Markup, formatter: Arc<dyn LocaleFormatter>) -> Self {
		Self {
			markup,
			formatter,
			display_format: FieldSettings::default().date_format,
		}
	}

	/// strftime pattern used when a definition sets none
	pub fn with_display_format(mut self, pattern: impl Into<String>) -> Self {
		self.display_format = pattern.into();
		self
	}
}

impl Default for DateField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(ChronoFormatter::default()))
	}
}

impl std::fmt::Debug for DateField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DateField")
			.field("markup", &self.markup)
			.field("display_format", &self.display_format)
			.finish_non_exhaustive()
	}
}

impl FieldType for DateField {
	fn field_type(&self) -> &'static str {
		"date"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Filterable, Feature::Sortable, Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let attrs = temporal_input(&self.markup, "date", field, value.as_str().unwrap_or_default());
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldType, FieldValue, fields::DateField};
	/// use serde_json::json;
	///
	/// let date = DateField::default();
	/// assert_eq!(date.sanitize(&json!(" 2024-06-15 ")), FieldValue::text("2024-06-15"));
	/// assert_eq!(date.sanitize(&json!("2024-02-30")), FieldValue::text(""));
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Text(normalize_date(&raw_to_string(raw)).unwrap_or_default())
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let Some(date) = value.as_str().and_then(normalize_date) else {
			return Err(ValidationError::new(ErrorCode::InvalidDate, "Enter a valid date."));
		};
		check_bounds(
			&date,
			field,
			BoundCodes {
				early: ErrorCode::DateTooEarly,
				late: ErrorCode::DateTooLate,
				noun: "date",
			},
		)
	}

	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		let Some(timestamp) = value.as_str().and_then(date_timestamp) else {
			return String::new();
		};
		let pattern = field.display_format.as_deref().unwrap_or(&self.display_format);
		escape_html(&self.formatter.format_date(timestamp, pattern))
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		if stored.trim().is_empty() {
			return self.default_value();
		}
		match normalize_date(stored) {
			Some(date) => FieldValue::Text(date),
			None => {
				tracing::warn!(stored = %stored, "unreadable stored date; using default");
				self.default_value()
			}
		}
	}
}
