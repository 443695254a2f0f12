use super::temporal::{BoundCodes, check_bounds, date_timestamp, normalize_date};
use crate::collaborators::{ChronoFormatter, LocaleFormatter};
use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, validate_base};
use crate::markup::{Markup, escape_html, input_tag};
use crate::settings::FieldSettings;
use crate::value::{DateRange, FieldValue};
use std::sync::Arc;

/// Start and end dates; either side may be left open
#[derive(Clone)]
pub struct DateRangeField {
	markup: Markup,
	formatter: Arc<dyn LocaleFormatter>,
	display_format: String,
	separator: String,
}

impl DateRangeField {
	pub fn new(markup: Markup, formatter: Arc<dyn LocaleFormatter>) -> Self {
		let settings = FieldSettings::default();
		Self {
			markup,
			formatter,
			display_format: settings.date_format,
			separator: settings.range_separator,
		}
	}

	pub fn with_display_format(mut self, pattern: impl Into<String>) -> Self {
		self.display_format = pattern.into();
		self
	}

	/// Separator used when a definition sets none
	pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = separator.into();
		self
	}

	fn side(raw: Option<&serde_json::Value>) -> String {
		raw.map(raw_to_string)
			.and_then(|s| normalize_date(&s))
			.unwrap_or_default()
	}

	fn format_side(&self, date: &str, pattern: &str) -> String {
		date_timestamp(date)
			.map(|ts| self.formatter.format_date(ts, pattern))
			.unwrap_or_default()
	}
}

impl Default for DateRangeField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(ChronoFormatter::default()))
	}
}

impl std::fmt::Debug for DateRangeField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DateRangeField")
			.field("markup", &self.markup)
			.field("display_format", &self.display_format)
			.field("separator", &self.separator)
			.finish_non_exhaustive()
	}
}

impl FieldType for DateRangeField {
	fn field_type(&self) -> &'static str {
		"date_range"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Filterable]
	}

	/// Two date inputs named `<name>[start]` and `<name>[end]`
	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let range = value.as_range().cloned().unwrap_or_default();
		let id = self.markup.field_id(&field.name);
		let name = self.markup.field_name(&field.name);

		let mut inputs = String::new();
		for (side, date, label) in [("start", &range.start, "From"), ("end", &range.end, "To")] {
			let mut attrs = self.markup.input("date", field, date);
			attrs.remove("placeholder");
			attrs
				.set("id", format!("{}-{}", id, side))
				.set("name", format!("{}[{}]", name, side))
				.set("aria-label", label);
			attrs.set_opt("min", field.min_str());
			attrs.set_opt("max", field.max_str());
			inputs.push_str(&input_tag(&attrs));
		}

		let control = format!(
			r#"<span class="{}-date-range">{}</span>"#,
			escape_html(self.markup.namespace()),
			inputs
		);
		let label = self.markup.label_for(field, &format!("{}-start", id));
		self.markup
			.wrap_with_label(field, self.field_type(), &label, &control)
	}

	/// Accepts `{start, end}` objects or `[start, end]` pairs; invalid sides
	/// become empty
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{DateRange, FieldType, FieldValue, fields::DateRangeField};
	/// use serde_json::json;
	///
	/// let range = DateRangeField::default();
	/// assert_eq!(
	///     range.sanitize(&json!({"start": "2024-06-15", "end": "2024-13-01"})),
	///     FieldValue::Range(DateRange::new("2024-06-15", ""))
	/// );
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		let range = match raw {
			serde_json::Value::Object(map) => {
				DateRange::new(Self::side(map.get("start")), Self::side(map.get("end")))
			}
			serde_json::Value::Array(items) => {
				DateRange::new(Self::side(items.first()), Self::side(items.get(1)))
			}
			_ => DateRange::default(),
		};
		FieldValue::Range(range)
	}

	/// Side validity first, then ordering, then the start and end bounds
	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let Some(range) = value.as_range() else {
			return Err(ValidationError::new(
				ErrorCode::InvalidStartDate,
				"Enter a valid start date.",
			));
		};
		let start = range.start.trim();
		let end = range.end.trim();

		if !start.is_empty() && normalize_date(start).is_none() {
			return Err(ValidationError::new(
				ErrorCode::InvalidStartDate,
				"Enter a valid start date.",
			));
		}
		if !end.is_empty() && normalize_date(end).is_none() {
			return Err(ValidationError::new(
				ErrorCode::InvalidEndDate,
				"Enter a valid end date.",
			));
		}
		if !start.is_empty() && !end.is_empty() && end < start {
			return Err(ValidationError::new(
				ErrorCode::EndBeforeStart,
				"The end date must not be before the start date.",
			));
		}
		if !start.is_empty() {
			check_bounds(
				start,
				field,
				BoundCodes {
					early: ErrorCode::StartTooEarly,
					late: ErrorCode::StartTooLate,
					noun: "start date",
				},
			)?;
		}
		if !end.is_empty() {
			check_bounds(
				end,
				field,
				BoundCodes {
					early: ErrorCode::EndTooEarly,
					late: ErrorCode::EndTooLate,
					noun: "end date",
				},
			)?;
		}
		Ok(())
	}

	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		let Some(range) = value.as_range() else {
			return String::new();
		};
		let pattern = field.display_format.as_deref().unwrap_or(&self.display_format);
		let separator = field.separator.as_deref().unwrap_or(&self.separator);
		let start = self.format_side(&range.start, pattern);
		let end = self.format_side(&range.end, pattern);

		let joined = match (start.is_empty(), end.is_empty()) {
			(false, false) => format!("{}{}{}", start, separator, end),
			(false, true) => start,
			(true, false) => end,
			(true, true) => String::new(),
		};
		escape_html(&joined)
	}

	fn default_value(&self) -> FieldValue {
		FieldValue::Range(DateRange::default())
	}

	fn prepare_value_for_storage(&self, value: &FieldValue) -> String {
		let range = value.as_range().cloned().unwrap_or_default();
		serde_json::to_string(&range).unwrap_or_else(|_| r#"{"start":"","end":""}"#.to_string())
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		if stored.trim().is_empty() {
			return self.default_value();
		}
		match serde_json::from_str::<serde_json::Value>(stored) {
			Ok(raw @ serde_json::Value::Object(_)) => self.sanitize(&raw),
			_ => {
				tracing::warn!(stored = %stored, "unreadable stored date range; using default");
				self.default_value()
			}
		}
	}
}
