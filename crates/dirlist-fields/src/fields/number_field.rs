use crate::collaborators::{ChronoFormatter, LocaleFormatter};
use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, validate_base};
use crate::markup::{AttrValue, Attributes, Markup, input_tag};
use crate::value::FieldValue;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::Arc;

const NUMERIC_FEATURES: &[Feature] = &[Feature::Filterable, Feature::Sortable, Feature::Repeater];

/// Largest precision `rust_decimal` can represent
const MAX_SCALE: u32 = 28;

fn parse_f64(raw: &serde_json::Value) -> Option<f64> {
	let parsed = match raw {
		serde_json::Value::Number(n) => n.as_f64(),
		serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	};
	parsed.filter(|f| f.is_finite())
}

/// Inclusive `min`/`max` bounds check
fn check_range(number: f64, field: &FieldDefinition) -> FieldResult<()> {
	if let Some(min) = field.min_number()
		&& number < min
	{
		return Err(ValidationError::new(
			ErrorCode::MinValue,
			format!("Ensure this value is greater than or equal to {}.", min),
		));
	}
	if let Some(max) = field.max_number()
		&& number > max
	{
		return Err(ValidationError::new(
			ErrorCode::MaxValue,
			format!("Ensure this value is less than or equal to {}.", max),
		));
	}
	Ok(())
}

fn validate_number<T>(field_type: &T, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()>
where
	T: FieldType + ?Sized,
{
	if !validate_base(field_type, value, field)? {
		return Ok(());
	}
	let Some(number) = value.as_f64() else {
		return Err(ValidationError::new(ErrorCode::NotNumeric, "Enter a number."));
	};
	check_range(number, field)
}

fn numeric_input(markup: &Markup, field: &FieldDefinition, value: &str, default_step: &str) -> Attributes {
	let mut attrs = markup.input("number", field, value);
	for (name, bound) in [("min", &field.min), ("max", &field.max)] {
		if let Some(attr) = bound.as_ref().and_then(AttrValue::from_json) {
			attrs.set(name, attr);
		}
	}
	match field.step.as_ref().and_then(AttrValue::from_json) {
		Some(step) => attrs.set("step", step),
		None => attrs.set("step", default_step),
	};
	markup.apply_custom(&mut attrs, field);
	attrs
}

/// Whole numbers
#[derive(Clone)]
pub struct NumberField {
	markup: Markup,
	formatter: Arc<dyn LocaleFormatter>,
}

impl NumberField {
	pub fn new(markup: Markup, formatter: Arc<dyn LocaleFormatter>) -> Self {
		Self { markup, formatter }
	}
}

impl Default for NumberField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(ChronoFormatter::default()))
	}
}

impl std::fmt::Debug for NumberField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NumberField")
			.field("markup", &self.markup)
			.finish_non_exhaustive()
	}
}

impl FieldType for NumberField {
	fn field_type(&self) -> &'static str {
		"number"
	}

	fn features(&self) -> &'static [Feature] {
		NUMERIC_FEATURES
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let text = self.prepare_value_for_storage(value);
		let attrs = numeric_input(&self.markup, field, &text, "1");
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// Integers pass through, fractions truncate toward zero, anything
	/// unparseable becomes `Null`
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldType, FieldValue, fields::NumberField};
	/// use serde_json::json;
	///
	/// let number = NumberField::default();
	/// assert_eq!(number.sanitize(&json!(-7.9)), FieldValue::Integer(-7));
	/// assert_eq!(number.sanitize(&json!(" 12 ")), FieldValue::Integer(12));
	/// assert_eq!(number.sanitize(&json!("twelve")), FieldValue::Null);
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		if let serde_json::Value::Number(n) = raw
			&& let Some(i) = n.as_i64()
		{
			return FieldValue::Integer(i);
		}
		if let serde_json::Value::String(s) = raw
			&& let Ok(i) = s.trim().parse::<i64>()
		{
			return FieldValue::Integer(i);
		}
		match parse_f64(raw).map(f64::trunc) {
			Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => FieldValue::Integer(f as i64),
			_ => FieldValue::Null,
		}
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		validate_number(self, value, field)
	}

	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		match value {
			FieldValue::Integer(i) => self.formatter.format_number(*i as f64, 0),
			_ => String::new(),
		}
	}

	fn default_value(&self) -> FieldValue {
		FieldValue::Null
	}

	fn prepare_value_for_storage(&self, value: &FieldValue) -> String {
		match value {
			FieldValue::Integer(i) => i.to_string(),
			_ => String::new(),
		}
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		if stored.trim().is_empty() {
			return FieldValue::Null;
		}
		let value = self.sanitize(&serde_json::Value::String(stored.to_string()));
		if value == FieldValue::Null {
			tracing::warn!(stored = %stored, "unreadable stored number; using default");
		}
		value
	}
}

/// Fractional numbers rounded half away from zero to a fixed precision
#[derive(Clone)]
pub struct DecimalField {
	markup: Markup,
	formatter: Arc<dyn LocaleFormatter>,
	precision: u32,
}

impl DecimalField {
	pub const DEFAULT_PRECISION: u32 = 2;

	pub fn new(markup: Markup, formatter: Arc<dyn LocaleFormatter>) -> Self {
		Self {
			markup,
			formatter,
			precision: Self::DEFAULT_PRECISION,
		}
	}

	/// Precision used when a definition sets none
	pub fn with_precision(mut self, precision: u32) -> Self {
		self.precision = precision.min(MAX_SCALE);
		self
	}

	pub fn precision(&self) -> u32 {
		self.precision
	}

	fn precision_for(&self, field: &FieldDefinition) -> u32 {
		field.precision.unwrap_or(self.precision).min(MAX_SCALE)
	}

	/// Parse and round to `precision` places
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldValue, fields::DecimalField};
	/// use serde_json::json;
	///
	/// let decimal = DecimalField::default();
	/// assert_eq!(decimal.sanitize_with(&json!(42.565), 2), FieldValue::Float(42.57));
	/// assert_eq!(decimal.sanitize_with(&json!("42.564"), 2), FieldValue::Float(42.56));
	/// assert_eq!(decimal.sanitize_with(&json!(-2.5), 0), FieldValue::Float(-3.0));
	/// ```
	pub fn sanitize_with(&self, raw: &serde_json::Value, precision: u32) -> FieldValue {
		match parse_f64(raw) {
			Some(f) => FieldValue::Float(round_half_up(f, precision.min(MAX_SCALE))),
			None => FieldValue::Null,
		}
	}
}

impl Default for DecimalField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(ChronoFormatter::default()))
	}
}

impl std::fmt::Debug for DecimalField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DecimalField")
			.field("markup", &self.markup)
			.field("precision", &self.precision)
			.finish_non_exhaustive()
	}
}

/// Round through the shortest decimal representation of `value`, so
/// `42.565` rounds up even though its binary value sits just below
fn round_half_up(value: f64, precision: u32) -> f64 {
	match Decimal::from_str(&value.to_string()) {
		Ok(decimal) => decimal
			.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
			.to_f64()
			.unwrap_or(value),
		Err(_) => value,
	}
}

fn step_for(precision: u32) -> String {
	if precision == 0 {
		"1".to_string()
	} else {
		format!("0.{}1", "0".repeat(precision as usize - 1))
	}
}

impl FieldType for DecimalField {
	fn field_type(&self) -> &'static str {
		"decimal"
	}

	fn features(&self) -> &'static [Feature] {
		NUMERIC_FEATURES
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let text = self.prepare_value_for_storage(value);
		let attrs = numeric_input(&self.markup, field, &text, &step_for(self.precision_for(field)));
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		self.sanitize_with(raw, self.precision)
	}

	fn sanitize_for(&self, raw: &serde_json::Value, field: &FieldDefinition) -> FieldValue {
		self.sanitize_with(raw, self.precision_for(field))
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		validate_number(self, value, field)
	}

	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		match value.as_f64() {
			Some(f) => self.formatter.format_number(f, self.precision_for(field)),
			None => String::new(),
		}
	}

	fn default_value(&self) -> FieldValue {
		FieldValue::Null
	}

	fn prepare_value_for_storage(&self, value: &FieldValue) -> String {
		match value.as_f64() {
			Some(f) => f.to_string(),
			None => String::new(),
		}
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		let trimmed = stored.trim();
		if trimmed.is_empty() {
			return FieldValue::Null;
		}
		match trimmed.parse::<f64>() {
			Ok(f) if f.is_finite() => FieldValue::Float(f),
			_ => {
				tracing::warn!(stored = %stored, "unreadable stored decimal; using default");
				FieldValue::Null
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!(5), FieldValue::Integer(5))]
	#[case(json!(5.99), FieldValue::Integer(5))]
	#[case(json!(-5.99), FieldValue::Integer(-5))]
	#[case(json!("  -3.2 "), FieldValue::Integer(-3))]
	#[case(json!(""), FieldValue::Null)]
	#[case(json!(true), FieldValue::Null)]
	#[case(json!([1]), FieldValue::Null)]
	#[case(json!("1e400"), FieldValue::Null)]
	fn test_number_sanitize(#[case] raw: serde_json::Value, #[case] expected: FieldValue) {
		assert_eq!(NumberField::default().sanitize(&raw), expected);
	}

	#[rstest]
	#[case(0, true)]
	#[case(10, true)]
	#[case(-1, false)]
	#[case(11, false)]
	fn test_number_bounds_are_inclusive(#[case] n: i64, #[case] ok: bool) {
		// Arrange
		let number = NumberField::default();
		let field = FieldDefinition::new("rooms", "number").with_min(0).with_max(10);

		// Act
		let result = number.validate(&FieldValue::Integer(n), &field);

		// Assert
		assert_eq!(result.is_ok(), ok);
	}

	#[rstest]
	fn test_number_range_error_codes() {
		// Arrange
		let number = NumberField::default();
		let field = FieldDefinition::new("rooms", "number").with_min(1).with_max(3);

		// Act & Assert
		assert_eq!(
			number.validate(&FieldValue::Integer(0), &field).unwrap_err().code,
			ErrorCode::MinValue
		);
		assert_eq!(
			number.validate(&FieldValue::Integer(4), &field).unwrap_err().code,
			ErrorCode::MaxValue
		);
	}

	#[rstest]
	fn test_number_rejects_non_numeric_value() {
		// Arrange
		let number = NumberField::default();
		let field = FieldDefinition::new("rooms", "number");

		// Act
		let err = number.validate(&FieldValue::text("three"), &field).unwrap_err();

		// Assert
		assert_eq!(err.code, ErrorCode::NotNumeric);
	}

	#[rstest]
	fn test_zero_satisfies_required() {
		// Arrange
		let number = NumberField::default();
		let field = FieldDefinition::new("rooms", "number").required();

		// Act & Assert
		assert!(number.validate(&FieldValue::Integer(0), &field).is_ok());
		assert_eq!(
			number.validate(&FieldValue::Null, &field).unwrap_err().code,
			ErrorCode::Required
		);
	}

	#[rstest]
	fn test_number_format_groups_thousands() {
		// Arrange
		let number = NumberField::default();
		let field = FieldDefinition::new("visitors", "number");

		// Act & Assert
		assert_eq!(number.format_value(&FieldValue::Integer(1234567), &field), "1,234,567");
		assert_eq!(number.format_value(&FieldValue::Null, &field), "");
	}

	#[rstest]
	fn test_number_storage_degrades_to_null() {
		assert_eq!(NumberField::default().prepare_value_from_storage("n/a"), FieldValue::Null);
		assert_eq!(NumberField::default().prepare_value_from_storage("-42"), FieldValue::Integer(-42));
	}

	#[rstest]
	#[case(42.565, 2, 42.57)]
	#[case(42.564, 2, 42.56)]
	#[case(1.005, 2, 1.01)]
	#[case(-1.005, 2, -1.01)]
	#[case(2.5, 0, 3.0)]
	#[case(0.125, 2, 0.13)]
	#[case(19.999, 2, 20.0)]
	fn test_round_half_up(#[case] input: f64, #[case] precision: u32, #[case] expected: f64) {
		assert_eq!(round_half_up(input, precision), expected);
	}

	#[rstest]
	fn test_decimal_uses_definition_precision() {
		// Arrange
		let decimal = DecimalField::default();
		let field = FieldDefinition::new("rating", "decimal").with_precision(1);

		// Act
		let value = decimal.sanitize_for(&json!("4.25"), &field);

		// Assert
		assert_eq!(value, FieldValue::Float(4.3));
		assert_eq!(decimal.format_value(&value, &field), "4.3");
	}

	#[rstest]
	fn test_decimal_storage_round_trip() {
		// Arrange
		let decimal = DecimalField::default();
		let value = decimal.sanitize(&json!(1234.5));

		// Act
		let stored = decimal.prepare_value_for_storage(&value);

		// Assert
		assert_eq!(stored, "1234.5");
		assert_eq!(decimal.prepare_value_from_storage(&stored), value);
		assert_eq!(decimal.prepare_value_from_storage(""), FieldValue::Null);
	}

	#[rstest]
	fn test_decimal_render_step_follows_precision() {
		// Arrange
		let decimal = DecimalField::default().with_precision(3);
		let field = FieldDefinition::new("price", "decimal").with_min(0);

		// Act
		let html = decimal.render(&field, &FieldValue::Float(9.5));

		// Assert
		assert!(html.contains(r#"type="number""#));
		assert!(html.contains(r#"step="0.001""#));
		assert!(html.contains(r#"min="0""#));
		assert!(html.contains(r#"value="9.5""#));
	}

	#[rstest]
	fn test_decimal_format_uses_precision() {
		// Arrange
		let decimal = DecimalField::default();
		let field = FieldDefinition::new("price", "decimal");

		// Act & Assert
		assert_eq!(decimal.format_value(&FieldValue::Float(1999.5), &field), "1,999.50");
	}
}
