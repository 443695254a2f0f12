//! Behavioural scenarios for individual field types
//!
//! Amenity checklists, contact fields, external links, date/time storage
//! leniency, decimal rounding and range ordering.

use dirlist_fields::{
	CheckboxGroupField, DateRange, DateRangeField, DateTimeField, DecimalField, ErrorCode,
	FieldDefinition, FieldType, FieldValue, Markup, NumberField, PhoneField, StaticHost, UrlField,
};
use rstest::*;
use serde_json::json;
use std::sync::Arc;

fn amenities() -> FieldDefinition {
	FieldDefinition::new("amenities", "checkbox_group")
		.with_label("Amenities")
		.with_option("wifi", "Wi-Fi")
		.with_option("pool", "Pool")
}

#[rstest]
fn test_checkbox_group_sanitizes_each_item() {
	// Arrange
	let group = CheckboxGroupField::default();

	// Act
	let value = group.sanitize(&json!(["  wifi  ", "<b>pool</b>"]));

	// Assert
	assert_eq!(value, FieldValue::list(["wifi", "pool"]));
}

#[rstest]
fn test_checkbox_group_rejects_unknown_option() {
	// Arrange
	let group = CheckboxGroupField::default();
	let field = amenities();

	// Act
	let err = group
		.validate(&FieldValue::list(["wifi", "invalid"]), &field)
		.unwrap_err();

	// Assert
	assert_eq!(err.code, ErrorCode::InvalidOption);
}

#[rstest]
fn test_checkbox_group_formats_labels() {
	// Arrange
	let group = CheckboxGroupField::default();

	// Act
	let html = group.format_value(&FieldValue::list(["pool", "wifi"]), &amenities());

	// Assert
	assert_eq!(html, "Pool, Wi-Fi");
}

#[rstest]
#[case("123456", false)]
#[case("+44 20 7946 0958", true)]
fn test_phone_digit_count(#[case] input: &str, #[case] ok: bool) {
	// Arrange
	let phone = PhoneField::default();
	let field = FieldDefinition::new("phone", "phone");

	// Act
	let result = phone.validate(&FieldValue::text(input), &field);

	// Assert
	match ok {
		true => assert!(result.is_ok()),
		false => assert_eq!(result.unwrap_err().code, ErrorCode::InvalidPhone),
	}
}

#[rstest]
#[case("https://external-site.com", true)]
#[case("https://listings.example/page", false)]
#[case("https://www.listings.example/page", false)]
fn test_url_rel_only_for_foreign_hosts(#[case] input: &str, #[case] external: bool) {
	// Arrange
	let url = UrlField::new(Markup::default(), Arc::new(StaticHost::new("listings.example")));
	let field = FieldDefinition::new("website", "url");

	// Act
	let html = url.format_value(&FieldValue::text(input), &field);

	// Assert
	assert_eq!(html.contains(r#"rel="noopener noreferrer""#), external, "{}", html);
}

#[rstest]
fn test_datetime_input_is_strict_and_storage_lenient() {
	// Arrange
	let datetime = DateTimeField::default();

	// Act
	let sanitized = datetime.sanitize(&json!("2024-06-15 14:30"));
	let loaded = datetime.prepare_value_from_storage("2024-06-15 14:30");

	// Assert
	assert_eq!(sanitized, FieldValue::text(""));
	assert_eq!(loaded, FieldValue::text("2024-06-15T14:30"));
}

#[rstest]
#[case(json!(42.565), FieldValue::Float(42.57))]
#[case(json!(42.564), FieldValue::Float(42.56))]
#[case(json!("-1.005"), FieldValue::Float(-1.01))]
#[case(json!("abc"), FieldValue::Null)]
fn test_decimal_rounds_half_up(#[case] raw: serde_json::Value, #[case] expected: FieldValue) {
	assert_eq!(DecimalField::default().sanitize(&raw), expected);
}

#[rstest]
fn test_decimal_precision_from_definition() {
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
#[case(9, Some(ErrorCode::MinValue))]
#[case(10, None)]
#[case(55, None)]
#[case(100, None)]
#[case(101, Some(ErrorCode::MaxValue))]
fn test_number_bounds_are_inclusive(#[case] input: i64, #[case] expected: Option<ErrorCode>) {
	// Arrange
	let number = NumberField::default();
	let field = FieldDefinition::new("seats", "number").with_min(10).with_max(100);

	// Act
	let result = number.validate(&FieldValue::Integer(input), &field);

	// Assert
	assert_eq!(result.err().map(|e| e.code), expected);
}

#[rstest]
fn test_decimal_range_is_monotonic() {
	// Arrange
	let decimal = DecimalField::default();
	let field = FieldDefinition::new("price", "decimal").with_min(0.5).with_max(99.99);
	let samples = [0.49, 0.5, 1.0, 50.0, 99.99, 100.0];

	// Act
	let passing: Vec<bool> = samples
		.iter()
		.map(|v| decimal.validate(&FieldValue::Float(*v), &field).is_ok())
		.collect();

	// Assert
	assert_eq!(passing, vec![false, true, true, true, true, false]);
}

#[rstest]
#[case("2024-06-20", "2024-06-15", Some(ErrorCode::EndBeforeStart))]
#[case("2024-06-15", "2024-06-15", None)]
#[case("2024-06-15", "2024-06-20", None)]
fn test_date_range_ordering(
	#[case] start: &str,
	#[case] end: &str,
	#[case] expected: Option<ErrorCode>,
) {
	// Arrange
	let range = DateRangeField::default();
	let field = FieldDefinition::new("season", "date_range");

	// Act
	let result = range.validate(&FieldValue::Range(DateRange::new(start, end)), &field);

	// Assert
	assert_eq!(result.err().map(|e| e.code), expected);
}
