//! Pipeline integration tests
//!
//! Settings loaded from disk flow through the default registry into
//! submit/display/render.

use dirlist_fields::{
	Collaborators, ErrorCode, FieldDefinition, FieldPipeline, FieldSettings, FieldTypeRegistry,
	FieldsError, ValidationError,
};
use rstest::*;
use serde_json::json;
use std::io::Write;

const ACME_TOML: &str = r#"
namespace = "acme"
date_format = "%d/%m/%Y"
range_separator = " → "
home_url = "https://acme.example/listings"
thousands_separator = "."
decimal_point = ","
"#;

#[fixture]
fn acme_pipeline() -> FieldPipeline {
	let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
	file.write_all(ACME_TOML.as_bytes()).unwrap();

	let settings = FieldSettings::from_file(file.path()).unwrap();
	settings.validate().unwrap();
	FieldPipeline::new(FieldTypeRegistry::with_defaults(
		&settings,
		Collaborators::from_settings(&settings),
	))
}

#[rstest]
fn test_settings_drive_display(acme_pipeline: FieldPipeline) {
	// Arrange
	let opened = FieldDefinition::new("opened", "date");
	let season = FieldDefinition::new("season", "date_range");
	let price = FieldDefinition::new("price", "decimal");

	// Act
	let opened_html = acme_pipeline.display(&opened, "2024-06-15").unwrap();
	let season_html = acme_pipeline
		.display(&season, r#"{"start":"2024-06-15","end":"2024-06-20"}"#)
		.unwrap();
	let price_html = acme_pipeline.display(&price, "1234.5").unwrap();

	// Assert
	assert_eq!(opened_html, "15/06/2024");
	assert_eq!(season_html, "15/06/2024 → 20/06/2024");
	assert_eq!(price_html, "1.234,50");
}

#[rstest]
fn test_settings_drive_markup_and_links(acme_pipeline: FieldPipeline) {
	// Arrange
	let website = FieldDefinition::new("website", "url");

	// Act
	let own = acme_pipeline.display(&website, "https://acme.example/about").unwrap();
	let foreign = acme_pipeline.display(&website, "https://elsewhere.example").unwrap();
	let control = acme_pipeline.render(&website, None).unwrap();

	// Assert
	assert!(!own.contains("noopener"));
	assert!(foreign.contains(r#"rel="noopener noreferrer""#));
	assert!(control.contains(r#"id="acme-field-website""#));
	assert!(control.contains(r#"name="acme_field_website""#));
	assert!(control.starts_with(r#"<div class="acme-field acme-field-url">"#));
}

#[rstest]
fn test_submit_then_display_round_trip(acme_pipeline: FieldPipeline) {
	// Arrange
	let phone = FieldDefinition::new("phone", "phone").required();

	// Act
	let stored = acme_pipeline
		.submit(&phone, &json!("  +1 (555) 123-4567 <script>"))
		.unwrap();
	let html = acme_pipeline.display(&phone, &stored).unwrap();

	// Assert
	assert_eq!(stored, "+1 (555) 123-4567");
	assert_eq!(html, r#"<a href="tel:+15551234567">+1 (555) 123-4567</a>"#);
}

#[rstest]
fn test_rule_engine_runs_inside_pipeline(acme_pipeline: FieldPipeline) {
	// Arrange
	let code = FieldDefinition::new("listing_code", "text")
		.with_min_length(3)
		.with_max_length(6)
		.with_pattern("[A-Z]+[0-9]*");

	// Act & Assert
	assert_eq!(acme_pipeline.submit(&code, &json!("AB12")).unwrap(), "AB12");
	for (raw, expected) in [
		("AB", ErrorCode::MinLength),
		("ABCDEFG", ErrorCode::MaxLength),
		("ab12", ErrorCode::Pattern),
	] {
		let err = acme_pipeline.submit(&code, &json!(raw)).unwrap_err();
		assert!(
			matches!(err, FieldsError::Validation(ref e) if e.code == expected),
			"{}: {:?}",
			raw,
			err
		);
	}
}

#[rstest]
fn test_submit_all_with_appended_validator(mut acme_pipeline: FieldPipeline) {
	// Arrange
	acme_pipeline.add_validator_for("number", |value, field| match value.as_i64() {
		Some(n) if n % 2 != 0 => Err(ValidationError::new(
			ErrorCode::Custom("even_only".to_string()),
			format!("{} must be even.", field.display_label()),
		)),
		_ => Ok(()),
	});
	let fields = vec![
		FieldDefinition::new("rooms", "number"),
		FieldDefinition::new("parking", "checkbox"),
		FieldDefinition::new("season", "date_range"),
	];
	let input = json!({
		"rooms": "3",
		"parking": "on",
		"season": {"start": "2024-06-20", "end": "2024-06-15"},
	});

	// Act
	let submission = acme_pipeline.submit_all(&fields, input.as_object().unwrap());

	// Assert
	assert!(!submission.is_valid());
	assert_eq!(
		submission.validation_error("rooms").map(|e| e.code.as_str()),
		Some("even_only")
	);
	assert_eq!(
		submission.validation_error("season").map(|e| e.code.clone()),
		Some(ErrorCode::EndBeforeStart)
	);
	assert_eq!(submission.stored.get("parking").map(String::as_str), Some("1"));
}

#[rstest]
fn test_env_settings_reach_registry() {
	// Arrange
	let settings = FieldSettings::from_vars(|key| match key {
		"DIRLIST_NAMESPACE" => Some("envns".to_string()),
		"DIRLIST_TIME_FORMAT" => Some("%H.%M".to_string()),
		_ => None,
	})
	.unwrap();
	let pipeline = FieldPipeline::new(FieldTypeRegistry::with_defaults(
		&settings,
		Collaborators::from_settings(&settings),
	));
	let opens = FieldDefinition::new("opens", "time");

	// Act
	let html = pipeline.display(&opens, "09:05").unwrap();
	let control = pipeline.render(&opens, Some("09:05")).unwrap();

	// Assert
	assert_eq!(html, "09.05");
	assert!(control.contains(r#"id="envns-field-opens""#));
	assert!(control.contains(r#"value="09:05""#));
}
