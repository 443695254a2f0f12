use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, sanitize_line, validate_base};
use crate::markup::{Attributes, Markup, escape_html, input_tag};
use crate::value::FieldValue;
use regex::Regex;
use std::sync::LazyLock;

static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("HEX_COLOR_REGEX: invalid regex pattern")
});

/// Canonical `#rrggbb` form of a hex color
///
/// # Examples
///
/// ```
/// use dirlist_fields::fields::color_field::normalize_hex;
///
/// assert_eq!(normalize_hex("#FA0"), Some("#ffaa00".to_string()));
/// assert_eq!(normalize_hex("1e90ff"), Some("#1e90ff".to_string()));
/// assert_eq!(normalize_hex("red"), None);
/// ```
pub fn normalize_hex(input: &str) -> Option<String> {
	let caps = HEX_COLOR_REGEX.captures(input.trim())?;
	let digits = caps[1].to_lowercase();
	let expanded = if digits.len() == 3 {
		digits.chars().flat_map(|c| [c, c]).collect()
	} else {
		digits
	};
	Some(format!("#{}", expanded))
}

/// Hex color picked with the browser color input
#[derive(Debug, Clone, Default)]
pub struct ColorField {
	markup: Markup,
}

impl ColorField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for ColorField {
	fn field_type(&self) -> &'static str {
		"color"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let current = value.as_str().and_then(normalize_hex).unwrap_or_default();
		let mut attrs = self.markup.input("color", field, &current);
		attrs.remove("placeholder");
		self.markup.apply_custom(&mut attrs, field);
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// Recognised hex colors are normalised; anything else is kept for
	/// validation to reject
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		let cleaned = sanitize_line(&raw_to_string(raw));
		FieldValue::Text(normalize_hex(&cleaned).unwrap_or(cleaned))
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		match value.as_str().and_then(normalize_hex) {
			Some(_) => Ok(()),
			None => Err(ValidationError::new(
				ErrorCode::InvalidColor,
				"Enter a hex color such as #1e90ff.",
			)),
		}
	}

	/// Swatch followed by the hex code
	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		let Some(hex) = value.as_str().and_then(normalize_hex) else {
			return String::new();
		};
		let mut swatch = Attributes::new();
		swatch
			.set("class", format!("{}-color-swatch", self.markup.namespace()))
			.set("style", format!("background-color: {};", hex))
			.set("aria-hidden", "true");
		format!(
			r#"<span{}></span> <code>{}</code>"#,
			swatch.render(),
			escape_html(&hex)
		)
	}
}
