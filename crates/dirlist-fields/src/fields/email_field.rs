use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, validate_base};
use crate::markup::{Attributes, Markup, escape_html, input_tag, strip_tags};
use crate::value::FieldValue;
use regex::Regex;
use std::sync::LazyLock;

// Local part of dot-atom characters, then a domain of one or more dotted
// labels that do not start or end with a hyphen.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
	)
	.expect("EMAIL_REGEX: invalid regex pattern")
});

const MAX_EMAIL_LENGTH: usize = 254;

/// Whether a string has the shape of an email address
///
/// # Examples
///
/// ```
/// use dirlist_fields::fields::email_field::is_valid_email;
///
/// assert!(is_valid_email("owner@cafe.example"));
/// assert!(!is_valid_email("owner@localhost"));
/// assert!(!is_valid_email("a..b@cafe.example"));
/// ```
pub fn is_valid_email(input: &str) -> bool {
	input.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(input)
}

/// Email address
#[derive(Debug, Clone, Default)]
pub struct EmailField {
	markup: Markup,
}

impl EmailField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for EmailField {
	fn field_type(&self) -> &'static str {
		"email"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Searchable, Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let mut attrs = self.markup.input("email", field, value.as_str().unwrap_or_default());
		attrs.set("autocomplete", "email");
		self.markup.apply_custom(&mut attrs, field);
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// Tags and all whitespace removed
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		let compact: String = raw_to_string(raw)
			.chars()
			.filter(|c| !c.is_whitespace())
			.collect();
		FieldValue::Text(strip_tags(&compact))
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		if value.as_str().is_some_and(is_valid_email) {
			Ok(())
		} else {
			Err(ValidationError::new(
				ErrorCode::InvalidEmail,
				"Enter a valid email address.",
			))
		}
	}

	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		let Some(email) = value.as_str().filter(|s| is_valid_email(s)) else {
			return String::new();
		};
		let mut attrs = Attributes::new();
		attrs.set("href", format!("mailto:{}", email));
		format!("<a{}>{}</a>", attrs.render(), escape_html(email))
	}
}
