use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, validate_base};
use crate::markup::{Attributes, Markup, escape_html, input_tag, strip_tags};
use crate::value::FieldValue;

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

fn is_phone_char(c: char) -> bool {
	c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '.' | '(' | ')')
}

/// `tel:` target: digits only, keeping a leading `+`
///
/// # Examples
///
/// ```
/// use dirlist_fields::fields::phone_field::tel_href;
///
/// assert_eq!(tel_href("+44 20 7946 0958"), "tel:+442079460958");
/// assert_eq!(tel_href("(555) 123-4567"), "tel:5551234567");
/// ```
pub fn tel_href(phone: &str) -> String {
	let trimmed = phone.trim();
	let prefix = if trimmed.starts_with('+') { "+" } else { "" };
	let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
	format!("tel:{}{}", prefix, digits)
}

/// Telephone number in free formatting
#[derive(Debug, Clone, Default)]
pub struct PhoneField {
	markup: Markup,
}

impl PhoneField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for PhoneField {
	fn field_type(&self) -> &'static str {
		"phone"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Searchable, Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let mut attrs = self.markup.input("tel", field, value.as_str().unwrap_or_default());
		attrs.set("autocomplete", "tel").set("inputmode", "tel");
		self.markup.apply_custom(&mut attrs, field);
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}

	/// Only digits, spaces, `+`, `-`, `.` and parentheses survive
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		let kept: String = strip_tags(&raw_to_string(raw))
			.chars()
			.map(|c| if c.is_whitespace() { ' ' } else { c })
			.filter(|c| is_phone_char(*c))
			.collect();
		FieldValue::Text(kept.split_whitespace().collect::<Vec<_>>().join(" "))
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let phone = value.as_str().unwrap_or_default();
		let digits = phone.chars().filter(char::is_ascii_digit).count();
		if phone.chars().all(is_phone_char) && (MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
			Ok(())
		} else {
			Err(ValidationError::new(
				ErrorCode::InvalidPhone,
				format!(
					"Enter a valid phone number with {} to {} digits.",
					MIN_DIGITS, MAX_DIGITS
				),
			))
		}
	}

	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		let phone = value.as_str().unwrap_or_default();
		if !phone.chars().any(|c| c.is_ascii_digit()) {
			return String::new();
		}
		let mut attrs = Attributes::new();
		attrs.set("href", tel_href(phone));
		format!("<a{}>{}</a>", attrs.render(), escape_html(phone))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("123456", false)]
	#[case("1234567", true)]
	#[case("+44 20 7946 0958", true)]
	#[case("(555) 123-4567", true)]
	#[case("555.123.4567", true)]
	#[case("1234567890123456", false)]
	#[case("555-CALL-NOW", false)]
	fn test_phone_validate(#[case] input: &str, #[case] ok: bool) {
		// Arrange
		let phone = PhoneField::default();
		let field = FieldDefinition::new("phone", "phone");

		// Act
		let result = phone.validate(&FieldValue::text(input), &field);

		// Assert
		assert_eq!(result.is_ok(), ok, "{}", input);
		if !ok {
			assert_eq!(result.unwrap_err().code, ErrorCode::InvalidPhone);
		}
	}

	#[rstest]
	fn test_phone_sanitize_drops_letters_and_tags() {
		assert_eq!(
			PhoneField::default().sanitize(&json!(" <b>Tel:</b> +1 (555)\t123-4567 ext ")),
			FieldValue::text("+1 (555) 123-4567")
		);
	}

	#[rstest]
	fn test_phone_format_tel_link() {
		// Arrange
		let phone = PhoneField::default();
		let field = FieldDefinition::new("phone", "phone");

		// Act
		let html = phone.format_value(&FieldValue::text("+44 20 7946 0958"), &field);

		// Assert
		assert_eq!(html, r#"<a href="tel:+442079460958">+44 20 7946 0958</a>"#);
		assert_eq!(phone.format_value(&FieldValue::text(""), &field), "");
	}
}
