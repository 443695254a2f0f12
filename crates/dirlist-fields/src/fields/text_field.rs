use crate::definition::FieldDefinition;
use crate::error::FieldResult;
use crate::field_type::{Feature, FieldType, raw_to_string, sanitize_multiline};
use crate::markup::{Attributes, Markup, escape_html, input_tag, strip_tags};
use crate::value::FieldValue;

/// Length and pattern constraints mirrored into markup
fn apply_text_constraints(attrs: &mut Attributes, field: &FieldDefinition) {
	let validation = &field.validation;
	attrs.set_opt("minlength", validation.min_length.map(|n| n.to_string()));
	attrs.set_opt("maxlength", validation.max_length.map(|n| n.to_string()));
}

/// Single-line text input
#[derive(Debug, Clone, Default)]
pub struct TextField {
	markup: Markup,
}

impl TextField {
	/// Create a text field type rendering under the given markup namespace
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldDefinition, FieldType, FieldValue, Markup, fields::TextField};
	///
	/// let text = TextField::new(Markup::new("acme"));
	/// let field = FieldDefinition::new("city", "text").with_max_length(40);
	/// let html = text.render(&field, &FieldValue::text("Oslo"));
	/// assert!(html.contains(r#"id="acme-field-city""#));
	/// assert!(html.contains(r#"maxlength="40""#));
	/// assert!(html.contains(r#"value="Oslo""#));
	/// ```
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for TextField {
	fn field_type(&self) -> &'static str {
		"text"
	}

	fn features(&self) -> &'static [Feature] {
		&[
			Feature::Searchable,
			Feature::Filterable,
			Feature::Sortable,
			Feature::Repeater,
		]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let mut attrs = self
			.markup
			.input("text", field, value.as_str().unwrap_or_default());
		apply_text_constraints(&mut attrs, field);
		attrs.set_opt("pattern", field.validation.pattern.as_deref());
		self.markup.apply_custom(&mut attrs, field);
		self.markup.wrap(field, self.field_type(), &input_tag(&attrs))
	}
}

/// Multi-line plain text
#[derive(Debug, Clone, Default)]
pub struct TextareaField {
	markup: Markup,
}

impl TextareaField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for TextareaField {
	fn field_type(&self) -> &'static str {
		"textarea"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Searchable]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let mut attrs = self.markup.base_attributes(field);
		attrs.set("rows", "5");
		apply_text_constraints(&mut attrs, field);
		self.markup.apply_custom(&mut attrs, field);
		let control = format!(
			"<textarea{}>{}</textarea>",
			attrs.render(),
			escape_html(value.as_str().unwrap_or_default())
		);
		self.markup.wrap(field, self.field_type(), &control)
	}

	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Text(sanitize_multiline(&raw_to_string(raw)))
	}

	/// Escaped text with line breaks as `<br />`
	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		let Some(text) = value.as_str() else {
			return String::new();
		};
		escape_html(text).replace('\n', "<br />\n")
	}
}

/// Value carried through the form without user interaction
#[derive(Debug, Clone, Default)]
pub struct HiddenField {
	markup: Markup,
}

impl HiddenField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for HiddenField {
	fn field_type(&self) -> &'static str {
		"hidden"
	}

	/// Bare hidden input: no label, description or required semantics
	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let mut attrs = Attributes::new();
		attrs
			.set("type", "hidden")
			.set("id", self.markup.field_id(&field.name))
			.set("name", self.markup.field_name(&field.name))
			.set("value", value.as_str().unwrap_or_default());
		self.markup.apply_custom(&mut attrs, field);
		attrs.remove("required");
		attrs.remove("aria-required");
		input_tag(&attrs)
	}

	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::text(strip_tags(&raw_to_string(raw)).trim())
	}

	fn validate(&self, _value: &FieldValue, _field: &FieldDefinition) -> FieldResult<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorCode;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!("  Joe's   Diner  "), "Joe's Diner")]
	#[case(json!("<script>x</script>Cafe"), "xCafe")]
	#[case(json!("line\nbreak"), "line break")]
	#[case(json!(42), "42")]
	#[case(json!(null), "")]
	#[case(json!(["a"]), "")]
	#[case(json!("Price < 100 and > 50"), "Price < 100 and > 50")]
	#[case(json!("Kids <12 free"), "Kids <12 free")]
	fn test_text_sanitize(#[case] raw: serde_json::Value, #[case] expected: &str) {
		// Arrange
		let text = TextField::default();

		// Act
		let value = text.sanitize(&raw);

		// Assert
		assert_eq!(value, FieldValue::text(expected));
	}

	#[rstest]
	fn test_text_render_required_with_description() {
		// Arrange
		let text = TextField::default();
		let field = FieldDefinition::new("title", "text")
			.with_label("Title")
			.with_description("Shown on cards")
			.with_pattern("[A-Za-z ]+")
			.required();

		// Act
		let html = text.render(&field, &FieldValue::text("A \"quoted\" title"));

		// Assert
		assert!(html.starts_with(r#"<div class="dirlist-field dirlist-field-text">"#));
		assert!(html.contains(r#"<label for="dirlist-field-title">Title <span class="required" aria-hidden="true">*</span></label>"#));
		assert!(html.contains(r#"name="dirlist_field_title""#));
		assert!(html.contains(" required aria-required=\"true\""));
		assert!(html.contains(r#"aria-describedby="dirlist-field-title-description""#));
		assert!(html.contains(r#"pattern="[A-Za-z ]+""#));
		assert!(html.contains(r#"value="A &quot;quoted&quot; title""#));
		assert!(html.contains(r#"<p class="description" id="dirlist-field-title-description">Shown on cards</p>"#));
	}

	#[rstest]
	fn test_custom_attributes_override_type_attributes() {
		// Arrange
		let text = TextField::default();
		let field = FieldDefinition::new("code", "text")
			.with_max_length(10)
			.with_attribute("maxlength", 5);

		// Act
		let html = text.render(&field, &FieldValue::text(""));

		// Assert
		assert!(html.contains(r#"maxlength="5""#));
		assert!(!html.contains(r#"maxlength="10""#));
	}

	#[rstest]
	fn test_textarea_keeps_newlines_and_formats_breaks() {
		// Arrange
		let textarea = TextareaField::default();
		let field = FieldDefinition::new("bio", "textarea");

		// Act
		let value = textarea.sanitize(&json!("  Line <b>one</b>\r\nLine & two  "));
		let display = textarea.format_value(&value, &field);

		// Assert
		assert_eq!(value, FieldValue::text("Line one\nLine & two"));
		assert_eq!(display, "Line one<br />\nLine &amp; two");
	}

	#[rstest]
	fn test_textarea_keeps_comparison_brackets() {
		// Arrange
		let textarea = TextareaField::default();

		// Act
		let value = textarea.sanitize(&json!("Open 9-5\nKids <12 free"));

		// Assert
		assert_eq!(value, FieldValue::text("Open 9-5\nKids <12 free"));
	}

	#[rstest]
	fn test_textarea_render() {
		// Arrange
		let textarea = TextareaField::default();
		let field = FieldDefinition::new("bio", "textarea").with_attribute("rows", 8);

		// Act
		let html = textarea.render(&field, &FieldValue::text("<hi>"));

		// Assert
		assert!(html.contains(r#"rows="8""#));
		assert!(html.contains("&lt;hi&gt;</textarea>"));
	}

	#[rstest]
	fn test_hidden_always_valid_and_renders_bare_input() {
		// Arrange
		let hidden = HiddenField::default();
		let field = FieldDefinition::new("source", "hidden")
			.with_label("Source")
			.with_description("internal")
			.required();

		// Act
		let result = hidden.validate(&hidden.default_value(), &field);
		let html = hidden.render(&field, &FieldValue::text("import"));

		// Assert
		assert!(result.is_ok());
		assert_eq!(
			html,
			r#"<input type="hidden" id="dirlist-field-source" name="dirlist_field_source" value="import" />"#
		);
	}

	#[rstest]
	fn test_hidden_sanitize_strips_and_trims() {
		assert_eq!(
			HiddenField::default().sanitize(&json!("  <em>ref-42</em> ")),
			FieldValue::text("ref-42")
		);
		assert_eq!(HiddenField::default().sanitize(&json!("a<b")), FieldValue::text("a<b"));
	}

	#[rstest]
	fn test_text_required_gate() {
		// Arrange
		let text = TextField::default();
		let field = FieldDefinition::new("title", "text").required();

		// Act
		let err = text.validate(&text.default_value(), &field).unwrap_err();

		// Assert
		assert_eq!(err.code, ErrorCode::Required);
	}

	#[rstest]
	fn test_features() {
		assert!(TextField::default().supports(Feature::Sortable));
		assert!(TextareaField::default().supports(Feature::Searchable));
		assert!(!TextareaField::default().supports(Feature::Filterable));
		assert!(HiddenField::default().features().is_empty());
	}
}
