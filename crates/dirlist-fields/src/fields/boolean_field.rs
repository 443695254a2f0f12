use crate::definition::FieldDefinition;
use crate::field_type::{Feature, FieldType};
use crate::markup::{Attributes, Markup, escape_attr, input_tag};
use crate::value::FieldValue;

const TRUTHY: &[&str] = &["1", "true", "yes", "on"];

/// Truthy inputs: `true`, `1`, and the strings `1`, `true`, `yes`, `on`
/// (case-insensitive); everything else is false
///
/// # Examples
///
/// ```
/// use dirlist_fields::fields::boolean_field::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!("Yes")));
/// assert!(is_truthy(&json!(1)));
/// assert!(!is_truthy(&json!(2)));
/// assert!(!is_truthy(&json!("off")));
/// ```
pub fn is_truthy(raw: &serde_json::Value) -> bool {
	match raw {
		serde_json::Value::Bool(b) => *b,
		serde_json::Value::Number(n) => n.as_f64() == Some(1.0),
		serde_json::Value::String(s) => TRUTHY.contains(&s.trim().to_lowercase().as_str()),
		_ => false,
	}
}

/// Hidden `0` fallback followed by the checkbox itself, so an unchecked
/// box still submits a value
fn checkbox_control(markup: &Markup, field: &FieldDefinition, checked: bool, extra: &[(&str, &str)]) -> String {
	let mut fallback = Attributes::new();
	fallback
		.set("type", "hidden")
		.set("name", markup.field_name(&field.name))
		.set("value", "0");

	let mut attrs = markup.input("checkbox", field, "1");
	attrs.remove("placeholder");
	for (name, value) in extra {
		attrs.set(*name, *value);
	}
	attrs.set("checked", checked);
	markup.apply_custom(&mut attrs, field);

	format!("{}{}", input_tag(&fallback), input_tag(&attrs))
}

/// Single on/off checkbox
#[derive(Debug, Clone, Default)]
pub struct CheckboxField {
	markup: Markup,
}

impl CheckboxField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for CheckboxField {
	fn field_type(&self) -> &'static str {
		"checkbox"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Filterable]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let control = checkbox_control(&self.markup, field, value.as_bool().unwrap_or(false), &[]);
		self.markup.wrap(field, self.field_type(), &control)
	}

	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Bool(is_truthy(raw))
	}

	/// Unchecked counts as empty, so a required checkbox must be ticked
	fn is_value_empty(&self, value: &FieldValue) -> bool {
		value.as_bool() != Some(true)
	}

	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		String::from(if value.as_bool() == Some(true) { "Yes" } else { "No" })
	}

	fn default_value(&self) -> FieldValue {
		FieldValue::Bool(false)
	}

	fn prepare_value_for_storage(&self, value: &FieldValue) -> String {
		String::from(if value.as_bool() == Some(true) { "1" } else { "0" })
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		FieldValue::Bool(TRUTHY.contains(&stored.trim().to_lowercase().as_str()))
	}
}

/// Toggle switch; a checkbox with switch semantics
#[derive(Debug, Clone, Default)]
pub struct SwitchField {
	inner: CheckboxField,
}

impl SwitchField {
	pub fn new(markup: Markup) -> Self {
		Self {
			inner: CheckboxField::new(markup),
		}
	}
}

impl FieldType for SwitchField {
	fn field_type(&self) -> &'static str {
		"switch"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Filterable]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let markup = &self.inner.markup;
		let checked = value.as_bool().unwrap_or(false);
		let mut class = format!("{ns}-input {ns}-switch", ns = markup.namespace());
		if let Some(extra) = &field.class {
			class.push(' ');
			class.push_str(extra);
		}
		let control = checkbox_control(
			markup,
			field,
			checked,
			&[("role", "switch"), ("aria-checked", if checked { "true" } else { "false" }), ("class", class.as_str())],
		);
		let control = format!(
			r#"<span class="{}-switch-track">{}</span>"#,
			escape_attr(markup.namespace()),
			control
		);
		markup.wrap(field, self.field_type(), &control)
	}

	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		self.inner.sanitize(raw)
	}

	fn is_value_empty(&self, value: &FieldValue) -> bool {
		self.inner.is_value_empty(value)
	}

	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		String::from(if value.as_bool() == Some(true) { "On" } else { "Off" })
	}

	fn default_value(&self) -> FieldValue {
		self.inner.default_value()
	}

	fn prepare_value_for_storage(&self, value: &FieldValue) -> String {
		self.inner.prepare_value_for_storage(value)
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		self.inner.prepare_value_from_storage(stored)
	}
}
