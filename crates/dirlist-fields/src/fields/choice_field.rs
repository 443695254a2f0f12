use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, raw_to_string, sanitize_key, sanitize_list, validate_base};
use crate::markup::{Attributes, Markup, escape_attr, escape_html, input_tag};
use crate::value::FieldValue;

fn invalid_option(key: &str) -> ValidationError {
	ValidationError::new(
		ErrorCode::InvalidOption,
		format!(
			"Select a valid choice. {} is not one of the available choices.",
			key
		),
	)
}

/// Single choice from a fixed option list
#[derive(Debug, Clone, Default)]
pub struct SelectField {
	markup: Markup,
}

impl SelectField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for SelectField {
	fn field_type(&self) -> &'static str {
		"select"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Filterable, Feature::Sortable, Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let selected = value.as_str().unwrap_or_default();
		let mut attrs = self.markup.base_attributes(field);
		attrs.remove("placeholder");

		let mut control = format!("<select{}>", attrs.render());
		let prompt = field.placeholder.as_deref().unwrap_or("Select an option");
		control.push_str(&format!(r#"<option value="">{}</option>"#, escape_html(prompt)));
		for (key, label) in &field.options {
			let mut option = Attributes::new();
			option.set("value", key).set("selected", key == selected);
			control.push_str(&format!(
				"<option{}>{}</option>",
				option.render(),
				escape_html(label)
			));
		}
		control.push_str("</select>");
		self.markup.wrap(field, self.field_type(), &control)
	}

	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Text(sanitize_key(&raw_to_string(raw)))
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let key = value.as_str().unwrap_or_default();
		if field.has_option(key) {
			Ok(())
		} else {
			Err(invalid_option(key))
		}
	}

	/// Option label, falling back to the raw key
	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		let key = value.as_str().unwrap_or_default();
		escape_html(field.option_label(key).unwrap_or(key))
	}
}

/// Any number of choices from a fixed option list
#[derive(Debug, Clone, Default)]
pub struct CheckboxGroupField {
	markup: Markup,
}

impl CheckboxGroupField {
	pub fn new(markup: Markup) -> Self {
		Self { markup }
	}
}

impl FieldType for CheckboxGroupField {
	fn field_type(&self) -> &'static str {
		"checkbox_group"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Filterable]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let selected = value.as_list().unwrap_or_default();
		let field_id = self.markup.field_id(&field.name);
		let field_name = format!("{}[]", self.markup.field_name(&field.name));

		let mut attrs = Attributes::new();
		attrs
			.set("id", field_id.as_str())
			.set("class", format!("{}-checkbox-group", self.markup.namespace()));
		if field.required {
			attrs.set("aria-required", "true");
		}
		if field.description.is_some() {
			attrs.set("aria-describedby", self.markup.description_id(&field.name));
		}
		self.markup.apply_custom(&mut attrs, field);

		let mut control = format!("<fieldset{}>{}", attrs.render(), self.markup.legend(field));
		for (idx, (key, label)) in field.options.iter().enumerate() {
			let mut input = Attributes::new();
			input
				.set("type", "checkbox")
				.set("id", format!("{}-{}", field_id, idx))
				.set("name", field_name.as_str())
				.set("value", key)
				.set("checked", selected.contains(key));
			control.push_str(&format!(
				r#"<label class="{}-checkbox-option">{} {}</label>"#,
				escape_attr(self.markup.namespace()),
				input_tag(&input),
				escape_html(label)
			));
		}
		control.push_str("</fieldset>");
		self.markup.wrap_with_label(field, self.field_type(), "", &control)
	}

	/// Elementwise cleanup; blanks and repeats are dropped, order is kept
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldType, FieldValue, fields::CheckboxGroupField};
	/// use serde_json::json;
	///
	/// let group = CheckboxGroupField::default();
	/// assert_eq!(
	///     group.sanitize(&json!(["  wifi  ", "<b>pool</b>", "wifi", ""])),
	///     FieldValue::list(["wifi", "pool"])
	/// );
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		let mut keys: Vec<String> = Vec::new();
		for key in sanitize_list(raw) {
			if !keys.contains(&key) {
				keys.push(key);
			}
		}
		FieldValue::List(keys)
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		match value.as_list() {
			Some(keys) => match keys.iter().find(|key| !field.has_option(key)) {
				Some(key) => Err(invalid_option(key)),
				None => Ok(()),
			},
			None => Err(invalid_option(&value.to_plain_string())),
		}
	}

	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		value
			.as_list()
			.unwrap_or_default()
			.iter()
			.map(|key| escape_html(field.option_label(key).unwrap_or(key)))
			.collect::<Vec<_>>()
			.join(", ")
	}

	fn default_value(&self) -> FieldValue {
		FieldValue::List(Vec::new())
	}

	fn prepare_value_for_storage(&self, value: &FieldValue) -> String {
		serde_json::to_string(value.as_list().unwrap_or_default()).unwrap_or_else(|_| "[]".to_string())
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		if stored.trim().is_empty() {
			return self.default_value();
		}
		match serde_json::from_str::<serde_json::Value>(stored) {
			Ok(raw @ serde_json::Value::Array(_)) => self.sanitize(&raw),
			_ => {
				tracing::warn!(stored = %stored, "unreadable stored checkbox group; using default");
				self.default_value()
			}
		}
	}
}
