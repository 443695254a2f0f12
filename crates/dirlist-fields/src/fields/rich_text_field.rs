use crate::collaborators::{AllowListSanitizer, HtmlSanitizer};
use crate::definition::FieldDefinition;
use crate::field_type::{Feature, FieldType, raw_to_string};
use crate::markup::{Markup, escape_html, strip_tags};
use crate::value::FieldValue;
use std::sync::Arc;

/// HTML content restricted to an allow-list
#[derive(Clone)]
pub struct RichTextField {
	markup: Markup,
	sanitizer: Arc<dyn HtmlSanitizer>,
}

impl RichTextField {
	pub fn new(markup: Markup, sanitizer: Arc<dyn HtmlSanitizer>) -> Self {
		Self { markup, sanitizer }
	}
}

impl Default for RichTextField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(AllowListSanitizer::new()))
	}
}

impl std::fmt::Debug for RichTextField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RichTextField")
			.field("markup", &self.markup)
			.finish_non_exhaustive()
	}
}

impl FieldType for RichTextField {
	fn field_type(&self) -> &'static str {
		"richtext"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Searchable]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let mut attrs = self.markup.base_attributes(field);
		attrs.set("rows", "10").set("data-editor", "rich");
		self.markup.apply_custom(&mut attrs, field);
		let control = format!(
			"<textarea{}>{}</textarea>",
			attrs.render(),
			escape_html(value.as_str().unwrap_or_default())
		);
		self.markup.wrap(field, self.field_type(), &control)
	}

	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldType, FieldValue, fields::RichTextField};
	/// use serde_json::json;
	///
	/// let rich = RichTextField::default();
	/// let value = rich.sanitize(&json!("<p onclick=\"x()\">Open <b>daily</b></p><script>bad()</script>"));
	/// assert_eq!(value, FieldValue::text("<p>Open <b>daily</b></p>"));
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::text(self.sanitizer.sanitize(&raw_to_string(raw)).trim())
	}

	/// Markup without visible text counts as empty
	fn is_value_empty(&self, value: &FieldValue) -> bool {
		match value.as_str() {
			Some(html) => strip_tags(html).trim().is_empty() && !html.contains("<img"),
			None => true,
		}
	}

	/// Trusted after sanitize; returned unchanged
	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		value.as_str().unwrap_or_default().to_string()
	}
}
