use crate::collaborators::{Attachment, AttachmentLookup, InMemoryAttachments};
use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::field_type::{Feature, FieldType, validate_base};
use crate::markup::{Attributes, Markup, escape_html, input_tag};
use crate::value::FieldValue;
use std::sync::Arc;

/// Attachment id from raw input; anything that is not a non-negative
/// integer means "no file"
fn attachment_id(raw: &serde_json::Value) -> u64 {
	match raw {
		serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
		serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
		serde_json::Value::Object(map) => map.get("id").map(attachment_id).unwrap_or(0),
		_ => 0,
	}
}

fn decode_stored_id(stored: &str) -> FieldValue {
	let trimmed = stored.trim();
	if trimmed.is_empty() {
		return FieldValue::Attachment(0);
	}
	match trimmed.parse() {
		Ok(id) => FieldValue::Attachment(id),
		Err(_) => {
			tracing::warn!(stored = %stored, "unreadable stored attachment id; using default");
			FieldValue::Attachment(0)
		}
	}
}

fn size_check(attachment: &Attachment, field: &FieldDefinition) -> FieldResult<()> {
	match (field.max_size, attachment.size) {
		(Some(max), Some(size)) if size > max => Err(ValidationError::new(
			ErrorCode::FileTooLarge,
			format!("The file is too large ({} bytes, at most {} allowed).", size, max),
		)),
		_ => Ok(()),
	}
}

fn extension_allowed(attachment: &Attachment, field: &FieldDefinition) -> bool {
	if field.allowed_types.is_empty() {
		return true;
	}
	attachment
		.extension()
		.is_some_and(|ext| field.allows_extension(&ext))
}

/// Shared by both attachment types: resolves the id or reports
/// `invalid_attachment`
fn resolve_attachment(
	attachments: &dyn AttachmentLookup,
	value: &FieldValue,
) -> FieldResult<Attachment> {
	value
		.as_attachment()
		.and_then(|id| attachments.resolve(id))
		.ok_or_else(|| {
			ValidationError::new(
				ErrorCode::InvalidAttachment,
				"The selected file does not exist.",
			)
		})
}

fn media_control(
	markup: &Markup,
	field: &FieldDefinition,
	value: &FieldValue,
	preview: &str,
	button_label: &str,
) -> String {
	let id = value.as_attachment().unwrap_or(0);
	let mut attrs = markup.input("hidden", field, &id.to_string());
	attrs.remove("placeholder");
	if !field.allowed_types.is_empty() {
		attrs.set("data-allowed-types", field.allowed_types.join(","));
	}
	markup.apply_custom(&mut attrs, field);

	let mut button = Attributes::new();
	button
		.set("type", "button")
		.set("class", format!("{}-media-select", markup.namespace()))
		.set("data-target", markup.field_id(&field.name));

	format!(
		r#"<div class="{ns}-media-preview">{preview}</div>{input}<button{button}>{label}</button>"#,
		ns = escape_html(markup.namespace()),
		preview = preview,
		input = input_tag(&attrs),
		button = button.render(),
		label = escape_html(button_label),
	)
}

/// Reference to a document in the media store
#[derive(Clone)]
pub struct FileField {
	markup: Markup,
	attachments: Arc<dyn AttachmentLookup>,
}

impl FileField {
	pub fn new(markup: Markup, attachments: Arc<dyn AttachmentLookup>) -> Self {
		Self {
			markup,
			attachments,
		}
	}
}

impl Default for FileField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(InMemoryAttachments::new()))
	}
}

impl std::fmt::Debug for FileField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FileField")
			.field("markup", &self.markup)
			.finish_non_exhaustive()
	}
}

impl FieldType for FileField {
	fn field_type(&self) -> &'static str {
		"file"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let preview = self.format_value(value, field);
		let control = media_control(&self.markup, field, value, &preview, "Select file");
		self.markup.wrap(field, self.field_type(), &control)
	}

	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{FieldType, FieldValue, fields::FileField};
	/// use serde_json::json;
	///
	/// let file = FileField::default();
	/// assert_eq!(file.sanitize(&json!("42")), FieldValue::Attachment(42));
	/// assert_eq!(file.sanitize(&json!({"id": 7})), FieldValue::Attachment(7));
	/// assert_eq!(file.sanitize(&json!(-3)), FieldValue::Attachment(0));
	/// ```
	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Attachment(attachment_id(raw))
	}

	/// `0` means no file
	fn is_value_empty(&self, value: &FieldValue) -> bool {
		value.as_attachment().unwrap_or(0) == 0
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let attachment = resolve_attachment(self.attachments.as_ref(), value)?;
		if !extension_allowed(&attachment, field) {
			return Err(ValidationError::new(
				ErrorCode::InvalidFileType,
				format!(
					"This file type is not allowed. Allowed types: {}.",
					field.allowed_types.join(", ")
				),
			));
		}
		size_check(&attachment, field)
	}

	/// Download link, or the bare URL when the file has no usable name
	fn format_value(&self, value: &FieldValue, _field: &FieldDefinition) -> String {
		let Some(attachment) = value.as_attachment().and_then(|id| self.attachments.resolve(id)) else {
			return String::new();
		};
		if attachment.url.is_empty() {
			return String::new();
		}
		let text = attachment
			.title
			.clone()
			.filter(|t| !t.trim().is_empty())
			.unwrap_or_else(|| attachment.file_name().to_string());
		if text.is_empty() {
			return escape_html(&attachment.url);
		}
		let mut attrs = Attributes::new();
		attrs
			.set("href", attachment.url.as_str())
			.set("class", format!("{}-file-link", self.markup.namespace()));
		format!("<a{}>{}</a>", attrs.render(), escape_html(&text))
	}

	fn default_value(&self) -> FieldValue {
		FieldValue::Attachment(0)
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		decode_stored_id(stored)
	}
}

/// Reference to an image in the media store
#[derive(Clone)]
pub struct ImageField {
	markup: Markup,
	attachments: Arc<dyn AttachmentLookup>,
}

impl ImageField {
	pub fn new(markup: Markup, attachments: Arc<dyn AttachmentLookup>) -> Self {
		Self {
			markup,
			attachments,
		}
	}
}

impl Default for ImageField {
	fn default() -> Self {
		Self::new(Markup::default(), Arc::new(InMemoryAttachments::new()))
	}
}

impl std::fmt::Debug for ImageField {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ImageField")
			.field("markup", &self.markup)
			.finish_non_exhaustive()
	}
}

impl FieldType for ImageField {
	fn field_type(&self) -> &'static str {
		"image"
	}

	fn features(&self) -> &'static [Feature] {
		&[Feature::Repeater]
	}

	fn render(&self, field: &FieldDefinition, value: &FieldValue) -> String {
		let preview = self.format_value(value, field);
		let control = media_control(&self.markup, field, value, &preview, "Select image");
		self.markup.wrap(field, self.field_type(), &control)
	}

	fn sanitize(&self, raw: &serde_json::Value) -> FieldValue {
		FieldValue::Attachment(attachment_id(raw))
	}

	fn is_value_empty(&self, value: &FieldValue) -> bool {
		value.as_attachment().unwrap_or(0) == 0
	}

	fn validate(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		if !validate_base(self, value, field)? {
			return Ok(());
		}
		let attachment = resolve_attachment(self.attachments.as_ref(), value)?;
		if !self.attachments.is_image(attachment.id) {
			return Err(ValidationError::new(
				ErrorCode::NotAnImage,
				"The selected file is not an image.",
			));
		}
		if !extension_allowed(&attachment, field) {
			return Err(ValidationError::new(
				ErrorCode::InvalidImageType,
				format!(
					"This image type is not allowed. Allowed types: {}.",
					field.allowed_types.join(", ")
				),
			));
		}
		size_check(&attachment, field)
	}

	/// Store-provided thumbnail, falling back to a plain `<img>`
	fn format_value(&self, value: &FieldValue, field: &FieldDefinition) -> String {
		let Some(id) = value.as_attachment().filter(|id| *id != 0) else {
			return String::new();
		};
		if let Some(thumbnail) = self.attachments.thumbnail_html(id) {
			return thumbnail;
		}
		let Some(attachment) = self.attachments.resolve(id) else {
			return String::new();
		};
		if attachment.url.is_empty() {
			return String::new();
		}
		let alt = attachment
			.title
			.clone()
			.unwrap_or_else(|| field.display_label().to_string());
		let mut attrs = Attributes::new();
		attrs
			.set("src", attachment.url.as_str())
			.set("alt", alt)
			.set("loading", "lazy");
		format!("<img{} />", attrs.render())
	}

	fn default_value(&self) -> FieldValue {
		FieldValue::Attachment(0)
	}

	fn prepare_value_from_storage(&self, stored: &str) -> FieldValue {
		decode_stored_id(stored)
	}
}
