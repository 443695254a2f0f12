//! Registry of field types keyed by type tag
//!
//! The registry is a plain value: callers build one, register the types they
//! need and hand it to whatever renders or validates fields. There is no
//! global instance.

use crate::collaborators::Collaborators;
use crate::definition::FieldDefinition;
use crate::error::{FieldsError, FieldsResult};
use crate::field_type::{Feature, FieldType};
use crate::fields::{
	CheckboxField, CheckboxGroupField, ColorField, DateField, DateRangeField, DateTimeField,
	DecimalField, EmailField, FileField, HiddenField, ImageField, NumberField, PhoneField,
	RichTextField, SelectField, SwitchField, TextField, TextareaField, TimeField, UrlField,
};
use crate::markup::Markup;
use crate::settings::FieldSettings;
use std::collections::HashMap;

/// Maps type tags (`"text"`, `"date_range"`, ...) to field type instances
///
/// # Examples
///
/// ```
/// use dirlist_fields::{Collaborators, Feature, FieldSettings, FieldTypeRegistry};
///
/// let settings = FieldSettings::default();
/// let registry = FieldTypeRegistry::with_defaults(&settings, Collaborators::from_settings(&settings));
///
/// assert_eq!(registry.len(), 20);
/// assert!(registry.contains("date_range"));
/// assert!(registry.supporting(Feature::Searchable).contains(&"richtext"));
/// ```
#[derive(Default)]
pub struct FieldTypeRegistry {
	types: HashMap<String, Box<dyn FieldType>>,
}

impl FieldTypeRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every built-in field type, configured from settings
	pub fn with_defaults(settings: &FieldSettings, collaborators: Collaborators) -> Self {
		let markup = Markup::new(settings.namespace.clone());
		let Collaborators {
			attachments,
			sanitizer,
			formatter,
			host,
		} = collaborators;

		let mut registry = Self::new();
		let defaults: Vec<Box<dyn FieldType>> = vec![
			Box::new(TextField::new(markup.clone())),
			Box::new(TextareaField::new(markup.clone())),
			Box::new(RichTextField::new(markup.clone(), sanitizer)),
			Box::new(HiddenField::new(markup.clone())),
			Box::new(NumberField::new(markup.clone(), formatter.clone())),
			Box::new(
				DecimalField::new(markup.clone(), formatter.clone())
					.with_precision(settings.decimal_precision),
			),
			Box::new(CheckboxField::new(markup.clone())),
			Box::new(SwitchField::new(markup.clone())),
			Box::new(SelectField::new(markup.clone())),
			Box::new(CheckboxGroupField::new(markup.clone())),
			Box::new(
				DateField::new(markup.clone(), formatter.clone())
					.with_display_format(settings.date_format.clone()),
			),
			Box::new(
				TimeField::new(markup.clone(), formatter.clone())
					.with_display_format(settings.time_format.clone()),
			),
			Box::new(
				DateTimeField::new(markup.clone(), formatter.clone())
					.with_display_format(settings.datetime_format.clone()),
			),
			Box::new(
				DateRangeField::new(markup.clone(), formatter)
					.with_display_format(settings.date_format.clone())
					.with_separator(settings.range_separator.clone()),
			),
			Box::new(UrlField::new(markup.clone(), host)),
			Box::new(EmailField::new(markup.clone())),
			Box::new(PhoneField::new(markup.clone())),
			Box::new(FileField::new(markup.clone(), attachments.clone())),
			Box::new(ImageField::new(markup.clone(), attachments)),
			Box::new(ColorField::new(markup)),
		];
		for field_type in defaults {
			registry.register(field_type);
		}
		tracing::debug!(
			namespace = %settings.namespace,
			count = registry.len(),
			"registered default field types"
		);
		registry
	}

	/// Register a field type under its own tag, returning any type it replaced
	pub fn register(&mut self, field_type: Box<dyn FieldType>) -> Option<Box<dyn FieldType>> {
		let tag = field_type.field_type().to_string();
		let previous = self.types.insert(tag.clone(), field_type);
		if previous.is_some() {
			tracing::debug!(tag = %tag, "replaced registered field type");
		}
		previous
	}

	pub fn get(&self, tag: &str) -> Option<&dyn FieldType> {
		self.types.get(tag).map(|field_type| &**field_type)
	}

	/// Field type for a definition's `type` tag
	pub fn resolve(&self, field: &FieldDefinition) -> FieldsResult<&dyn FieldType> {
		self.get(&field.field_type).ok_or_else(|| {
			tracing::warn!(field = %field.name, tag = %field.field_type, "unknown field type");
			FieldsError::UnknownFieldType(field.field_type.clone())
		})
	}

	pub fn contains(&self, tag: &str) -> bool {
		self.types.contains_key(tag)
	}

	/// Registered tags in sorted order
	pub fn type_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Sorted tags of the types that participate in a listing feature
	pub fn supporting(&self, feature: Feature) -> Vec<&str> {
		let mut names: Vec<&str> = self
			.types
			.iter()
			.filter(|(_, field_type)| field_type.supports(feature))
			.map(|(tag, _)| tag.as_str())
			.collect();
		names.sort_unstable();
		names
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

impl std::fmt::Debug for FieldTypeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FieldTypeRegistry")
			.field("types", &self.type_names())
			.finish()
	}
}
