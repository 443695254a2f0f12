//! Custom field types for directory listings
//!
//! This crate provides the field layer of the listing directory:
//! - Declarative field definitions with generic validation rules
//! - A uniform field type contract (render, sanitize, validate, format, storage)
//! - Scalar, temporal, choice, contact and attachment field types
//! - An explicit registry mapping type tags to field types
//! - A pipeline with appendable validators and formatters
//! - Settings loaded from the environment or TOML/JSON files

pub mod collaborators;
pub mod definition;
pub mod error;
pub mod field_type;
pub mod fields;
pub mod markup;
pub mod pipeline;
pub mod registry;
pub mod rules;
pub mod settings;
pub mod value;

pub use collaborators::{
	AllowListSanitizer, Attachment, AttachmentLookup, ChronoFormatter, Collaborators,
	HostUrlResolver, HtmlSanitizer, InMemoryAttachments, LocaleFormatter, StaticHost,
};
pub use definition::{FieldDefinition, ValidationCallback, ValidationRules};
pub use error::{ErrorCode, FieldResult, FieldsError, FieldsResult, ValidationError};
pub use field_type::{Feature, FieldType};
pub use fields::{
	CheckboxField, CheckboxGroupField, ColorField, DateField, DateRangeField, DateTimeField,
	DecimalField, EmailField, FileField, HiddenField, ImageField, NumberField, PhoneField,
	RichTextField, SelectField, SwitchField, TextField, TextareaField, TimeField, UrlField,
};
pub use markup::Markup;
pub use pipeline::{FieldPipeline, Submission};
pub use registry::FieldTypeRegistry;
pub use rules::{ValidationRule, apply_validation_rules};
pub use settings::{FieldSettings, SettingsError};
pub use value::{DateRange, FieldValue};
