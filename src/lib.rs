//! # dirlist
//!
//! Building blocks for a directory/listing CMS.
//!
//! ## Feature Flags
//!
//! - `fields` (default) - Custom-field type system: field definitions, the
//!   registry of field types, and the submit/display pipeline
//! - `full` - All features enabled
//!
//! ## Quick Example
//!
//! ```rust
//! use dirlist::prelude::*;
//! use serde_json::json;
//!
//! let settings = FieldSettings::default();
//! let pipeline = FieldPipeline::new(FieldTypeRegistry::with_defaults(
//!     &settings,
//!     Collaborators::from_settings(&settings),
//! ));
//!
//! let phone = FieldDefinition::new("phone", "phone").with_label("Phone").required();
//! let stored = pipeline.submit(&phone, &json!("+1 (555) 123-4567")).unwrap();
//! assert_eq!(
//!     pipeline.display(&phone, &stored).unwrap(),
//!     r#"<a href="tel:+15551234567">+1 (555) 123-4567</a>"#
//! );
//! ```

#[cfg(feature = "fields")]
pub use dirlist_fields as fields;

/// Commonly used types
pub mod prelude {
	#[cfg(feature = "fields")]
	pub use dirlist_fields::{
		Collaborators, ErrorCode, Feature, FieldDefinition, FieldPipeline, FieldSettings,
		FieldType, FieldTypeRegistry, FieldValue, FieldsError, Submission, ValidationError,
	};
}
