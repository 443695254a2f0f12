//! Caller-facing control flow around the registry
//!
//! Submitting runs sanitize, validate, any appended validators and finally
//! the storage encoding. Displaying runs the storage decoding, the type's
//! formatter and any appended formatters. Validators and formatters can apply
//! to every field or only to one type tag.

use crate::definition::FieldDefinition;
use crate::error::{FieldResult, FieldsError, FieldsResult, ValidationError};
use crate::field_type::FieldType;
use crate::registry::FieldTypeRegistry;
use crate::value::FieldValue;
use std::collections::BTreeMap;

type ValidatorFn = Box<dyn Fn(&FieldValue, &FieldDefinition) -> FieldResult<()> + Send + Sync>;
type FormatterFn = Box<dyn Fn(String, &FieldValue, &FieldDefinition) -> String + Send + Sync>;

/// Extension point scoped to all fields or to one type tag
struct Scoped<F> {
	tag: Option<String>,
	func: F,
}

impl<F> Scoped<F> {
	fn applies_to(&self, field: &FieldDefinition) -> bool {
		self.tag.as_deref().is_none_or(|tag| tag == field.field_type)
	}
}

/// Outcome of submitting a set of fields at once
#[derive(Debug, Default)]
pub struct Submission {
	/// Storage strings of the fields that passed
	pub stored: BTreeMap<String, String>,
	/// First error for each field that failed
	pub errors: BTreeMap<String, FieldsError>,
}

impl Submission {
	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	/// Validation failure recorded for a field, if any
	pub fn validation_error(&self, name: &str) -> Option<&ValidationError> {
		match self.errors.get(name) {
			Some(FieldsError::Validation(err)) => Some(err),
			_ => None,
		}
	}
}

/// Registry plus appended validators and formatters
///
/// # Examples
///
/// ```
/// use dirlist_fields::{
///     Collaborators, ErrorCode, FieldDefinition, FieldPipeline, FieldSettings, FieldTypeRegistry,
///     ValidationError,
/// };
/// use serde_json::json;
///
/// let settings = FieldSettings::default();
/// let mut pipeline = FieldPipeline::new(FieldTypeRegistry::with_defaults(
///     &settings,
///     Collaborators::from_settings(&settings),
/// ));
/// pipeline.add_validator_for("text", |value, _field| {
///     if value.as_str().is_some_and(|s| s.contains("spam")) {
///         Err(ValidationError::new(ErrorCode::Custom("spam".into()), "No spam."))
///     } else {
///         Ok(())
///     }
/// });
///
/// let field = FieldDefinition::new("tagline", "text");
/// assert_eq!(pipeline.submit(&field, &json!("  Fresh <b>bread</b> ")).unwrap(), "Fresh bread");
/// assert!(pipeline.submit(&field, &json!("buy spam")).is_err());
/// ```
pub struct FieldPipeline {
	registry: FieldTypeRegistry,
	validators: Vec<Scoped<ValidatorFn>>,
	formatters: Vec<Scoped<FormatterFn>>,
}

impl FieldPipeline {
	pub fn new(registry: FieldTypeRegistry) -> Self {
		Self {
			registry,
			validators: Vec::new(),
			formatters: Vec::new(),
		}
	}

	pub fn registry(&self) -> &FieldTypeRegistry {
		&self.registry
	}

	pub fn registry_mut(&mut self) -> &mut FieldTypeRegistry {
		&mut self.registry
	}

	/// Append a validator that runs after the type's own validation for every field
	pub fn add_validator<F>(&mut self, f: F) -> &mut Self
	where
		F: Fn(&FieldValue, &FieldDefinition) -> FieldResult<()> + Send + Sync + 'static,
	{
		self.validators.push(Scoped {
			tag: None,
			func: Box::new(f),
		});
		self
	}

	/// Append a validator for fields of one type tag
	pub fn add_validator_for<F>(&mut self, tag: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(&FieldValue, &FieldDefinition) -> FieldResult<()> + Send + Sync + 'static,
	{
		self.validators.push(Scoped {
			tag: Some(tag.into()),
			func: Box::new(f),
		});
		self
	}

	/// Append a formatter that receives the display HTML produced so far
	pub fn add_formatter<F>(&mut self, f: F) -> &mut Self
	where
		F: Fn(String, &FieldValue, &FieldDefinition) -> String + Send + Sync + 'static,
	{
		self.formatters.push(Scoped {
			tag: None,
			func: Box::new(f),
		});
		self
	}

	pub fn add_formatter_for<F>(&mut self, tag: impl Into<String>, f: F) -> &mut Self
	where
		F: Fn(String, &FieldValue, &FieldDefinition) -> String + Send + Sync + 'static,
	{
		self.formatters.push(Scoped {
			tag: Some(tag.into()),
			func: Box::new(f),
		});
		self
	}

	fn field_type(&self, field: &FieldDefinition) -> FieldsResult<&dyn FieldType> {
		self.registry.resolve(field)
	}

	/// Sanitize and validate raw input; the first failure wins
	pub fn clean(&self, field: &FieldDefinition, raw: &serde_json::Value) -> FieldsResult<FieldValue> {
		let field_type = self.field_type(field)?;
		let value = field_type.sanitize_for(raw, field);
		tracing::debug!(field = %field.name, tag = %field.field_type, "sanitized field input");

		let checked = field_type.validate(&value, field).and_then(|()| {
			self.validators
				.iter()
				.filter(|v| v.applies_to(field))
				.try_for_each(|v| (v.func)(&value, field))
		});
		if let Err(err) = checked {
			tracing::debug!(field = %field.name, code = %err.code, "field validation failed");
			return Err(err.into());
		}
		Ok(value)
	}

	/// Clean raw input and encode it for storage
	///
	/// Nothing is encoded when validation fails.
	pub fn submit(&self, field: &FieldDefinition, raw: &serde_json::Value) -> FieldsResult<String> {
		let value = self.clean(field, raw)?;
		let stored = self.field_type(field)?.prepare_value_for_storage(&value);
		tracing::debug!(field = %field.name, "encoded field value for storage");
		Ok(stored)
	}

	pub fn load(&self, field: &FieldDefinition, stored: &str) -> FieldsResult<FieldValue> {
		Ok(self.field_type(field)?.prepare_value_from_storage(stored))
	}

	/// Display HTML for a stored value, after every applicable formatter
	pub fn display(&self, field: &FieldDefinition, stored: &str) -> FieldsResult<String> {
		let field_type = self.field_type(field)?;
		let value = field_type.prepare_value_from_storage(stored);
		let formatted = self
			.formatters
			.iter()
			.filter(|f| f.applies_to(field))
			.fold(field_type.format_value(&value, field), |html, f| {
				(f.func)(html, &value, field)
			});
		Ok(formatted)
	}

	/// Form control for a stored value, or for the type default when unset
	pub fn render(&self, field: &FieldDefinition, stored: Option<&str>) -> FieldsResult<String> {
		let field_type = self.field_type(field)?;
		let value = match stored {
			Some(stored) => field_type.prepare_value_from_storage(stored),
			None => field_type.default_value(),
		};
		tracing::trace!(field = %field.name, tag = %field.field_type, "rendering field");
		Ok(field_type.render(field, &value))
	}

	/// Submit several fields from one input map; missing keys count as null
	pub fn submit_all(
		&self,
		fields: &[FieldDefinition],
		input: &serde_json::Map<String, serde_json::Value>,
	) -> Submission {
		let mut submission = Submission::default();
		for field in fields {
			let raw = input.get(&field.name).unwrap_or(&serde_json::Value::Null);
			match self.submit(field, raw) {
				Ok(stored) => {
					submission.stored.insert(field.name.clone(), stored);
				}
				Err(err) => {
					submission.errors.insert(field.name.clone(), err);
				}
			}
		}
		tracing::debug!(
			fields = fields.len(),
			errors = submission.errors.len(),
			"submitted fields"
		);
		submission
	}
}

impl std::fmt::Debug for FieldPipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FieldPipeline")
			.field("registry", &self.registry)
			.field("validators", &self.validators.len())
			.field("formatters", &self.formatters.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::collaborators::Collaborators;
	use crate::error::ErrorCode;
	use crate::settings::FieldSettings;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn pipeline() -> FieldPipeline {
		let settings = FieldSettings::default();
		FieldPipeline::new(FieldTypeRegistry::with_defaults(
			&settings,
			Collaborators::from_settings(&settings),
		))
	}

	#[rstest]
	fn test_submit_does_not_encode_invalid(pipeline: FieldPipeline) {
		// Arrange
		let field = FieldDefinition::new("price", "number").with_max(100);

		// Act
		let result = pipeline.submit(&field, &json!("250"));

		// Assert
		assert!(matches!(
			result,
			Err(FieldsError::Validation(ref e)) if e.code == ErrorCode::MaxValue
		));
	}

	#[rstest]
	fn test_scoped_validator_only_runs_for_its_tag(mut pipeline: FieldPipeline) {
		// Arrange
		pipeline.add_validator_for("email", |_, _| {
			Err(ValidationError::new(ErrorCode::Custom("blocked".into()), "Blocked."))
		});
		let text = FieldDefinition::new("name", "text");
		let email = FieldDefinition::new("contact", "email");

		// Act
		let text_result = pipeline.submit(&text, &json!("Cafe"));
		let email_result = pipeline.submit(&email, &json!("a@b.example"));

		// Assert
		assert_eq!(text_result.unwrap(), "Cafe");
		assert!(matches!(
			email_result,
			Err(FieldsError::Validation(ref e)) if e.code.as_str() == "blocked"
		));
	}

	#[rstest]
	fn test_type_validation_runs_before_appended(mut pipeline: FieldPipeline) {
		// Arrange
		pipeline.add_validator(|_, _| {
			Err(ValidationError::new(ErrorCode::Custom("late".into()), "Late."))
		});
		let field = FieldDefinition::new("name", "text").required();

		// Act
		let err = pipeline.clean(&field, &json!("")).unwrap_err();

		// Assert
		assert!(matches!(err, FieldsError::Validation(ref e) if e.code == ErrorCode::Required));
	}

	#[rstest]
	fn test_display_chains_formatters(mut pipeline: FieldPipeline) {
		// Arrange
		pipeline
			.add_formatter(|html, _, _| format!("<span>{}</span>", html))
			.add_formatter_for("checkbox", |html, value, _| {
				if value.as_bool() == Some(true) {
					format!("{} &#10003;", html)
				} else {
					html
				}
			});
		let checkbox = FieldDefinition::new("parking", "checkbox");
		let text = FieldDefinition::new("name", "text");

		// Act & Assert
		assert_eq!(pipeline.display(&checkbox, "1").unwrap(), "<span>Yes</span> &#10003;");
		assert_eq!(pipeline.display(&text, "A & B").unwrap(), "<span>A &amp; B</span>");
	}

	#[rstest]
	fn test_render_uses_default_when_unset(pipeline: FieldPipeline) {
		// Arrange
		let field = FieldDefinition::new("parking", "checkbox");

		// Act
		let unset = pipeline.render(&field, None).unwrap();
		let set = pipeline.render(&field, Some("1")).unwrap();

		// Assert
		assert!(!unset.contains("checked"));
		assert!(set.contains("checked"));
	}

	#[rstest]
	fn test_submit_all_collects_first_error_per_field(pipeline: FieldPipeline) {
		// Arrange
		let fields = vec![
			FieldDefinition::new("name", "text").required(),
			FieldDefinition::new("contact", "email"),
			FieldDefinition::new("stars", "rating"),
			FieldDefinition::new("open_on", "date"),
		];
		let input = json!({
			"contact": "not-an-email",
			"open_on": "2024-06-15",
		});
		let input = input.as_object().unwrap();

		// Act
		let submission = pipeline.submit_all(&fields, input);

		// Assert
		assert!(!submission.is_valid());
		assert_eq!(submission.validation_error("name").unwrap().code, ErrorCode::Required);
		assert_eq!(
			submission.validation_error("contact").unwrap().code,
			ErrorCode::InvalidEmail
		);
		assert!(matches!(
			submission.errors.get("stars"),
			Some(FieldsError::UnknownFieldType(_))
		));
		assert_eq!(submission.stored.get("open_on").map(String::as_str), Some("2024-06-15"));
		assert_eq!(submission.stored.len(), 1);
	}
}
