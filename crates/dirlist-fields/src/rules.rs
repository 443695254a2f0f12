//! Generic validation rules shared by all field types
//!
//! Rules run in a fixed order: `required`, `min_length`, `max_length`,
//! `pattern`, `callback`. The first failing rule ends evaluation; errors are
//! never accumulated.

use crate::definition::{FieldDefinition, ValidationCallback};
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::value::FieldValue;
use regex::Regex;

/// One generic rule, in evaluation order
#[derive(Debug, Clone)]
pub enum ValidationRule {
	Required,
	MinLength(usize),
	MaxLength(usize),
	Pattern(String),
	Callback(ValidationCallback),
}

impl ValidationRule {
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::Required => ErrorCode::Required,
			Self::MinLength(_) => ErrorCode::MinLength,
			Self::MaxLength(_) => ErrorCode::MaxLength,
			Self::Pattern(_) => ErrorCode::Pattern,
			Self::Callback(_) => ErrorCode::ValidationCallbackFailed,
		}
	}

	/// Check a single rule against a value
	pub fn check(&self, value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
		match self {
			Self::Required => {
				if is_empty(value) {
					Err(ValidationError::required())
				} else {
					Ok(())
				}
			}
			Self::MinLength(min) => match value.as_str() {
				Some(text) if text.chars().count() < *min => Err(ValidationError::new(
					self.code(),
					format!(
						"Ensure this value has at least {} characters (it has {}).",
						min,
						text.chars().count()
					),
				)),
				_ => Ok(()),
			},
			Self::MaxLength(max) => match value.as_str() {
				Some(text) if text.chars().count() > *max => Err(ValidationError::new(
					self.code(),
					format!(
						"Ensure this value has at most {} characters (it has {}).",
						max,
						text.chars().count()
					),
				)),
				_ => Ok(()),
			},
			Self::Pattern(pattern) => {
				let Some(text) = value.as_str() else {
					return Ok(());
				};
				let matched = match Regex::new(&format!("^(?:{})$", pattern)) {
					Ok(re) => re.is_match(text),
					Err(e) => {
						tracing::warn!(field = %field.name, pattern = %pattern, error = %e, "invalid validation pattern");
						false
					}
				};
				if matched {
					Ok(())
				} else {
					Err(ValidationError::new(
						self.code(),
						"Enter a value in the requested format.",
					))
				}
			}
			Self::Callback(callback) => {
				if callback.call(value, field) {
					Ok(())
				} else {
					Err(ValidationError::new(self.code(), "Enter a valid value."))
				}
			}
		}
	}
}

/// Empty-value check used by the `required` rule
///
/// `0` and `false` are values, not absence.
///
/// # Examples
///
/// ```
/// use dirlist_fields::{FieldValue, rules::is_empty};
///
/// assert!(is_empty(&FieldValue::text("   ")));
/// assert!(is_empty(&FieldValue::Null));
/// assert!(is_empty(&FieldValue::List(vec![])));
/// assert!(!is_empty(&FieldValue::Integer(0)));
/// assert!(!is_empty(&FieldValue::Bool(false)));
/// ```
pub fn is_empty(value: &FieldValue) -> bool {
	match value {
		FieldValue::Null => true,
		FieldValue::Text(text) => text.trim().is_empty(),
		FieldValue::List(items) => items.is_empty(),
		FieldValue::Range(range) => range.is_blank(),
		FieldValue::Bool(_)
		| FieldValue::Integer(_)
		| FieldValue::Float(_)
		| FieldValue::Attachment(_) => false,
	}
}

/// Rules configured on a definition, in evaluation order
pub fn rules_for(field: &FieldDefinition) -> Vec<ValidationRule> {
	let mut rules = Vec::new();
	if field.required {
		rules.push(ValidationRule::Required);
	}
	let validation = &field.validation;
	if let Some(min) = validation.min_length {
		rules.push(ValidationRule::MinLength(min));
	}
	if let Some(max) = validation.max_length {
		rules.push(ValidationRule::MaxLength(max));
	}
	if let Some(pattern) = validation.pattern.as_ref().filter(|p| !p.is_empty()) {
		rules.push(ValidationRule::Pattern(pattern.clone()));
	}
	if let Some(callback) = &validation.callback {
		rules.push(ValidationRule::Callback(callback.clone()));
	}
	rules
}

/// Evaluate the generic rules of `field` against `value`
///
/// An empty value only ever trips the `required` rule; the remaining rules
/// are skipped for it.
///
/// # Examples
///
/// ```
/// use dirlist_fields::{ErrorCode, FieldDefinition, FieldValue, rules::apply_validation_rules};
///
/// let field = FieldDefinition::new("zip", "text").with_pattern(r"\d{5}");
/// assert!(apply_validation_rules(&FieldValue::text("12345"), &field).is_ok());
/// let err = apply_validation_rules(&FieldValue::text("1234a"), &field).unwrap_err();
/// assert_eq!(err.code, ErrorCode::Pattern);
/// assert!(apply_validation_rules(&FieldValue::text(""), &field).is_ok());
/// ```
pub fn apply_validation_rules(value: &FieldValue, field: &FieldDefinition) -> FieldResult<()> {
	let empty = is_empty(value);
	for rule in rules_for(field) {
		if empty && !matches!(rule, ValidationRule::Required) {
			break;
		}
		rule.check(value, field)?;
	}
	Ok(())
}
