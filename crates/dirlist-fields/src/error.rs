//! Error types for field validation and configuration.
//!
//! Validation failures carry a stable machine-readable [`ErrorCode`] next to a
//! human message. Only the first violated rule is ever reported.

use crate::settings::SettingsError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Machine-readable validation failure code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
	// Presence
	Required,
	// Generic shape
	MinLength,
	MaxLength,
	Pattern,
	ValidationCallbackFailed,
	// Numeric range
	NotNumeric,
	MinValue,
	MaxValue,
	// Temporal
	InvalidDate,
	InvalidTime,
	InvalidDatetime,
	DateTooEarly,
	DateTooLate,
	TimeTooEarly,
	TimeTooLate,
	DatetimeTooEarly,
	DatetimeTooLate,
	EndBeforeStart,
	StartTooEarly,
	StartTooLate,
	EndTooEarly,
	EndTooLate,
	InvalidStartDate,
	InvalidEndDate,
	// Format-specific
	InvalidUrl,
	InvalidEmail,
	InvalidPhone,
	InvalidOption,
	InvalidAttachment,
	NotAnImage,
	InvalidFileType,
	InvalidImageType,
	FileTooLarge,
	InvalidColor,
	/// Code supplied by a caller-appended validator
	Custom(String),
}

impl ErrorCode {
	/// Stable string form of the code
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::ErrorCode;
	///
	/// assert_eq!(ErrorCode::EndBeforeStart.as_str(), "end_before_start");
	/// assert_eq!(ErrorCode::Custom("taken".to_string()).as_str(), "taken");
	/// ```
	pub fn as_str(&self) -> &str {
		match self {
			Self::Required => "required",
			Self::MinLength => "min_length",
			Self::MaxLength => "max_length",
			Self::Pattern => "pattern",
			Self::ValidationCallbackFailed => "validation_callback_failed",
			Self::NotNumeric => "not_numeric",
			Self::MinValue => "min_value",
			Self::MaxValue => "max_value",
			Self::InvalidDate => "invalid_date",
			Self::InvalidTime => "invalid_time",
			Self::InvalidDatetime => "invalid_datetime",
			Self::DateTooEarly => "date_too_early",
			Self::DateTooLate => "date_too_late",
			Self::TimeTooEarly => "time_too_early",
			Self::TimeTooLate => "time_too_late",
			Self::DatetimeTooEarly => "datetime_too_early",
			Self::DatetimeTooLate => "datetime_too_late",
			Self::EndBeforeStart => "end_before_start",
			Self::StartTooEarly => "start_too_early",
			Self::StartTooLate => "start_too_late",
			Self::EndTooEarly => "end_too_early",
			Self::EndTooLate => "end_too_late",
			Self::InvalidStartDate => "invalid_start_date",
			Self::InvalidEndDate => "invalid_end_date",
			Self::InvalidUrl => "invalid_url",
			Self::InvalidEmail => "invalid_email",
			Self::InvalidPhone => "invalid_phone",
			Self::InvalidOption => "invalid_option",
			Self::InvalidAttachment => "invalid_attachment",
			Self::NotAnImage => "not_an_image",
			Self::InvalidFileType => "invalid_file_type",
			Self::InvalidImageType => "invalid_image_type",
			Self::FileTooLarge => "file_too_large",
			Self::InvalidColor => "invalid_color",
			Self::Custom(code) => code,
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for ErrorCode {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
	pub code: ErrorCode,
	pub message: String,
}

impl ValidationError {
	pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	/// Presence failure with the stock message
	pub fn required() -> Self {
		Self::new(ErrorCode::Required, "This field is required.")
	}

	/// Failure reported by a caller-appended validator
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::{ErrorCode, ValidationError};
	///
	/// let err = ValidationError::custom("slug_taken", "This slug is already in use.");
	/// assert_eq!(err.code, ErrorCode::Custom("slug_taken".to_string()));
	/// assert_eq!(err.to_string(), "This slug is already in use.");
	/// ```
	pub fn custom(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(ErrorCode::Custom(code.into()), message)
	}

	pub fn code(&self) -> &str {
		self.code.as_str()
	}
}

pub type FieldResult<T> = Result<T, ValidationError>;

/// Crate-level error for operations that go beyond a single value check
#[derive(Debug, thiserror::Error)]
pub enum FieldsError {
	#[error("Unknown field type: {0}")]
	UnknownFieldType(String),
	#[error("Validation error: {0}")]
	Validation(#[from] ValidationError),
	#[error("Settings error: {0}")]
	Settings(#[from] SettingsError),
}

pub type FieldsResult<T> = Result<T, FieldsError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ErrorCode::Required, "required")]
	#[case(ErrorCode::ValidationCallbackFailed, "validation_callback_failed")]
	#[case(ErrorCode::DatetimeTooLate, "datetime_too_late")]
	#[case(ErrorCode::NotAnImage, "not_an_image")]
	#[case(ErrorCode::InvalidImageType, "invalid_image_type")]
	fn test_error_code_strings(#[case] code: ErrorCode, #[case] expected: &str) {
		// Act & Assert
		assert_eq!(code.as_str(), expected);
		assert_eq!(code.to_string(), expected);
	}

	#[rstest]
	fn test_validation_error_serializes_code_as_string() {
		// Arrange
		let err = ValidationError::new(ErrorCode::InvalidPhone, "Enter a valid phone number.");

		// Act
		let json = serde_json::to_value(&err).unwrap();

		// Assert
		assert_eq!(
			json,
			serde_json::json!({"code": "invalid_phone", "message": "Enter a valid phone number."})
		);
	}

	#[rstest]
	fn test_fields_error_wraps_validation_error() {
		// Arrange
		let err: FieldsError = ValidationError::required().into();

		// Act & Assert
		assert!(matches!(err, FieldsError::Validation(ref v) if v.code == ErrorCode::Required));
		assert_eq!(err.to_string(), "Validation error: This field is required.");
	}
}
