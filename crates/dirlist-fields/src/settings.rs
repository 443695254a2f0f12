//! Field system settings
//!
//! Settings can be loaded from environment variables, configuration files, or
//! built in code. Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings consumed by the default field types and collaborators
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
	/// Prefix for element ids (`<ns>-field-<name>`) and form names (`<ns>_field_<name>`)
	pub namespace: String,

	/// strftime pattern for Date and DateRange display
	pub date_format: String,

	pub time_format: String,

	pub datetime_format: String,

	/// Joins the two sides of a date range on display
	pub range_separator: String,

	/// Decimal places used when a decimal field sets no precision
	pub decimal_precision: u32,

	/// The site's own URL; links to other hosts are treated as external
	pub home_url: String,

	pub thousands_separator: String,

	pub decimal_point: String,
}

impl Default for FieldSettings {
	fn default() -> Self {
		Self {
			namespace: "dirlist".to_string(),
			date_format: "%B %-d, %Y".to_string(),
			time_format: "%-I:%M %P".to_string(),
			datetime_format: "%B %-d, %Y %-I:%M %P".to_string(),
			range_separator: " - ".to_string(),
			decimal_precision: 2,
			home_url: "http://localhost".to_string(),
			thousands_separator: ",".to_string(),
			decimal_point: ".".to_string(),
		}
	}
}

impl FieldSettings {
	/// Upper limit for `decimal_precision`
	pub const MAX_PRECISION: u32 = 10;

	/// Create new settings with defaults
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = namespace.into();
		self
	}

	pub fn with_home_url(mut self, home_url: impl Into<String>) -> Self {
		self.home_url = home_url.into();
		self
	}

	pub fn with_decimal_precision(mut self, precision: u32) -> Self {
		self.decimal_precision = precision;
		self
	}

	/// Validate settings
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldSettings;
	///
	/// assert!(FieldSettings::default().validate().is_ok());
	/// assert!(FieldSettings::default().with_namespace("My NS").validate().is_err());
	/// assert!(FieldSettings::default().with_home_url("/relative").validate().is_err());
	/// ```
	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.namespace.is_empty()
			|| !self
				.namespace
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
		{
			return Err(SettingsError::ValidationError(format!(
				"namespace must be non-empty and contain only [a-z0-9_-], got {:?}",
				self.namespace
			)));
		}

		let home = url::Url::parse(&self.home_url).map_err(|e| {
			SettingsError::ValidationError(format!("home_url {:?} is not absolute: {}", self.home_url, e))
		})?;
		if home.host_str().is_none() {
			return Err(SettingsError::ValidationError(format!(
				"home_url {:?} has no host",
				self.home_url
			)));
		}

		if self.decimal_precision > Self::MAX_PRECISION {
			return Err(SettingsError::ValidationError(format!(
				"decimal_precision must be at most {}, got {}",
				Self::MAX_PRECISION,
				self.decimal_precision
			)));
		}

		Ok(())
	}

	/// Load settings from `DIRLIST_*` environment variables
	pub fn from_env() -> Result<Self, SettingsError> {
		Self::from_vars(|key| std::env::var(key).ok())
	}

	/// Load settings through an arbitrary variable lookup
	///
	/// # Examples
	///
	/// ```
	/// use dirlist_fields::FieldSettings;
	///
	/// let settings = FieldSettings::from_vars(|key| match key {
	///     "DIRLIST_NAMESPACE" => Some("acme".to_string()),
	///     "DIRLIST_DECIMAL_PRECISION" => Some("3".to_string()),
	///     _ => None,
	/// })
	/// .unwrap();
	/// assert_eq!(settings.namespace, "acme");
	/// assert_eq!(settings.decimal_precision, 3);
	/// assert_eq!(settings.range_separator, " - ");
	/// ```
	pub fn from_vars<F>(lookup: F) -> Result<Self, SettingsError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut settings = Self::default();

		if let Some(namespace) = lookup("DIRLIST_NAMESPACE") {
			settings.namespace = namespace.trim().to_string();
		}
		if let Some(format) = lookup("DIRLIST_DATE_FORMAT") {
			settings.date_format = format;
		}
		if let Some(format) = lookup("DIRLIST_TIME_FORMAT") {
			settings.time_format = format;
		}
		if let Some(format) = lookup("DIRLIST_DATETIME_FORMAT") {
			settings.datetime_format = format;
		}
		if let Some(separator) = lookup("DIRLIST_RANGE_SEPARATOR") {
			settings.range_separator = separator;
		}
		if let Some(precision) = lookup("DIRLIST_DECIMAL_PRECISION") {
			settings.decimal_precision = precision.trim().parse().map_err(|e| {
				SettingsError::ParseError(format!(
					"DIRLIST_DECIMAL_PRECISION {:?} is not a number: {}",
					precision, e
				))
			})?;
		}
		if let Some(home_url) = lookup("DIRLIST_HOME_URL") {
			settings.home_url = home_url.trim().to_string();
		}
		if let Some(separator) = lookup("DIRLIST_THOUSANDS_SEPARATOR") {
			settings.thousands_separator = separator;
		}
		if let Some(point) = lookup("DIRLIST_DECIMAL_POINT") {
			settings.decimal_point = point;
		}

		Ok(settings)
	}

	/// Load settings from a `.toml` or `.json` file
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
		})?;

		let settings: FieldSettings = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => toml::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))?,
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("JSON parse error: {}", e)))?,
			_ => {
				return Err(SettingsError::UnsupportedFormat(
					"Supported formats: .toml, .json".to_string(),
				));
			}
		};

		tracing::debug!(path = %path.display(), namespace = %settings.namespace, "loaded field settings");
		Ok(settings)
	}
}

/// Settings error type
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("File error: {0}")]
	FileError(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Write;

	#[rstest]
	fn test_defaults() {
		// Arrange & Act
		let settings = FieldSettings::default();

		// Assert
		assert_eq!(settings.namespace, "dirlist");
		assert_eq!(settings.decimal_precision, 2);
		assert_eq!(settings.range_separator, " - ");
		assert!(settings.validate().is_ok());
	}

	#[rstest]
	fn test_from_file_toml_partial() {
		// Arrange
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(file, "namespace = \"acme\"\nrange_separator = \" to \"").unwrap();

		// Act
		let settings = FieldSettings::from_file(file.path()).unwrap();

		// Assert
		assert_eq!(settings.namespace, "acme");
		assert_eq!(settings.range_separator, " to ");
		assert_eq!(settings.date_format, "%B %-d, %Y");
	}

	#[rstest]
	fn test_from_file_json() {
		// Arrange
		let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
		write!(file, r#"{{"decimal_precision": 4, "home_url": "https://dir.example.org"}}"#).unwrap();

		// Act
		let settings = FieldSettings::from_file(file.path()).unwrap();

		// Assert
		assert_eq!(settings.decimal_precision, 4);
		assert_eq!(settings.home_url, "https://dir.example.org");
	}

	#[rstest]
	fn test_from_file_rejects_unknown_extension() {
		// Arrange
		let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();

		// Act
		let result = FieldSettings::from_file(file.path());

		// Assert
		assert!(matches!(result, Err(SettingsError::UnsupportedFormat(_))));
	}

	#[rstest]
	fn test_from_file_reports_parse_errors() {
		// Arrange
		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(file, "namespace = ").unwrap();

		// Act
		let result = FieldSettings::from_file(file.path());

		// Assert
		assert!(matches!(result, Err(SettingsError::ParseError(_))));
	}

	#[rstest]
	fn test_from_file_missing() {
		// Act
		let result = FieldSettings::from_file("/nonexistent/dirlist.toml");

		// Assert
		assert!(matches!(result, Err(SettingsError::FileError(_))));
	}

	#[rstest]
	fn test_from_vars_rejects_bad_precision() {
		// Act
		let result = FieldSettings::from_vars(|key| {
			(key == "DIRLIST_DECIMAL_PRECISION").then(|| "two".to_string())
		});

		// Assert
		assert!(matches!(result, Err(SettingsError::ParseError(_))));
	}

	#[rstest]
	#[case(FieldSettings::default().with_namespace(""))]
	#[case(FieldSettings::default().with_namespace("has space"))]
	#[case(FieldSettings::default().with_home_url("not a url"))]
	#[case(FieldSettings::default().with_decimal_precision(11))]
	fn test_validate_rejects(#[case] settings: FieldSettings) {
		assert!(matches!(settings.validate(), Err(SettingsError::ValidationError(_))));
	}
}
