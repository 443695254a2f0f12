//! Parsing, normalizing and bounds checks shared by the date and time types

use crate::definition::FieldDefinition;
use crate::error::{ErrorCode, FieldResult, ValidationError};
use crate::markup::{AttrValue, Attributes, Markup};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("DATE_REGEX: invalid regex pattern")
});

static TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(\d{2}):(\d{2})(?::(\d{2}))?$").expect("TIME_REGEX: invalid regex pattern")
});

static DATETIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(\d{4}-\d{2}-\d{2})([T ])(\d{2}:\d{2}(?::\d{2})?)$")
		.expect("DATETIME_REGEX: invalid regex pattern")
});

/// `YYYY-MM-DD` that names a real calendar day
pub(crate) fn normalize_date(input: &str) -> Option<String> {
	let input = input.trim();
	if !DATE_REGEX.is_match(input) {
		return None;
	}
	NaiveDate::parse_from_str(input, "%Y-%m-%d")
		.ok()
		.map(|_| input.to_string())
}

/// `HH:MM` or `HH:MM:SS`, normalized to `HH:MM`
pub(crate) fn normalize_time(input: &str) -> Option<String> {
	let caps = TIME_REGEX.captures(input.trim())?;
	let hour: u32 = caps[1].parse().ok()?;
	let minute: u32 = caps[2].parse().ok()?;
	let second: u32 = match caps.get(3) {
		Some(s) => s.as_str().parse().ok()?,
		None => 0,
	};
	if hour > 23 || minute > 59 || second > 59 {
		return None;
	}
	Some(format!("{:02}:{:02}", hour, minute))
}

/// `YYYY-MM-DDTHH:MM[:SS]`, normalized to `YYYY-MM-DDTHH:MM`; `lenient`
/// also accepts a space between date and time
pub(crate) fn normalize_datetime(input: &str, lenient: bool) -> Option<String> {
	let caps = DATETIME_REGEX.captures(input.trim())?;
	if !lenient && &caps[2] != "T" {
		return None;
	}
	let date = normalize_date(&caps[1])?;
	let time = normalize_time(&caps[3])?;
	Some(format!("{}T{}", date, time))
}

pub(crate) fn date_timestamp(date: &str) -> Option<i64> {
	let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
	Some(date.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// Seconds of a time of day on the epoch date
pub(crate) fn time_timestamp(time: &str) -> Option<i64> {
	let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
	let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
	Some(epoch.and_time(time).and_utc().timestamp())
}

pub(crate) fn datetime_timestamp(datetime: &str) -> Option<i64> {
	NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M")
		.ok()
		.map(|dt| dt.and_utc().timestamp())
}

/// Error codes and wording for one bounded temporal value
pub(crate) struct BoundCodes {
	pub early: ErrorCode,
	pub late: ErrorCode,
	pub noun: &'static str,
}

/// Lexicographic `min`/`max` check on normalized strings; bounds inclusive
pub(crate) fn check_bounds(value: &str, field: &FieldDefinition, codes: BoundCodes) -> FieldResult<()> {
	if let Some(min) = field.min_str()
		&& value < min
	{
		return Err(ValidationError::new(
			codes.early,
			format!("The {} must be on or after {}.", codes.noun, min),
		));
	}
	if let Some(max) = field.max_str()
		&& value > max
	{
		return Err(ValidationError::new(
			codes.late,
			format!("The {} must be on or before {}.", codes.noun, max),
		));
	}
	Ok(())
}

/// Input with temporal `min`/`max`/`step` attributes mirrored from the
/// definition; custom attributes are merged last
pub(crate) fn temporal_input(markup: &Markup, input_type: &str, field: &FieldDefinition, value: &str) -> Attributes {
	let mut attrs = markup.input(input_type, field, value);
	attrs.remove("placeholder");
	attrs.set_opt("min", field.min_str());
	attrs.set_opt("max", field.max_str());
	attrs.set_opt("step", field.step.as_ref().and_then(AttrValue::from_json));
	markup.apply_custom(&mut attrs, field);
	attrs
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("2024-06-15", Some("2024-06-15"))]
	#[case(" 2024-02-29 ", Some("2024-02-29"))]
	#[case("2023-02-29", None)]
	#[case("2024-02-30", None)]
	#[case("2024-13-01", None)]
	#[case("2024-6-15", None)]
	#[case("15/06/2024", None)]
	#[case("", None)]
	fn test_normalize_date(#[case] input: &str, #[case] expected: Option<&str>) {
		assert_eq!(normalize_date(input).as_deref(), expected);
	}

	#[rstest]
	#[case("09:30", Some("09:30"))]
	#[case("23:59:59", Some("23:59"))]
	#[case("00:00", Some("00:00"))]
	#[case("24:00", None)]
	#[case("12:60", None)]
	#[case("12:30:60", None)]
	#[case("9:30", None)]
	fn test_normalize_time(#[case] input: &str, #[case] expected: Option<&str>) {
		assert_eq!(normalize_time(input).as_deref(), expected);
	}

	#[rstest]
	#[case("2024-06-15T14:30", false, Some("2024-06-15T14:30"))]
	#[case("2024-06-15T14:30:45", false, Some("2024-06-15T14:30"))]
	#[case("2024-06-15 14:30", false, None)]
	#[case("2024-06-15 14:30", true, Some("2024-06-15T14:30"))]
	#[case("2024-02-30T10:00", true, None)]
	#[case("2024-06-15T25:00", true, None)]
	fn test_normalize_datetime(#[case] input: &str, #[case] lenient: bool, #[case] expected: Option<&str>) {
		assert_eq!(normalize_datetime(input, lenient).as_deref(), expected);
	}

	#[rstest]
	fn test_timestamps() {
		assert_eq!(date_timestamp("1970-01-02"), Some(86_400));
		assert_eq!(time_timestamp("01:30"), Some(5_400));
		assert_eq!(datetime_timestamp("2024-06-15T14:30"), Some(1_718_461_800));
		assert_eq!(date_timestamp("nope"), None);
	}
}
