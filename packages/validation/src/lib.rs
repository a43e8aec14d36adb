#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Validators for untrusted, loosely-typed input.
//!
//! Every value received from the backend passes through these functions
//! before it becomes part of the domain model. Each `expect_*` function
//! takes an arbitrary [`serde_json::Value`] and either returns the typed
//! value or fails with a [`ValidationError`] describing the mismatch.
//!
//! A missing object field indexes to [`Value::Null`] in `serde_json`, so
//! "absent" and `null` are handled identically:
//!
//! ```
//! use pothole_map_validation::{expect_string, optional};
//!
//! let body = serde_json::json!({ "deviceName": "dashcam-7" });
//! assert_eq!(expect_string(&body["deviceName"]).unwrap(), "dashcam-7");
//! assert_eq!(optional(&body["photoUrl"], expect_string).unwrap(), None);
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use strum_macros::Display;

/// Canonical lowercase 8-4-4-4-12 UUID text.
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-([0-9a-f]{4}-){3}[0-9a-f]{12}$").expect("valid regex")
});

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ValidationErrorKind {
    /// Value was null/absent or of the wrong primitive type.
    TypeMismatch,
    /// Number had a fractional component where an integer was required.
    NotInteger,
    /// Value was not an array.
    NotArray,
    /// Value had the right type but not the required textual shape.
    InvalidFormat,
}

/// A value failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    /// What kind of mismatch occurred.
    pub kind: ValidationErrorKind,
    /// Human-readable description, prefixed with the field path when known.
    pub message: String,
}

impl ValidationError {
    /// Creates a new error of the given kind.
    #[must_use]
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Prefixes the message with the field (or index) the value came from.
    ///
    /// Nested calls build a path, outermost segment first.
    #[must_use]
    pub fn at(mut self, field: impl std::fmt::Display) -> Self {
        self.message = format!("{field}: {}", self.message);
        self
    }

    fn type_mismatch(expected: &str, value: &Value) -> Self {
        Self::new(
            ValidationErrorKind::TypeMismatch,
            format!("expected {expected}, received {}", describe(value)),
        )
    }
}

/// Short JSON type name for error messages.
const fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Requires a boolean.
///
/// # Errors
///
/// * [`ValidationErrorKind::TypeMismatch`] if the value is null/absent or
///   not a boolean.
pub fn expect_boolean(value: &Value) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::type_mismatch("boolean", value))
}

/// Requires a number.
///
/// # Errors
///
/// * [`ValidationErrorKind::TypeMismatch`] if the value is null/absent or
///   not a number.
pub fn expect_number(value: &Value) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .ok_or_else(|| ValidationError::type_mismatch("number", value))
}

/// Requires a number without a fractional component.
///
/// Integral floating-point values such as `3.0` are accepted.
///
/// # Errors
///
/// * [`ValidationErrorKind::TypeMismatch`] if the value is not a number.
/// * [`ValidationErrorKind::NotInteger`] if it has a fractional component.
/// * [`ValidationErrorKind::InvalidFormat`] if it is integral but does not
///   fit in an `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn expect_integer(value: &Value) -> Result<i64, ValidationError> {
    if let Some(i) = value.as_i64() {
        return Ok(i);
    }

    let n = expect_number(value)?;
    if n.fract() != 0.0 || !n.is_finite() {
        return Err(ValidationError::new(
            ValidationErrorKind::NotInteger,
            format!("{n} is not an integer"),
        ));
    }
    if n < i64::MIN as f64 || n >= i64::MAX as f64 {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidFormat,
            format!("{n} is out of integer range"),
        ));
    }

    Ok(n as i64)
}

/// Requires a string.
///
/// # Errors
///
/// * [`ValidationErrorKind::TypeMismatch`] if the value is null/absent or
///   not a string.
pub fn expect_string(value: &Value) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| ValidationError::type_mismatch("string", value))
}

/// Requires an array and returns its elements.
///
/// # Errors
///
/// * [`ValidationErrorKind::NotArray`] if the value is not an array.
pub fn expect_array(value: &Value) -> Result<&[Value], ValidationError> {
    value.as_array().map(Vec::as_slice).ok_or_else(|| {
        ValidationError::new(
            ValidationErrorKind::NotArray,
            format!("expected array, received {}", describe(value)),
        )
    })
}

/// Requires a UUID in canonical lowercase textual form and returns it
/// unchanged.
///
/// # Errors
///
/// * [`ValidationErrorKind::TypeMismatch`] if the value is not a string.
/// * [`ValidationErrorKind::InvalidFormat`] if the string is not a
///   canonical UUID.
pub fn expect_uuid(value: &Value) -> Result<String, ValidationError> {
    let s = expect_string(value)?;
    if !UUID_RE.is_match(&s) {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidFormat,
            format!("expected UUID, received {s:?}"),
        ));
    }
    Ok(s)
}

/// Something [`expect_date`] can turn into a timestamp.
///
/// Implemented for already-constructed timestamps, which pass through
/// unchanged, and for JSON values, which must hold a date string.
pub trait DateInput {
    /// Converts the input into a UTC timestamp.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the input is not a date.
    fn to_date(&self) -> Result<DateTime<Utc>, ValidationError>;
}

impl DateInput for DateTime<Utc> {
    fn to_date(&self) -> Result<DateTime<Utc>, ValidationError> {
        Ok(*self)
    }
}

impl DateInput for Value {
    fn to_date(&self) -> Result<DateTime<Utc>, ValidationError> {
        match self {
            Self::String(s) => parse_date(s).ok_or_else(|| {
                ValidationError::new(
                    ValidationErrorKind::InvalidFormat,
                    format!("expected ISO-8601 date, received {s:?}"),
                )
            }),
            other => Err(ValidationError::type_mismatch("date", other)),
        }
    }
}

/// Requires a date: either an existing timestamp or an ISO-8601 string.
///
/// # Errors
///
/// * [`ValidationErrorKind::TypeMismatch`] if the value is neither a
///   timestamp nor a string.
/// * [`ValidationErrorKind::InvalidFormat`] if the string cannot be parsed.
pub fn expect_date<T: DateInput + ?Sized>(value: &T) -> Result<DateTime<Utc>, ValidationError> {
    value.to_date()
}

/// Runs `validator` unless the value is null/absent.
///
/// # Errors
///
/// Propagates whatever error `validator` returns.
pub fn optional<'a, T, F>(value: &'a Value, validator: F) -> Result<Option<T>, ValidationError>
where
    F: FnOnce(&'a Value) -> Result<T, ValidationError>,
{
    if value.is_null() {
        return Ok(None);
    }
    validator(value).map(Some)
}

/// Parses the date shapes the backend has been seen to emit: RFC 3339 with
/// an offset, naive ISO-8601 (assumed UTC), and bare dates.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;

    #[test]
    fn primitives_accept_matching_types() {
        assert!(expect_boolean(&json!(true)).unwrap());
        assert!((expect_number(&json!(0.75)).unwrap() - 0.75).abs() < f64::EPSILON);
        assert_eq!(expect_string(&json!("abc")).unwrap(), "abc");
    }

    #[test]
    fn primitives_reject_null_and_wrong_types() {
        for (result, label) in [
            (expect_boolean(&Value::Null).map(|_| ()), "boolean/null"),
            (expect_boolean(&json!("true")).map(|_| ()), "boolean/string"),
            (expect_number(&json!("1.5")).map(|_| ()), "number/string"),
            (expect_number(&Value::Null).map(|_| ()), "number/null"),
            (expect_string(&json!(12)).map(|_| ()), "string/number"),
            (expect_string(&json!({})).map(|_| ()), "string/object"),
        ] {
            let err = result.expect_err(label);
            assert_eq!(err.kind, ValidationErrorKind::TypeMismatch, "{label}");
        }
    }

    #[test]
    fn missing_field_is_null() {
        let body = json!({ "present": 1 });
        let err = expect_number(&body["absent"]).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::TypeMismatch);
        assert!(err.message.contains("null"));
    }

    #[test]
    fn integers_pass_through_unchanged() {
        for n in [-42_i64, 0, 7, 1_000_000_007] {
            assert_eq!(expect_integer(&json!(n)).unwrap(), n);
        }
        assert_eq!(expect_integer(&json!(3.0)).unwrap(), 3);
    }

    #[test]
    fn fractional_numbers_are_not_integers() {
        for n in [0.5, -1.25, 12.000_001] {
            let err = expect_integer(&json!(n)).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::NotInteger, "{n}");
        }
        assert_eq!(
            expect_integer(&json!("3")).unwrap_err().kind,
            ValidationErrorKind::TypeMismatch
        );
    }

    #[test]
    fn huge_integral_float_is_out_of_range() {
        let err = expect_integer(&json!(1e30)).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidFormat);
    }

    #[test]
    fn arrays() {
        assert_eq!(expect_array(&json!([1, 2])).unwrap().len(), 2);
        assert_eq!(
            expect_array(&json!(1.5)).unwrap_err().kind,
            ValidationErrorKind::NotArray
        );
        assert_eq!(
            expect_array(&Value::Null).unwrap_err().kind,
            ValidationErrorKind::NotArray
        );
    }

    #[test]
    fn random_uuids_round_trip_unchanged() {
        for _ in 0..64 {
            let u = uuid::Uuid::new_v4().to_string();
            assert_eq!(expect_uuid(&json!(u)).unwrap(), u);
        }
    }

    #[test]
    fn non_canonical_uuids_are_invalid_format() {
        for bad in [
            "",
            "not-a-uuid",
            "9B2F1C3E-1A2B-4C3D-8E9F-0A1B2C3D4E5F",
            "9b2f1c3e1a2b4c3d8e9f0a1b2c3d4e5f",
            "{9b2f1c3e-1a2b-4c3d-8e9f-0a1b2c3d4e5f}",
            "9b2f1c3e-1a2b-4c3d-8e9f-0a1b2c3d4e5",
            "9b2f1c3e-1a2b-4c3d-8e9f-0a1b2c3d4e5fa",
            "9b2f1c3e-1a2b-4c3d-8e9f-0a1b2c3d4e5g",
        ] {
            let err = expect_uuid(&json!(bad)).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidFormat, "{bad:?}");
        }
        assert_eq!(
            expect_uuid(&json!(42)).unwrap_err().kind,
            ValidationErrorKind::TypeMismatch
        );
    }

    #[test]
    fn dates_from_strings() {
        let expected = DateTime::parse_from_rfc3339("2020-07-04T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        for s in [
            "2020-07-04T10:00:00Z",
            "2020-07-04T18:00:00+08:00",
            "2020-07-04T10:00:00",
            "2020-07-04T10:00:00.000",
            "2020-07-04 10:00:00",
        ] {
            assert_eq!(expect_date(&json!(s)).unwrap(), expected, "{s}");
        }
        assert_eq!(
            expect_date(&json!("2020-07-04")).unwrap().to_rfc3339(),
            "2020-07-04T00:00:00+00:00"
        );
    }

    #[test]
    fn existing_dates_pass_through() {
        let now = Utc::now();
        assert_eq!(expect_date(&now).unwrap(), now);
    }

    #[test]
    fn bad_dates() {
        assert_eq!(
            expect_date(&json!(1_593_856_800)).unwrap_err().kind,
            ValidationErrorKind::TypeMismatch
        );
        assert_eq!(
            expect_date(&json!("yesterday")).unwrap_err().kind,
            ValidationErrorKind::InvalidFormat
        );
    }

    #[test]
    fn optional_skips_validator_for_null() {
        let calls = Cell::new(0);
        let validator = |v: &Value| {
            calls.set(calls.get() + 1);
            expect_string(v)
        };

        assert_eq!(optional(&Value::Null, validator).unwrap(), None);
        let body = json!({});
        assert_eq!(optional(&body["photoUrl"], validator).unwrap(), None);
        assert_eq!(calls.get(), 0);

        assert_eq!(
            optional(&json!("https://example.com/p.jpg"), validator).unwrap(),
            Some("https://example.com/p.jpg".to_string())
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn optional_propagates_validator_failure() {
        let err = optional(&json!(5), expect_string).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::TypeMismatch);
    }

    #[test]
    fn at_prefixes_path_and_keeps_kind() {
        let err = expect_number(&json!("x")).unwrap_err().at(1).at("coordinates");
        assert_eq!(err.kind, ValidationErrorKind::TypeMismatch);
        assert!(err.message.starts_with("coordinates: 1: expected number"));
        assert!(err.to_string().starts_with("TypeMismatch: coordinates"));
    }
}
