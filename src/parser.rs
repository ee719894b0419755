//! Per-field value parsing and constraint checking
//!
//! The parser is a pure function of (raw value, descriptor, name). It never
//! fails the whole call: each invocation produces a value, an error, or
//! both (constraint failures keep the offending value alongside the error
//! so callers can report what was actually supplied).

use url::Url;

use crate::schema::{Descriptor, TypeSpec};
use crate::validator::{ErrorKind, ValidationError};
use crate::value::EnvValue;

/// Outcome of parsing one variable.
///
/// `value` and `error` are independent: a constraint failure (e.g. a string
/// below `min_length`) carries both the raw value and the error. A missing
/// optional variable carries neither.
#[derive(Debug, Clone)]
pub struct ParsedValue {
    pub value: Option<EnvValue>,
    pub error: Option<ValidationError>,
}

impl ParsedValue {
    fn value(value: EnvValue) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    fn absent() -> Self {
        Self {
            value: None,
            error: None,
        }
    }

    fn error(error: ValidationError) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }

    fn value_with_error(value: EnvValue, error: ValidationError) -> Self {
        Self {
            value: Some(value),
            error: Some(error),
        }
    }

    /// Whether parsing produced no error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse and validate a single raw value against a descriptor.
///
/// Resolution order: absent/empty input first resolves against the default,
/// then the required flag; only a non-empty raw string reaches the
/// type-specific coercion. Within a type, checks run in a fixed order and
/// the first failing rule wins.
///
/// An explicit empty string is treated identically to an absent variable
/// for defaulting purposes, even for string fields with no `min_length`.
pub fn parse_value(raw: Option<&str>, descriptor: &Descriptor, name: &str) -> ParsedValue {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => {
            if let Some(default) = &descriptor.default {
                return ParsedValue::value(default.clone());
            }
            if descriptor.is_required() {
                return ParsedValue::error(
                    ValidationError::new(
                        name,
                        ErrorKind::MissingRequired,
                        "Required environment variable is missing",
                    )
                    .with_expected(format!("{} value", descriptor.spec.kind_name()))
                    .with_received("undefined"),
                );
            }
            return ParsedValue::absent();
        }
    };

    match &descriptor.spec {
        TypeSpec::String {
            min_length,
            max_length,
            pattern,
        } => parse_string(raw, *min_length, *max_length, pattern.as_ref(), name),
        TypeSpec::Number { min, max, integer } => {
            parse_number(raw, *min, *max, *integer, name)
        }
        TypeSpec::Boolean => parse_boolean(raw, name),
        TypeSpec::Url { protocols } => parse_url(raw, protocols.as_deref(), name),
        TypeSpec::Json => parse_json(raw, name),
        TypeSpec::Enum { values } => parse_enum(raw, values, name),
        TypeSpec::Unknown(tag) => ParsedValue::error(ValidationError::new(
            name,
            ErrorKind::UnknownType,
            format!("Unknown type: {}", tag),
        )),
    }
}

fn parse_string(
    raw: &str,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<&regex::Regex>,
    name: &str,
) -> ParsedValue {
    let value = EnvValue::String(raw.to_string());
    let length = raw.chars().count();

    if let Some(min) = min_length {
        if length < min {
            return ParsedValue::value_with_error(
                value,
                ValidationError::new(
                    name,
                    ErrorKind::TooShort,
                    format!("Value is too short (minimum {} characters)", min),
                )
                .with_expected(format!("at least {} characters", min))
                .with_received(format!("{} characters", length)),
            );
        }
    }

    if let Some(max) = max_length {
        if length > max {
            return ParsedValue::value_with_error(
                value,
                ValidationError::new(
                    name,
                    ErrorKind::TooLong,
                    format!("Value is too long (maximum {} characters)", max),
                )
                .with_expected(format!("at most {} characters", max))
                .with_received(format!("{} characters", length)),
            );
        }
    }

    if let Some(pattern) = pattern {
        if !pattern.is_match(raw) {
            return ParsedValue::value_with_error(
                value,
                ValidationError::new(
                    name,
                    ErrorKind::PatternMismatch,
                    "Value does not match the required pattern",
                )
                .with_expected(format!("match for /{}/", pattern.as_str()))
                .with_received(raw),
            );
        }
    }

    ParsedValue::value(value)
}

fn parse_number(
    raw: &str,
    min: Option<f64>,
    max: Option<f64>,
    integer: bool,
    name: &str,
) -> ParsedValue {
    let parsed = match raw.trim().parse::<f64>() {
        Ok(n) if !n.is_nan() => n,
        _ => {
            return ParsedValue::error(
                ValidationError::new(name, ErrorKind::InvalidNumber, "Invalid number format")
                    .with_expected("number")
                    .with_received(raw),
            );
        }
    };
    let value = EnvValue::Number(parsed);

    if integer && parsed.fract() != 0.0 {
        return ParsedValue::value_with_error(
            value,
            ValidationError::new(name, ErrorKind::NotInteger, "Value must be an integer")
                .with_expected("integer")
                .with_received(raw),
        );
    }

    if let Some(min) = min {
        if parsed < min {
            return ParsedValue::value_with_error(
                value,
                ValidationError::new(
                    name,
                    ErrorKind::BelowMinimum,
                    format!("Value is below the minimum of {}", min),
                )
                .with_expected(format!("number >= {}", min))
                .with_received(raw),
            );
        }
    }

    if let Some(max) = max {
        if parsed > max {
            return ParsedValue::value_with_error(
                value,
                ValidationError::new(
                    name,
                    ErrorKind::AboveMaximum,
                    format!("Value is above the maximum of {}", max),
                )
                .with_expected(format!("number <= {}", max))
                .with_received(raw),
            );
        }
    }

    ParsedValue::value(value)
}

fn parse_boolean(raw: &str, name: &str) -> ParsedValue {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => ParsedValue::value(EnvValue::Bool(true)),
        "false" | "0" | "no" => ParsedValue::value(EnvValue::Bool(false)),
        _ => ParsedValue::value_with_error(
            EnvValue::Bool(false),
            ValidationError::new(name, ErrorKind::InvalidBoolean, "Invalid boolean value")
                .with_expected("true, false, 1, 0, yes, or no")
                .with_received(raw),
        ),
    }
}

fn parse_url(raw: &str, protocols: Option<&[String]>, name: &str) -> ParsedValue {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => {
            return ParsedValue::error(
                ValidationError::new(name, ErrorKind::InvalidUrl, "Invalid URL format")
                    .with_expected("valid URL")
                    .with_received(raw),
            );
        }
    };

    if let Some(protocols) = protocols {
        // Url::scheme() is already lower-cased and carries no trailing colon;
        // allow-list entries are normalized the same way before comparison.
        let scheme = parsed.scheme();
        let allowed = protocols
            .iter()
            .any(|p| p.trim_end_matches(':').eq_ignore_ascii_case(scheme));
        if !allowed {
            return ParsedValue::value_with_error(
                EnvValue::String(raw.to_string()),
                ValidationError::new(name, ErrorKind::InvalidProtocol, "Invalid URL protocol")
                    .with_expected(protocols.join(", "))
                    .with_received(scheme),
            );
        }
    }

    // Callers see exactly what was supplied, only validated
    ParsedValue::value(EnvValue::String(raw.to_string()))
}

fn parse_json(raw: &str, name: &str) -> ParsedValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => ParsedValue::value(EnvValue::Json(value)),
        Err(_) => ParsedValue::error(
            ValidationError::new(name, ErrorKind::InvalidJson, "Invalid JSON format")
                .with_expected("valid JSON")
                .with_received(raw),
        ),
    }
}

fn parse_enum(raw: &str, values: &[String], name: &str) -> ParsedValue {
    if values.iter().any(|v| v == raw) {
        return ParsedValue::value(EnvValue::String(raw.to_string()));
    }
    let allowed = values.join(", ");
    ParsedValue::value_with_error(
        EnvValue::String(raw.to_string()),
        ValidationError::new(
            name,
            ErrorKind::InvalidEnumValue,
            format!("Value must be one of: {}", allowed),
        )
        .with_expected(allowed)
        .with_received(raw),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Descriptor;
    use serde_json::json;

    #[test]
    fn test_default_wins_over_required() {
        let descriptor = Descriptor::number().required().with_default(3000);
        let result = parse_value(None, &descriptor, "PORT");
        assert!(result.is_ok());
        assert_eq!(result.value, Some(EnvValue::Number(3000.0)));
    }

    #[test]
    fn test_empty_string_uses_default() {
        let descriptor = Descriptor::string().with_default("fallback");
        let result = parse_value(Some(""), &descriptor, "NAME");
        assert_eq!(result.value, Some(EnvValue::String("fallback".into())));
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_required_by_default() {
        let descriptor = Descriptor::url();
        let result = parse_value(None, &descriptor, "DATABASE_URL");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::MissingRequired);
        assert_eq!(error.message, "Required environment variable is missing");
        assert_eq!(error.expected.as_deref(), Some("url value"));
        assert_eq!(error.received.as_deref(), Some("undefined"));
    }

    #[test]
    fn test_explicitly_optional_absent() {
        let descriptor = Descriptor::string().optional();
        let result = parse_value(None, &descriptor, "OPT");
        assert!(result.is_ok());
        assert_eq!(result.value, None);
    }

    #[test]
    fn test_empty_string_is_absent_even_without_min_length() {
        // Deliberate policy: "" defers to default/required handling rather
        // than counting as a valid empty string value.
        let descriptor = Descriptor::string();
        let result = parse_value(Some(""), &descriptor, "NAME");
        assert_eq!(result.error.unwrap().kind, ErrorKind::MissingRequired);
    }

    #[test]
    fn test_string_passes_unchanged() {
        let descriptor = Descriptor::string();
        let result = parse_value(Some("hello world"), &descriptor, "GREETING");
        assert_eq!(result.value, Some(EnvValue::String("hello world".into())));
    }

    #[test]
    fn test_string_too_short_keeps_value() {
        let descriptor = Descriptor::new(TypeSpec::String {
            min_length: Some(20),
            max_length: None,
            pattern: None,
        });
        let result = parse_value(Some("short"), &descriptor, "API_KEY");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::TooShort);
        assert!(error.message.contains("too short"));
        assert_eq!(result.value, Some(EnvValue::String("short".into())));
    }

    #[test]
    fn test_string_too_long() {
        let descriptor = Descriptor::new(TypeSpec::String {
            min_length: None,
            max_length: Some(3),
            pattern: None,
        });
        let result = parse_value(Some("abcd"), &descriptor, "CODE");
        assert!(result.error.unwrap().message.contains("too long"));
    }

    #[test]
    fn test_string_pattern_mismatch() {
        let descriptor = Descriptor::new(TypeSpec::String {
            min_length: None,
            max_length: None,
            pattern: Some(regex::Regex::new(r"^[a-z]+$").unwrap()),
        });
        let result = parse_value(Some("ABC123"), &descriptor, "SLUG");
        assert_eq!(result.error.unwrap().kind, ErrorKind::PatternMismatch);

        let result = parse_value(Some("abc"), &descriptor, "SLUG");
        assert!(result.is_ok());
    }

    #[test]
    fn test_min_length_is_checked_before_pattern() {
        let descriptor = Descriptor::new(TypeSpec::String {
            min_length: Some(5),
            max_length: None,
            pattern: Some(regex::Regex::new(r"^[a-z]+$").unwrap()),
        });
        // Fails both rules; the length check wins.
        let result = parse_value(Some("A1"), &descriptor, "SLUG");
        assert_eq!(result.error.unwrap().kind, ErrorKind::TooShort);
    }

    #[test]
    fn test_number_parses() {
        let descriptor = Descriptor::number();
        let result = parse_value(Some("8080"), &descriptor, "PORT");
        assert_eq!(result.value, Some(EnvValue::Number(8080.0)));

        let result = parse_value(Some("-2.5"), &descriptor, "OFFSET");
        assert_eq!(result.value, Some(EnvValue::Number(-2.5)));
    }

    #[test]
    fn test_invalid_number_format() {
        let descriptor = Descriptor::number();
        let result = parse_value(Some("not-a-number"), &descriptor, "PORT");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::InvalidNumber);
        assert_eq!(error.message, "Invalid number format");
        assert_eq!(error.received.as_deref(), Some("not-a-number"));
    }

    #[test]
    fn test_integer_flag() {
        let descriptor = Descriptor::new(TypeSpec::Number {
            min: None,
            max: None,
            integer: true,
        });
        let result = parse_value(Some("3.5"), &descriptor, "WORKERS");
        assert_eq!(result.error.unwrap().kind, ErrorKind::NotInteger);

        let result = parse_value(Some("4"), &descriptor, "WORKERS");
        assert!(result.is_ok());
    }

    #[test]
    fn test_numeric_bounds_are_inclusive() {
        let descriptor = Descriptor::new(TypeSpec::Number {
            min: Some(1.0),
            max: Some(100.0),
            integer: false,
        });
        assert!(parse_value(Some("1"), &descriptor, "N").is_ok());
        assert!(parse_value(Some("100"), &descriptor, "N").is_ok());
        assert_eq!(
            parse_value(Some("0"), &descriptor, "N").error.unwrap().kind,
            ErrorKind::BelowMinimum
        );
        assert_eq!(
            parse_value(Some("101"), &descriptor, "N").error.unwrap().kind,
            ErrorKind::AboveMaximum
        );
    }

    #[test]
    fn test_integer_check_runs_before_bounds() {
        let descriptor = Descriptor::new(TypeSpec::Number {
            min: Some(10.0),
            max: None,
            integer: true,
        });
        let result = parse_value(Some("2.5"), &descriptor, "N");
        assert_eq!(result.error.unwrap().kind, ErrorKind::NotInteger);
    }

    #[test]
    fn test_boolean_truthy_and_falsy_groups() {
        let descriptor = Descriptor::boolean();
        for raw in ["true", "TRUE", " 1 ", "yes", "Yes"] {
            let result = parse_value(Some(raw), &descriptor, "FLAG");
            assert_eq!(result.value, Some(EnvValue::Bool(true)), "raw: {:?}", raw);
        }
        for raw in ["false", "0", "no", "NO"] {
            let result = parse_value(Some(raw), &descriptor, "FLAG");
            assert_eq!(result.value, Some(EnvValue::Bool(false)), "raw: {:?}", raw);
        }
    }

    #[test]
    fn test_invalid_boolean_defaults_to_false() {
        let descriptor = Descriptor::boolean();
        let result = parse_value(Some("maybe"), &descriptor, "FLAG");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::InvalidBoolean);
        assert_eq!(error.expected.as_deref(), Some("true, false, 1, 0, yes, or no"));
        assert_eq!(result.value, Some(EnvValue::Bool(false)));
    }

    #[test]
    fn test_url_returned_unchanged() {
        let descriptor = Descriptor::url();
        let raw = "HTTPS://Example.com/Path?q=1";
        let result = parse_value(Some(raw), &descriptor, "ENDPOINT");
        // Not normalized: callers see exactly what was supplied.
        assert_eq!(result.value, Some(EnvValue::String(raw.into())));
    }

    #[test]
    fn test_invalid_url() {
        let descriptor = Descriptor::url();
        let result = parse_value(Some("not a url"), &descriptor, "ENDPOINT");
        assert_eq!(result.error.unwrap().kind, ErrorKind::InvalidUrl);
    }

    #[test]
    fn test_relative_url_rejected() {
        let descriptor = Descriptor::url();
        let result = parse_value(Some("/just/a/path"), &descriptor, "ENDPOINT");
        assert_eq!(result.error.unwrap().kind, ErrorKind::InvalidUrl);
    }

    #[test]
    fn test_url_protocol_allow_list() {
        let descriptor = Descriptor::new(TypeSpec::Url {
            protocols: Some(vec!["postgres".into(), "postgresql".into()]),
        });
        let result = parse_value(Some("postgres://db:5432/app"), &descriptor, "DATABASE_URL");
        assert!(result.is_ok());

        let result = parse_value(Some("mysql://db:3306/app"), &descriptor, "DATABASE_URL");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::InvalidProtocol);
        assert_eq!(error.expected.as_deref(), Some("postgres, postgresql"));
        assert_eq!(error.received.as_deref(), Some("mysql"));
    }

    #[test]
    fn test_url_protocol_trailing_colon_ignored() {
        let descriptor = Descriptor::new(TypeSpec::Url {
            protocols: Some(vec!["https:".into()]),
        });
        let result = parse_value(Some("https://example.com"), &descriptor, "ENDPOINT");
        assert!(result.is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let descriptor = Descriptor::json();
        let result = parse_value(Some(r#"{"a": [1, 2], "b": null}"#), &descriptor, "CONFIG");
        assert_eq!(
            result.value,
            Some(EnvValue::Json(json!({"a": [1, 2], "b": null})))
        );
    }

    #[test]
    fn test_json_scalar_values() {
        let descriptor = Descriptor::json();
        let result = parse_value(Some("42"), &descriptor, "CONFIG");
        assert_eq!(result.value, Some(EnvValue::Json(json!(42))));
    }

    #[test]
    fn test_invalid_json() {
        let descriptor = Descriptor::json();
        let result = parse_value(Some("{broken"), &descriptor, "CONFIG");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::InvalidJson);
        assert_eq!(error.message, "Invalid JSON format");
        assert!(result.value.is_none());
    }

    #[test]
    fn test_enum_is_case_sensitive() {
        let descriptor = Descriptor::enumeration(["development", "production"]);
        assert!(parse_value(Some("production"), &descriptor, "NODE_ENV").is_ok());

        let result = parse_value(Some("Production"), &descriptor, "NODE_ENV");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::InvalidEnumValue);
        assert!(error.message.contains("must be one of"));
        assert_eq!(result.value, Some(EnvValue::String("Production".into())));
    }

    #[test]
    fn test_unknown_type_tag() {
        let descriptor = Descriptor::new(TypeSpec::Unknown("uuid".into()));
        let result = parse_value(Some("anything"), &descriptor, "ID");
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::UnknownType);
        assert!(error.message.contains("uuid"));
    }

    #[test]
    fn test_idempotence() {
        let descriptor = Descriptor::new(TypeSpec::Number {
            min: Some(0.0),
            max: None,
            integer: true,
        });
        let first = parse_value(Some("17"), &descriptor, "N");
        let second = parse_value(Some("17"), &descriptor, "N");
        assert_eq!(first.value, second.value);
        assert_eq!(first.error.is_none(), second.error.is_none());
    }
}
