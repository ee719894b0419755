//! Schema validation over a raw environment mapping

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{EnvSchemaError, Result};
use crate::parser::parse_value;
use crate::schema::Schema;
use crate::value::EnvValue;

/// The unvalidated string-keyed source of truth (process environment or a
/// parsed dotfile). A `BTreeMap` so warning order is stable.
pub type RawEnv = BTreeMap<String, String>;

/// The coerced, validated output mapping. Optional keys with no supplied
/// value and no default are simply absent.
pub type TypedEnv = BTreeMap<String, EnvValue>;

/// Validation error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingRequired,
    TooShort,
    TooLong,
    PatternMismatch,
    InvalidNumber,
    NotInteger,
    BelowMinimum,
    AboveMaximum,
    InvalidBoolean,
    InvalidUrl,
    InvalidProtocol,
    InvalidJson,
    InvalidEnumValue,
    UnknownType,
}

/// One validation failure for one variable.
///
/// At most one error is produced per key; rules run in a fixed order and
/// the first failing rule wins.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Name of the failing variable
    pub variable: String,
    /// Error classification
    pub kind: ErrorKind,
    /// Human-readable failure description
    pub message: String,
    /// What a valid value would look like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// What was actually supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(variable: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            kind,
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    /// Set the expected description
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Set the received description
    pub fn with_received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }
}

/// Result of validating an environment against a schema
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// True iff no errors were collected; warnings never affect validity
    pub valid: bool,
    /// One error per failing schema key, in schema declaration order
    pub errors: Vec<ValidationError>,
    /// Non-fatal observations (keys present in the environment but not
    /// declared in the schema)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether the report carries any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validate a raw environment against a schema without coercing values.
///
/// Every schema key is evaluated; one key's failure never prevents
/// evaluation of the others. Keys present in the environment but missing
/// from the schema produce warnings, never errors.
pub fn validate_env(env: &RawEnv, schema: &Schema) -> ValidationReport {
    let mut errors = Vec::new();

    for (name, descriptor) in schema.iter() {
        let raw = env.get(name).map(String::as_str);
        let parsed = parse_value(raw, descriptor, name);
        if let Some(error) = parsed.error {
            debug!(variable = name, kind = ?error.kind, "validation failed");
            errors.push(error);
        }
    }

    let warnings: Vec<String> = env
        .keys()
        .filter(|key| !schema.contains(key))
        .map(|key| format!("Environment variable \"{}\" is not defined in schema", key))
        .collect();

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Coerce a raw environment into a typed mapping, failing on any error.
///
/// All schema keys are processed before failure is decided, so the error
/// message aggregates every failing key. No partial mapping is ever
/// returned.
pub fn parse_env(env: &RawEnv, schema: &Schema) -> Result<TypedEnv> {
    let mut typed = TypedEnv::new();
    let mut errors = Vec::new();

    for (name, descriptor) in schema.iter() {
        let raw = env.get(name).map(String::as_str);
        let parsed = parse_value(raw, descriptor, name);
        match parsed.error {
            Some(error) => errors.push(error),
            None => {
                if let Some(value) = parsed.value {
                    typed.insert(name.to_string(), value);
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(EnvSchemaError::ValidationFailed { errors });
    }
    Ok(typed)
}
