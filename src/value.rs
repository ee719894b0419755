//! Coerced environment values

use serde::Serialize;

/// A successfully coerced environment value.
///
/// All six descriptor kinds coerce into one of these four cases: `url` and
/// `enum` values stay as the raw string, `json` carries the deserialized
/// structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvValue {
    String(String),
    Number(f64),
    Bool(bool),
    Json(serde_json::Value),
}

impl EnvValue {
    /// Convert a schema-supplied default (plain JSON) into a typed value.
    ///
    /// Scalar defaults map onto the matching scalar case; arrays, objects
    /// and null stay as JSON structures (only `json`-typed descriptors
    /// declare such defaults in practice).
    pub fn from_default(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => EnvValue::String(s.clone()),
            serde_json::Value::Number(n) => {
                EnvValue::Number(n.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::Bool(b) => EnvValue::Bool(*b),
            other => EnvValue::Json(other.clone()),
        }
    }

    /// The string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EnvValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric content, if this is a number value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EnvValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean content, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EnvValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The JSON content, if this is a deserialized JSON value.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            EnvValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for EnvValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvValue::String(s) => write!(f, "{}", s),
            EnvValue::Number(n) => write!(f, "{}", n),
            EnvValue::Bool(b) => write!(f, "{}", b),
            EnvValue::Json(v) => write!(f, "{}", v),
        }
    }
}
