//! Schema types: descriptors and the ordered variable schema

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{EnvSchemaError, Result};
use crate::value::EnvValue;

/// Type-specific part of a descriptor.
///
/// One case per supported type; each carries its own constraint fields.
/// `Unknown` holds an unrecognized type tag so that schemas loaded from
/// external files fail per-key at validation time rather than at load time.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// Plain string with optional length and pattern constraints
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Regex>,
    },
    /// Number with optional inclusive bounds and integer requirement
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    /// Boolean (true/false, 1/0, yes/no)
    Boolean,
    /// Absolute URL with an optional scheme allow-list
    Url { protocols: Option<Vec<String>> },
    /// Arbitrary JSON document
    Json,
    /// Closed set of allowed string literals (case-sensitive)
    Enum { values: Vec<String> },
    /// Unrecognized type tag from an externally loaded schema
    Unknown(String),
}

impl TypeSpec {
    /// Get the type tag for this spec (as written in schema files)
    pub fn kind_name(&self) -> &str {
        match self {
            TypeSpec::String { .. } => "string",
            TypeSpec::Number { .. } => "number",
            TypeSpec::Boolean => "boolean",
            TypeSpec::Url { .. } => "url",
            TypeSpec::Json => "json",
            TypeSpec::Enum { .. } => "enum",
            TypeSpec::Unknown(tag) => tag,
        }
    }
}

/// A single variable's type-and-constraint declaration
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Type-specific coercion rules and constraints
    pub spec: TypeSpec,
    /// Tri-state required flag: absent or `true` means required,
    /// `false` means optional
    pub required: Option<bool>,
    /// Typed value used when the raw input is absent or empty
    pub default: Option<EnvValue>,
    /// Documentation only, no behavioral effect
    pub description: Option<String>,
}

impl Descriptor {
    /// Create a descriptor from a type spec
    pub fn new(spec: TypeSpec) -> Self {
        Self {
            spec,
            required: None,
            default: None,
            description: None,
        }
    }

    /// Unconstrained string descriptor
    pub fn string() -> Self {
        Self::new(TypeSpec::String {
            min_length: None,
            max_length: None,
            pattern: None,
        })
    }

    /// Unconstrained number descriptor
    pub fn number() -> Self {
        Self::new(TypeSpec::Number {
            min: None,
            max: None,
            integer: false,
        })
    }

    /// Boolean descriptor
    pub fn boolean() -> Self {
        Self::new(TypeSpec::Boolean)
    }

    /// URL descriptor with no scheme restriction
    pub fn url() -> Self {
        Self::new(TypeSpec::Url { protocols: None })
    }

    /// JSON descriptor
    pub fn json() -> Self {
        Self::new(TypeSpec::Json)
    }

    /// Enum descriptor over the given allowed literals
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(TypeSpec::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Mark this variable as explicitly optional
    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    /// Mark this variable as explicitly required
    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    /// Set the default value (used when input is absent or empty)
    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(EnvValue::from_default(&value.into()));
        self
    }

    /// Set the documentation string
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether absent input is an error for this descriptor.
    ///
    /// Required-by-default: only an explicit `required: false` opts out.
    pub fn is_required(&self) -> bool {
        self.required != Some(false)
    }
}

/// Raw descriptor shape as written in JSON schema files.
///
/// Field names follow the file format (camelCase); conversion into
/// [`Descriptor`] compiles patterns and checks per-type requirements.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    #[serde(rename = "type")]
    kind: String,
    required: Option<bool>,
    default: Option<serde_json::Value>,
    description: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    integer: Option<bool>,
    protocols: Option<Vec<String>>,
    values: Option<Vec<String>>,
}

impl RawDescriptor {
    fn into_descriptor(self, name: &str) -> Result<Descriptor> {
        let spec = match self.kind.as_str() {
            "string" => {
                let pattern = match self.pattern {
                    Some(p) => Some(Regex::new(&p).map_err(|source| {
                        EnvSchemaError::InvalidPattern {
                            variable: name.to_string(),
                            source,
                        }
                    })?),
                    None => None,
                };
                TypeSpec::String {
                    min_length: self.min_length,
                    max_length: self.max_length,
                    pattern,
                }
            }
            "number" => TypeSpec::Number {
                min: self.min,
                max: self.max,
                integer: self.integer.unwrap_or(false),
            },
            "boolean" => TypeSpec::Boolean,
            "url" => TypeSpec::Url {
                protocols: self.protocols,
            },
            "json" => TypeSpec::Json,
            "enum" => {
                let values = self.values.unwrap_or_default();
                if values.is_empty() {
                    return Err(EnvSchemaError::InvalidFormat(format!(
                        "enum descriptor for {} requires a non-empty values list",
                        name
                    )));
                }
                TypeSpec::Enum { values }
            }
            other => TypeSpec::Unknown(other.to_string()),
        };

        Ok(Descriptor {
            spec,
            required: self.required,
            default: self.default.as_ref().map(EnvValue::from_default),
            description: self.description,
        })
    }
}

/// The full mapping of variable names to descriptors.
///
/// Declaration order is preserved so validation errors come out in a
/// deterministic order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(String, Descriptor)>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a variable declaration (builder style)
    pub fn field(mut self, name: impl Into<String>, descriptor: Descriptor) -> Self {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = descriptor;
        } else {
            self.entries.push((name, descriptor));
        }
        self
    }

    /// Get the descriptor for a variable
    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Whether the schema declares this variable
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Iterate entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    /// Number of declared variables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schema is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a schema from a parsed JSON object of raw descriptors.
    ///
    /// Key order in the source document is preserved.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(EnvSchemaError::InvalidFormat(
                "schema document must be a JSON object".to_string(),
            ));
        };

        let mut schema = Schema::new();
        for (name, raw) in map {
            if schema.contains(&name) {
                return Err(EnvSchemaError::DuplicateKey(name));
            }
            let raw: RawDescriptor = serde_json::from_value(raw)?;
            let descriptor = raw.into_descriptor(&name)?;
            schema.entries.push((name, descriptor));
        }
        Ok(schema)
    }

    /// Build a schema from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_json_value(serde_json::from_str(content)?)
    }

    /// Load a schema from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
