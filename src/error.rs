//! Error types for environment schema validation

use thiserror::Error;

use crate::validator::ValidationError;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, EnvSchemaError>;

/// Environment schema errors
#[derive(Error, Debug)]
pub enum EnvSchemaError {
    #[error("Environment validation failed:\n{}", format_errors(.errors))]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Invalid pattern for {variable}: {source}")]
    InvalidPattern {
        variable: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Duplicate schema key: {0}")]
    DuplicateKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render accumulated validation errors as the multi-block failure message.
///
/// One block per error: the variable name and message on the first line,
/// then optional `Expected:` / `Received:` lines. Blocks are separated by
/// a blank line.
fn format_errors(errors: &[ValidationError]) -> String {
    let blocks: Vec<String> = errors
        .iter()
        .map(|e| {
            let mut block = format!("{}: {}", e.variable, e.message);
            if let Some(expected) = &e.expected {
                block.push_str(&format!("\n  Expected: {}", expected));
            }
            if let Some(received) = &e.received {
                block.push_str(&format!("\n  Received: {}", received));
            }
            block
        })
        .collect();
    blocks.join("\n\n")
}
