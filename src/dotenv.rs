//! Minimal `.env` file parsing
//!
//! Turns dotfile text into a [`RawEnv`] mapping. Supports comments, blank
//! lines, an optional `export ` prefix, and single- or double-quoted
//! values. Never touches the process environment.

use std::path::Path;

use crate::error::Result;
use crate::validator::RawEnv;

/// Parse dotenv-formatted text into a raw environment mapping.
///
/// Lines without an `=` are skipped. Later assignments to the same key
/// overwrite earlier ones, matching the usual dotenv convention.
pub fn parse_dotenv(content: &str) -> RawEnv {
    let mut env = RawEnv::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        env.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    env
}

/// Read and parse a `.env` file
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<RawEnv> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_dotenv(&content))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
