//! Environment Schema Validation
//!
//! Validates and type-coerces a flat mapping of environment-variable
//! strings against a declared schema, producing either a strongly-typed
//! configuration mapping or a structured list of validation failures.
//!
//! ## Features
//!
//! - **Six value types**: string, number, boolean, url, json, enum — each
//!   with its own constraint checks
//! - **Default/required resolution**: absent or empty input resolves to
//!   the default first, then the required flag (required-by-default)
//! - **Aggregate reporting**: every schema key is evaluated; errors are
//!   collected, never short-circuited across keys
//! - **Warnings for unschema'd keys**: environment variables with no
//!   declaration warn without affecting validity
//! - **Pure core**: validation is a synchronous, side-effect-free
//!   transformation from (raw strings, schema) to (typed values, errors)
//!
//! ## Example
//!
//! ```
//! use env_schema::{Descriptor, Schema, parse_env, validate_env};
//!
//! let schema = Schema::new()
//!     .field("PORT", Descriptor::number().with_default(3000))
//!     .field("DEBUG", Descriptor::boolean().with_default(false));
//!
//! let mut env = env_schema::RawEnv::new();
//! env.insert("PORT".to_string(), "8080".to_string());
//!
//! let report = validate_env(&env, &schema);
//! assert!(report.valid);
//!
//! let typed = parse_env(&env, &schema).unwrap();
//! assert_eq!(typed.get("PORT").and_then(|v| v.as_number()), Some(8080.0));
//! ```

pub mod dotenv;
pub mod error;
pub mod parser;
pub mod schema;
pub mod validator;
pub mod value;

pub use dotenv::{load_dotenv, parse_dotenv};
pub use error::{EnvSchemaError, Result};
pub use parser::{parse_value, ParsedValue};
pub use schema::{Descriptor, Schema, TypeSpec};
pub use validator::{
    parse_env, validate_env, ErrorKind, RawEnv, TypedEnv, ValidationError, ValidationReport,
};
pub use value::EnvValue;
