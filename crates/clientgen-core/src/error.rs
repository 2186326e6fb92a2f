//! Error handling for the clientgen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::error::{Error, Result};
//!
//! fn lower(schema: &str, property: &str) -> Result<String> {
//!     Err(Error::bad_type(schema, property))
//! }
//!
//! let err = lower("Recipe", "name").unwrap_err();
//! assert_eq!(err.to_string(), "bad type: Recipe.name has no resolvable type");
//! ```

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use thiserror::Error;

/// Result type for clientgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for clientgen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// OpenAPI document could not be loaded or is missing required structure
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// A template selection key with no template behind it
    #[error("unknown template selection '{key}'")]
    UnknownTemplate { key: String },

    /// A schema property was left without a type after lowering
    #[error("bad type: {schema}.{property} has no resolvable type")]
    BadType { schema: String, property: String },

    /// A native type has no zero literal or negative assertion in the target
    #[error("bad type: no {what} for native type {type_name}")]
    UnsupportedNative {
        what: &'static str,
        type_name: String,
    },

    /// Classifying or rendering one operation failed
    #[error("operation {operation_id}: {source}")]
    Operation {
        operation_id: String,
        #[source]
        source: Box<Error>,
    },

    /// Writing a generated file failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A post-generation hook exited unsuccessfully
    #[error("post-generation hook '{command}' failed with status {status}\n{output}")]
    Hook {
        command: String,
        status: String,
        output: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Create a lowering-gap error naming the schema and property
    pub fn bad_type(schema: impl Into<String>, property: impl Into<String>) -> Self {
        Self::BadType {
            schema: schema.into(),
            property: property.into(),
        }
    }

    /// Attach the operation id to an error raised while handling that operation
    pub fn in_operation(self, operation_id: impl Into<String>) -> Self {
        match self {
            // keep the innermost id
            Self::Operation { .. } => self,
            other => Self::Operation {
                operation_id: operation_id.into(),
                source: Box::new(other),
            },
        }
    }

    /// The operation id this error was raised for, if any
    pub fn operation_id(&self) -> Option<&str> {
        match self {
            Self::Operation { operation_id, .. } => Some(operation_id),
            _ => None,
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
