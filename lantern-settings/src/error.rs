//! Configuration error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The base profile could not be read
    #[error("Base profile '{profile}' not found ({source_desc})")]
    MissingBaseProfile { profile: String, source_desc: String },

    /// A profile's raw content could not be parsed
    #[error("Malformed layer for profile '{profile}': {message}")]
    MalformedLayer { profile: String, message: String },

    /// IO error reading a settings file that exists
    #[error("Failed to read settings file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structural binding error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Domain-specific configuration error
    #[error("Domain configuration error in {domain}: {message}")]
    DomainError { domain: String, message: String },

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// No service registered for the requested type
    #[error("Service not found: {0}")]
    ServiceNotFound(String),
}

/// Field-qualified error raised while binding the merged layers onto the schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid settings at '{path}': {kind}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `documentstore.redis.port`
    pub path: String,

    /// What went wrong
    pub kind: ValidationErrorKind,
}

/// Nature of a binding violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required field had no value in any layer and no default
    MissingField,
    /// The value had the wrong shape, e.g. a string where a port was expected
    InvalidType(String),
    /// A discriminator held a value outside its closed set
    NotInAllowedSet { value: String, allowed: Vec<String> },
    /// Anything else serde reported
    Other(String),
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::MissingField => write!(f, "missing required field"),
            ValidationErrorKind::InvalidType(detail) => write!(f, "wrong type ({})", detail),
            ValidationErrorKind::NotInAllowedSet { value, allowed } => write!(
                f,
                "value '{}' is not one of [{}]",
                value,
                allowed.join(", ")
            ),
            ValidationErrorKind::Other(detail) => write!(f, "{}", detail),
        }
    }
}

impl ConfigError {
    /// The field path for binding errors, if any
    pub fn field_path(&self) -> Option<&str> {
        match self {
            ConfigError::Validation(e) => Some(&e.path),
            _ => None,
        }
    }
}
