//! Error handling for Argo quality control operations.
//!
//! Provides error types with context for property lookups, flag decoding,
//! output bookkeeping, configuration and profile loading failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid property name '{name}': expected one of PRES, TEMP, PSAL")]
    InvalidPropertyName { name: String },

    #[error("No output flags initialised for property {property}")]
    UninitializedOutput { property: String },

    #[error("Unknown Argo QC flag code {code:?}")]
    UnknownFlag { code: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(
        "Selection does not fit property {property}: expected {expected} samples, found {found}"
    )]
    SelectionMismatch {
        property: String,
        expected: usize,
        found: usize,
    },

    #[error("Shape mismatch for property {property}: expected {expected}, found {found}")]
    ShapeMismatch {
        property: String,
        expected: String,
        found: String,
    },

    #[error("Failed to load profile from {path}: {reason}")]
    ProfileLoad { path: PathBuf, reason: String },
}

impl QcError {
    /// Create an invalid property name error
    pub fn invalid_property(name: impl Into<String>) -> Self {
        Self::InvalidPropertyName { name: name.into() }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unknown flag error from the raw wire bytes
    pub fn unknown_flag(code: &[u8]) -> Self {
        Self::UnknownFlag {
            code: String::from_utf8_lossy(code).into_owned(),
        }
    }

    /// Create a profile loading error
    pub fn profile_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProfileLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QcError>;
