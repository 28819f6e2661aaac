//! Error types for the builder DSL and the declaration loader.

use thiserror::Error;

pub use optspec_core::{ConfigurationError, Result};
use optspec_core::VersionError;

/// Errors loading a YAML declaration file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The declarations themselves are inconsistent.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A `version_file` could not be read.
    #[error("version error: {0}")]
    Version(#[from] VersionError),

    /// The document is well-formed YAML but not a valid declaration.
    #[error("invalid declaration: {0}")]
    Invalid(String),
}
