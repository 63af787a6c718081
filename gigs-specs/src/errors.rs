//! Error types for fixture loading and suite runs.

use thiserror::Error;

/// Errors that can occur before any test runs.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A fixture or configuration file is not valid TOML for its schema.
    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },

    /// A file or directory could not be read.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// A case references a code no case in the same file defines.
    #[error("{test}: {message}")]
    Reference { test: String, message: String },
}

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;
