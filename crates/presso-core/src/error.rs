//! Error types and error code constants for presso.
//!
//! This module provides a unified error type (`PressoError`) that bridges
//! domain-specific errors from the Java crate (rename, insertion, operations)
//! into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller, bad config)
//! - `3`: Resolution errors (symbol not found, file not found, no main class)
//! - `4`: Apply errors (failed to apply or write changes)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Not-found outcomes of exploratory queries never reach this type: locators
//! and resolvers return empty results. Only the command layer turns an empty
//! result into a `NotFound` with a specific reason.

use std::fmt;

use thiserror::Error;

pub use crate::types::Location;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (symbol not found, file not found).
    ResolutionError = 3,
    /// Apply errors (failed to write changes, content changed under us).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum PressoError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid identifier (not a legal Java name).
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// No symbol at the specified location.
    #[error("no symbol found at {file}:{line}:{col}")]
    SymbolNotFound { file: String, line: u32, col: u32 },

    /// A node was found at the cursor but it is not a classifiable identifier.
    #[error("unable to determine symbol type at cursor position (node kind: {kind}, text: '{text}')")]
    Unclassified { kind: String, text: String },

    /// A required declaration or file could not be located.
    #[error("{message}")]
    NotFound { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to apply changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Configuration could not be read or parsed.
    #[error("config error: {message}")]
    ConfigError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

/// Result alias used by the command layer.
pub type PressoResult<T> = Result<T, PressoError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&PressoError> for OutputErrorCode {
    fn from(err: &PressoError) -> Self {
        match err {
            PressoError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            PressoError::InvalidIdentifier { .. } => OutputErrorCode::InvalidArguments,
            PressoError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            PressoError::SymbolNotFound { .. } => OutputErrorCode::ResolutionError,
            PressoError::Unclassified { .. } => OutputErrorCode::ResolutionError,
            PressoError::NotFound { .. } => OutputErrorCode::ResolutionError,
            PressoError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            PressoError::ApplyError { .. } => OutputErrorCode::ApplyError,
            PressoError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<PressoError> for OutputErrorCode {
    fn from(err: PressoError) -> Self {
        OutputErrorCode::from(&err)
    }
}

impl From<crate::config::ConfigError> for PressoError {
    fn from(err: crate::config::ConfigError) -> Self {
        PressoError::ConfigError {
            message: err.to_string(),
        }
    }
}

impl From<crate::edit::BatchEditError> for PressoError {
    fn from(err: crate::edit::BatchEditError) -> Self {
        PressoError::ApplyError {
            message: err.to_string(),
            file: None,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl PressoError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        PressoError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with JSON details.
    pub fn invalid_args_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        PressoError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(file: impl Into<String>, line: u32, col: u32) -> Self {
        PressoError::SymbolNotFound {
            file: file.into(),
            line,
            col,
        }
    }

    /// Create a not-found error with a specific, actionable reason.
    pub fn not_found(message: impl Into<String>) -> Self {
        PressoError::NotFound {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        PressoError::FileNotFound { path: path.into() }
    }

    /// Create an apply error tied to a file.
    pub fn apply_failed(message: impl Into<String>, file: impl Into<String>) -> Self {
        PressoError::ApplyError {
            message: message.into(),
            file: Some(file.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        PressoError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
