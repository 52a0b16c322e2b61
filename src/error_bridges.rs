//! Error helpers for the command layer.
//!
//! The `From` conversions into `PressoError` live next to the error types
//! in `presso-java`. What remains here is the part that needs the command's
//! context.

use presso_core::error::PressoError;

/// Attach `file` to a position error produced without one.
pub fn with_file(err: PressoError, file: &str) -> PressoError {
    match err {
        PressoError::SymbolNotFound { file: f, line, col } if f.is_empty() => {
            PressoError::symbol_not_found(file, line, col)
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
