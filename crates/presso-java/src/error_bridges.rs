//! Conversions from the Java error types into [`PressoError`].
//!
//! Positions carried by these errors have no file attached; the command
//! layer fills it in.

use std::io;

use presso_core::error::PressoError;

use crate::buffer::BufferError;
use crate::files::FileError;
use crate::naming::NamingError;
use crate::ops::add::InsertError;
use crate::ops::rename::RenameError;
use crate::ops::OperationError;
use crate::syntax::SyntaxError;

// ============================================================================
// Bridge: SyntaxError -> PressoError
// ============================================================================

impl From<SyntaxError> for PressoError {
    fn from(err: SyntaxError) -> Self {
        PressoError::internal(err.to_string())
    }
}

// ============================================================================
// Bridge: BufferError -> PressoError
// ============================================================================

impl From<BufferError> for PressoError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::Read { path, source } if source.kind() == io::ErrorKind::NotFound => {
                PressoError::file_not_found(path.display().to_string())
            }
            BufferError::Read { path, source } => {
                PressoError::internal(format!("failed to read {}: {}", path.display(), source))
            }
            BufferError::Write { ref path, .. } | BufferError::TargetExists { ref path } => {
                let file = path.display().to_string();
                PressoError::apply_failed(err.to_string(), file)
            }
            BufferError::Rename { ref from, .. } => {
                let file = from.display().to_string();
                PressoError::apply_failed(err.to_string(), file)
            }
            BufferError::NoPath => PressoError::internal(err.to_string()),
            BufferError::Edit(edit_err) => PressoError::from(edit_err),
            BufferError::Syntax(syntax_err) => PressoError::from(syntax_err),
        }
    }
}

// ============================================================================
// Bridge: FileError -> PressoError
// ============================================================================

impl From<FileError> for PressoError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound { path } => PressoError::FileNotFound { path },
            FileError::Io(io_err) => PressoError::internal(format!("IO error: {}", io_err)),
        }
    }
}

// ============================================================================
// Bridge: NamingError -> PressoError
// ============================================================================

impl From<NamingError> for PressoError {
    fn from(err: NamingError) -> Self {
        let name = match &err {
            NamingError::Empty => String::new(),
            NamingError::InvalidStart { name, .. }
            | NamingError::InvalidChar { name, .. }
            | NamingError::Keyword { name } => name.clone(),
        };
        PressoError::InvalidIdentifier {
            name,
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// Bridge: RenameError -> PressoError
// ============================================================================

impl From<RenameError> for PressoError {
    fn from(err: RenameError) -> Self {
        match err {
            RenameError::SymbolNotFound { line, col } => {
                PressoError::symbol_not_found(String::new(), line, col)
            }
            RenameError::NotRenameable { kind, text } => PressoError::Unclassified { kind, text },
            RenameError::Unsupported { .. } => PressoError::invalid_args(err.to_string()),
            RenameError::InvalidName { name, source } => PressoError::InvalidIdentifier {
                name,
                reason: source.to_string(),
            },
            RenameError::ClassNotFound { .. } => PressoError::not_found(err.to_string()),
            RenameError::ConcurrentModification { ref path } => {
                let file = path.display().to_string();
                PressoError::apply_failed(err.to_string(), file)
            }
            RenameError::Buffer(buffer_err) => PressoError::from(buffer_err),
            RenameError::Syntax(syntax_err) => PressoError::from(syntax_err),
            RenameError::File(file_err) => PressoError::from(file_err),
        }
    }
}

// ============================================================================
// Bridge: InsertError -> PressoError
// ============================================================================

impl From<InsertError> for PressoError {
    fn from(err: InsertError) -> Self {
        match err {
            InsertError::ClassNotFound { .. }
            | InsertError::DeclarationNotFound { .. }
            | InsertError::ImportNotFound { .. } => PressoError::not_found(err.to_string()),
            InsertError::DuplicateField { .. } | InsertError::InvalidImport { .. } => {
                PressoError::invalid_args(err.to_string())
            }
            InsertError::InvalidName { name, source } => PressoError::InvalidIdentifier {
                name,
                reason: source.to_string(),
            },
            InsertError::Buffer(buffer_err) => PressoError::from(buffer_err),
            InsertError::Syntax(syntax_err) => PressoError::from(syntax_err),
        }
    }
}

// ============================================================================
// Bridge: OperationError -> PressoError
// ============================================================================

impl From<OperationError> for PressoError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::NoNodeAt { line, col } => {
                PressoError::symbol_not_found(String::new(), line, col)
            }
            OperationError::NoPublicClass
            | OperationError::NoIdField
            | OperationError::NoMainClass
            | OperationError::NoPackage
            | OperationError::NoIdType => PressoError::not_found(err.to_string()),
            OperationError::Buffer(buffer_err) => PressoError::from(buffer_err),
            OperationError::Syntax(syntax_err) => PressoError::from(syntax_err),
            OperationError::File(file_err) => PressoError::from(file_err),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
