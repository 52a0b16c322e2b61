//! User-facing operations built on the locators, resolver and planners.
//!
//! Each operation plans every edit against the current text first and then
//! applies the batch; edit records are always reported against the text as
//! it was before the operation.

pub mod add;
pub mod cursor;
pub mod entity;
pub mod main_class;
pub mod rename;
pub mod repository;

use presso_core::edit::EditPrimitive;
use presso_core::text::byte_offset_to_position;
use presso_core::types::{EditRecord, Location};
use thiserror::Error;

use crate::buffer::{BufferError, SourceBuffer};
use crate::files::FileError;
use crate::syntax::SyntaxError;

/// Failures of the query-style operations (cursor, main class, entity,
/// repository generation).
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("no syntax node at {line}:{col}")]
    NoNodeAt { line: u32, col: u32 },

    #[error("No public class found in the entity file.")]
    NoPublicClass,

    #[error("No @Id field found in the entity or its superclass hierarchy.")]
    NoIdField,

    #[error("Couldn't find the main class of this project.")]
    NoMainClass,

    #[error("Package name could not be extracted from the entity file.")]
    NoPackage,

    #[error("ID field type could not be extracted.")]
    NoIdType,

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    File(#[from] FileError),
}

/// Result type for query-style operations.
pub type OperationResult<T> = Result<T, OperationError>;

/// Describe `edits` against the buffer's current text, in position order.
pub fn edit_records(buffer: &SourceBuffer, file: &str, edits: &[EditPrimitive]) -> Vec<EditRecord> {
    let mut records: Vec<EditRecord> = edits
        .iter()
        .map(|edit| {
            let span = edit.effective_span();
            let start = edit.insertion_point();
            let (line, col) = byte_offset_to_position(buffer.text(), start);
            let old_text = if edit.is_insertion() {
                String::new()
            } else {
                buffer.span_text(span).to_string()
            };
            EditRecord {
                location: Location::with_span(file, line, col, start, start + old_text.len()),
                old_text,
                new_text: edit.text().to_string(),
            }
        })
        .collect();
    records.sort_by_key(|r| r.location.byte_start);
    records
}

/// Display label for a buffer: its path, or `<buffer>` when in memory.
pub(crate) fn buffer_label(buffer: &SourceBuffer) -> String {
    buffer
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<buffer>".to_string())
}
