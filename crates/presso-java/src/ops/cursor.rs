//! Symbol lookup at a cursor position.

use presso_core::patch::Span;
use presso_core::text::byte_offset_to_position;

use super::{OperationError, OperationResult};
use crate::buffer::SourceBuffer;
use crate::classify::{classify, IdentifierKind};
use crate::syntax::span_of;

/// What sits under a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorInfo {
    pub node_kind: String,
    pub node_text: String,
    /// `None` for anything that is not a declared name.
    pub identifier_kind: Option<IdentifierKind>,
    /// 1-indexed start of the node.
    pub line: u32,
    pub col: u32,
    pub span: Span,
}

impl CursorInfo {
    /// `identifier_kind` as reported to callers, `unknown` when unclassified.
    pub fn kind_label(&self) -> &'static str {
        self.identifier_kind
            .map(|kind| kind.as_str())
            .unwrap_or("unknown")
    }
}

/// Smallest named node at a 1-indexed `line`/`col` and its identifier kind.
pub fn cursor_info(buffer: &SourceBuffer, line: u32, col: u32) -> OperationResult<CursorInfo> {
    let node = buffer
        .node_at(line, col)
        .ok_or(OperationError::NoNodeAt { line, col })?;
    let (start_line, start_col) = byte_offset_to_position(buffer.text(), node.start_byte());
    Ok(CursorInfo {
        node_kind: node.kind().to_string(),
        node_text: buffer.node_text(node).to_string(),
        identifier_kind: classify(node),
        line: start_line,
        col: start_col,
        span: span_of(node),
    })
}
