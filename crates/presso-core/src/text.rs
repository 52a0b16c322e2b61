//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes

use crate::patch::Span;

// ============================================================================
// Conversions
// ============================================================================

/// Convert a byte offset to 1-indexed line and column.
///
/// Offsets past the end of `content` map to the position just after the last
/// character.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert 1-indexed line and column to a byte offset.
///
/// Returns `None` when `line` or `col` is 0, when the line does not exist, or
/// when the column is past the end of the line. The column just after the
/// last character of a line (the newline itself) is accepted.
pub fn position_to_byte_offset(content: &str, line: u32, col: u32) -> Option<usize> {
    if line == 0 || col == 0 {
        return None;
    }

    let line_start = if line == 1 {
        0
    } else {
        content
            .match_indices('\n')
            .nth(line as usize - 2)
            .map(|(i, _)| i + 1)?
    };
    if line_start > content.len() {
        return None;
    }

    let line_end = content[line_start..]
        .find('\n')
        .map(|p| line_start + p)
        .unwrap_or(content.len());
    let line_text = &content[line_start..line_end];

    let target = col as usize - 1;
    let char_count = line_text.chars().count();
    if target > char_count {
        return None;
    }
    let within = line_text
        .char_indices()
        .nth(target)
        .map(|(i, _)| i)
        .unwrap_or(line_text.len());
    Some(line_start + within)
}

// ============================================================================
// Span Utilities
// ============================================================================

/// Get the 1-indexed line range spanned by a byte span.
pub fn span_to_line_range(content: &str, span: &Span) -> (u32, u32) {
    let (start_line, _) = byte_offset_to_position(content, span.start);
    let (end_line, _) = byte_offset_to_position(content, span.end.saturating_sub(1).max(span.start));
    (start_line, end_line)
}

/// Extract the text content of a span.
///
/// Returns `None` if the span extends beyond content bounds or splits a character.
pub fn extract_span<'a>(content: &'a str, span: &Span) -> Option<&'a str> {
    content.get(span.start..span.end)
}

// ============================================================================
// Tests
// ============================================================================
