//! Batch edit infrastructure for applying multiple span-based edits at once.
//!
//! Every edit in a batch is expressed against the *original* text. The
//! editor sorts edits by insertion point in descending order and applies them
//! back-to-front, so an edit never shifts the offsets of an edit that has not
//! been applied yet.
//!
//! # Edit Primitives
//!
//! | Primitive | Description | Span Semantics |
//! |-----------|-------------|----------------|
//! | `Replace(span, text)` | Replace content at span with new text | `span.start..span.end` becomes `text` |
//! | `InsertBefore(span, text)` | Insert text immediately before span | Insert at `span.start` |
//! | `InsertAfter(span, text)` | Insert text immediately after span | Insert at `span.end` |
//! | `InsertAt(position, text)` | Insert at absolute position | Zero-width span at position |
//!
//! # Example
//!
//! ```
//! use presso_core::edit::{BatchSpanEditor, EditPrimitive};
//! use presso_core::patch::Span;
//!
//! let source = "class User { User user; }";
//!
//! let mut editor = BatchSpanEditor::new(source);
//! editor.add(EditPrimitive::replace(Span::new(6, 10), "Customer"));
//! editor.add(EditPrimitive::replace(Span::new(13, 17), "Customer"));
//!
//! let result = editor.apply().unwrap();
//! assert_eq!(result, "class Customer { Customer user; }");
//! ```

use std::cmp::Ordering;

use thiserror::Error;

use crate::patch::Span;

/// An atomic edit operation on source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPrimitive {
    /// Replace content at span with new text.
    Replace { span: Span, new_text: String },

    /// Insert text immediately before the given span.
    InsertBefore { anchor_span: Span, text: String },

    /// Insert text immediately after the given span.
    InsertAfter { anchor_span: Span, text: String },

    /// Insert text at an absolute byte position.
    InsertAt { position: usize, text: String },
}

impl EditPrimitive {
    /// Shorthand for a `Replace` edit.
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        EditPrimitive::Replace {
            span,
            new_text: new_text.into(),
        }
    }

    /// Shorthand for an `InsertAt` edit.
    pub fn insert_at(position: usize, text: impl Into<String>) -> Self {
        EditPrimitive::InsertAt {
            position,
            text: text.into(),
        }
    }

    /// Returns the span that must lie inside the source.
    pub fn effective_span(&self) -> Span {
        match self {
            EditPrimitive::Replace { span, .. } => *span,
            EditPrimitive::InsertBefore { anchor_span, .. } => *anchor_span,
            EditPrimitive::InsertAfter { anchor_span, .. } => *anchor_span,
            EditPrimitive::InsertAt { position, .. } => Span::empty_at(*position),
        }
    }

    /// Returns the insertion point (byte offset where new text begins).
    pub fn insertion_point(&self) -> usize {
        match self {
            EditPrimitive::Replace { span, .. } => span.start,
            EditPrimitive::InsertBefore { anchor_span, .. } => anchor_span.start,
            EditPrimitive::InsertAfter { anchor_span, .. } => anchor_span.end,
            EditPrimitive::InsertAt { position, .. } => *position,
        }
    }

    /// Returns true if this is an insertion (InsertBefore, InsertAfter, InsertAt).
    pub fn is_insertion(&self) -> bool {
        !matches!(self, EditPrimitive::Replace { .. })
    }

    /// The text written by this edit.
    pub fn text(&self) -> &str {
        match self {
            EditPrimitive::Replace { new_text, .. } => new_text,
            EditPrimitive::InsertBefore { text, .. }
            | EditPrimitive::InsertAfter { text, .. }
            | EditPrimitive::InsertAt { text, .. } => text,
        }
    }

    /// Span used for overlap checks: insertions are zero-width.
    fn overlap_span(&self) -> Span {
        match self {
            EditPrimitive::Replace { span, .. } => *span,
            _ => Span::empty_at(self.insertion_point()),
        }
    }
}

/// Error type for batch edit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchEditError {
    /// Two edits have overlapping spans.
    #[error("overlapping edits: {edit1_span} and {edit2_span}")]
    OverlappingEdits { edit1_span: Span, edit2_span: Span },

    /// An edit span extends beyond source length.
    #[error("span {span} is out of bounds for source of length {source_len}")]
    SpanOutOfBounds { span: Span, source_len: usize },

    /// An edit boundary splits a UTF-8 character.
    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },

    /// No edits to apply.
    #[error("no edits to apply")]
    EmptyEdits,
}

/// Result type for batch edit operations.
pub type BatchEditResult<T> = Result<T, BatchEditError>;

/// Options for controlling edit application behavior.
#[derive(Debug, Clone)]
pub struct BatchEditOptions {
    /// If true, adjacent edits (one ends where another starts) are allowed.
    /// Default: true
    pub allow_adjacent: bool,

    /// If true, empty edit list returns original source instead of error.
    /// Default: false
    pub allow_empty: bool,
}

impl Default for BatchEditOptions {
    fn default() -> Self {
        Self {
            allow_adjacent: true,
            allow_empty: false,
        }
    }
}

/// A batch editor that collects edit primitives and applies them atomically.
///
/// Either every edit is applied or none is: validation (bounds, character
/// boundaries, overlaps) happens before the first byte changes.
pub struct BatchSpanEditor<'src> {
    source: &'src str,
    edits: Vec<EditPrimitive>,
    options: BatchEditOptions,
}

impl<'src> BatchSpanEditor<'src> {
    /// Create a new BatchSpanEditor for the given source.
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, BatchEditOptions::default())
    }

    /// Create a new BatchSpanEditor with custom options.
    pub fn with_options(source: &'src str, options: BatchEditOptions) -> Self {
        Self {
            source,
            edits: Vec::new(),
            options,
        }
    }

    /// Add an edit primitive to the batch.
    pub fn add(&mut self, edit: EditPrimitive) {
        self.edits.push(edit);
    }

    /// Add multiple edit primitives.
    pub fn add_all(&mut self, edits: impl IntoIterator<Item = EditPrimitive>) {
        self.edits.extend(edits);
    }

    /// Returns the number of edits currently queued.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if no edits are queued.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all queued edits and return the transformed source.
    ///
    /// # Errors
    ///
    /// - `BatchEditError::OverlappingEdits` if any two edits overlap
    /// - `BatchEditError::SpanOutOfBounds` if any span exceeds source length
    /// - `BatchEditError::NotCharBoundary` if a span splits a character
    /// - `BatchEditError::EmptyEdits` if no edits and `allow_empty` is false
    pub fn apply(mut self) -> BatchEditResult<String> {
        if self.edits.is_empty() {
            return if self.options.allow_empty {
                Ok(self.source.to_string())
            } else {
                Err(BatchEditError::EmptyEdits)
            };
        }

        self.check_bounds()?;
        sort_descending(&mut self.edits);
        if let Some((edit1_span, edit2_span)) = self.first_overlap() {
            return Err(BatchEditError::OverlappingEdits {
                edit1_span,
                edit2_span,
            });
        }

        let mut result = self.source.to_string();
        for edit in &self.edits {
            apply_single_edit(&mut result, edit);
        }
        Ok(result)
    }

    /// Validate edits without applying them.
    pub fn validate(&self) -> BatchEditResult<()> {
        if self.edits.is_empty() && !self.options.allow_empty {
            return Err(BatchEditError::EmptyEdits);
        }
        self.check_bounds()?;
        let mut sorted = self.edits.clone();
        sort_descending(&mut sorted);
        match overlap_in(&sorted, self.options.allow_adjacent) {
            Some((edit1_span, edit2_span)) => Err(BatchEditError::OverlappingEdits {
                edit1_span,
                edit2_span,
            }),
            None => Ok(()),
        }
    }

    fn check_bounds(&self) -> BatchEditResult<()> {
        let source_len = self.source.len();
        for edit in &self.edits {
            let span = edit.effective_span();
            if span.end > source_len {
                return Err(BatchEditError::SpanOutOfBounds { span, source_len });
            }
            if !self.source.is_char_boundary(span.start) || !self.source.is_char_boundary(span.end)
            {
                return Err(BatchEditError::NotCharBoundary { span });
            }
        }
        Ok(())
    }

    fn first_overlap(&self) -> Option<(Span, Span)> {
        overlap_in(&self.edits, self.options.allow_adjacent)
    }
}

/// Sort edits by insertion point, descending. At equal positions replacements
/// come before insertions so the insertion lands at the original offset, and
/// insertions run last-added first so they end up in the order they were added.
fn sort_descending(edits: &mut Vec<EditPrimitive>) {
    let mut indexed: Vec<(usize, EditPrimitive)> = edits.drain(..).enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        b.insertion_point()
            .cmp(&a.insertion_point())
            .then_with(|| match (a.is_insertion(), b.is_insertion()) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                _ => Ordering::Equal,
            })
            .then_with(|| ib.cmp(ia))
    });
    edits.extend(indexed.into_iter().map(|(_, edit)| edit));
}

/// Find the first overlapping pair in a descending-sorted edit list.
fn overlap_in(sorted: &[EditPrimitive], allow_adjacent: bool) -> Option<(Span, Span)> {
    sorted.windows(2).find_map(|pair| {
        let prev = pair[0].overlap_span();
        let curr = pair[1].overlap_span();
        if spans_overlap(&prev, &curr, allow_adjacent) {
            Some((curr, prev))
        } else {
            None
        }
    })
}

/// Overlap test that treats two replacements of the same span as a conflict
/// and, when `allow_adjacent` is false, touching spans too.
fn spans_overlap(a: &Span, b: &Span, allow_adjacent: bool) -> bool {
    if a.is_empty() || b.is_empty() {
        // Zero-width insertions only conflict when strictly inside a replacement.
        let (point, other) = if a.is_empty() { (a, b) } else { (b, a) };
        return other.start < point.start && point.start < other.end;
    }
    if a == b || a.overlaps(b) {
        return true;
    }
    !allow_adjacent && (a.end == b.start || b.end == a.start)
}

fn apply_single_edit(result: &mut String, edit: &EditPrimitive) {
    match edit {
        EditPrimitive::Replace { span, new_text } => {
            result.replace_range(span.start..span.end, new_text);
        }
        EditPrimitive::InsertBefore { anchor_span, text } => {
            result.insert_str(anchor_span.start, text);
        }
        EditPrimitive::InsertAfter { anchor_span, text } => {
            result.insert_str(anchor_span.end, text);
        }
        EditPrimitive::InsertAt { position, text } => {
            result.insert_str(*position, text);
        }
    }
}

/// Detect the indentation at a given byte position.
///
/// Returns the leading whitespace of the line containing `position`. If
/// that line is blank, the previous line's indentation is used; if neither
/// has any, returns an empty string.
pub fn detect_indentation(source: &str, position: usize) -> &str {
    if source.is_empty() || position > source.len() || !source.is_char_boundary(position) {
        return "";
    }

    let line_start = source[..position].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[position..]
        .find('\n')
        .map(|i| position + i)
        .unwrap_or(source.len());
    let indent = leading_whitespace(&source[line_start..line_end]);
    if !indent.is_empty() {
        return indent;
    }

    if line_start > 0 {
        let prev_end = line_start - 1;
        let prev_start = source[..prev_end].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let prev = &source[prev_start..prev_end];
        if !prev.trim().is_empty() {
            return leading_whitespace(prev);
        }
    }

    ""
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(0);
    &line[..end]
}

// ============================================================================
// Tests
// ============================================================================
