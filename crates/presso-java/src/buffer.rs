//! One Java file: its text plus the current parse tree.
//!
//! Nodes handed out by a [`SourceBuffer`] borrow it immutably, while every
//! mutation takes `&mut self`. Queries for one logical operation therefore
//! finish (and their nodes are dropped, keeping only [`Span`]s) before any
//! edit is applied. Batch edits go through [`SourceBuffer::apply_edits`],
//! which applies back-to-front and reparses once.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use presso_core::edit::{BatchEditError, BatchSpanEditor, EditPrimitive};
use presso_core::patch::{ContentHash, Span};
use presso_core::text::position_to_byte_offset;
use thiserror::Error;
use tracing::debug;
use tree_sitter::{Node, Tree};

use crate::syntax::{parse_java, SyntaxError, SyntaxQuery};

/// Errors raised while loading, editing or saving a buffer.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("buffer has no file path")]
    NoPath,

    #[error("target file already exists: {path}")]
    TargetExists { path: PathBuf },

    #[error(transparent)]
    Edit(#[from] BatchEditError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Result type for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Mutable source text of one file, kept in sync with its tree.
pub struct SourceBuffer {
    path: Option<PathBuf>,
    text: String,
    tree: Tree,
}

impl std::fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("path", &self.path)
            .field("len", &self.text.len())
            .finish()
    }
}

impl SourceBuffer {
    /// Parse in-memory text that has no backing file.
    pub fn parse(text: impl Into<String>) -> BufferResult<Self> {
        let text = text.into();
        let tree = parse_java(&text)?;
        Ok(SourceBuffer {
            path: None,
            text,
            tree,
        })
    }

    /// Read and parse a file.
    pub fn load(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| BufferError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut buffer = Self::parse(text)?;
        buffer.path = Some(path.to_path_buf());
        debug!(path = %path.display(), "loaded source file");
        Ok(buffer)
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name without the `.java` extension.
    pub fn file_stem(&self) -> Option<&str> {
        self.path.as_deref()?.file_stem()?.to_str()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// True if the tree contains syntax errors.
    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Source text covered by `node`.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        self.text.get(node.byte_range()).unwrap_or_default()
    }

    /// Source text covered by `span`.
    pub fn span_text(&self, span: Span) -> &str {
        self.text.get(span.start..span.end).unwrap_or_default()
    }

    /// Start a structural query over this buffer.
    pub fn query(&self, pattern: impl Into<String>) -> SyntaxQuery<'_> {
        SyntaxQuery::new(&self.text, self.root(), pattern)
    }

    /// Smallest named node covering `offset`.
    pub fn node_at_offset(&self, offset: usize) -> Option<Node<'_>> {
        if offset >= self.text.len() {
            return None;
        }
        self.root().named_descendant_for_byte_range(offset, offset)
    }

    /// Smallest named node at a 1-indexed line and column.
    pub fn node_at(&self, line: u32, col: u32) -> Option<Node<'_>> {
        let offset = position_to_byte_offset(&self.text, line, col)?;
        self.node_at_offset(offset)
    }

    /// Named node occupying exactly `span`, preferring the innermost.
    pub fn node_for_span(&self, span: Span) -> Option<Node<'_>> {
        let node = self
            .root()
            .named_descendant_for_byte_range(span.start, span.end)?;
        (node.start_byte() == span.start && node.end_byte() == span.end).then_some(node)
    }

    pub fn content_hash(&self) -> ContentHash {
        ContentHash::compute(self.text.as_bytes())
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Replace `start..end` and reparse.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> BufferResult<()> {
        self.apply_edits(vec![EditPrimitive::replace(Span::new(start, end), text)])?;
        Ok(())
    }

    /// Insert `text` just before `span`.
    pub fn insert_before(&mut self, span: Span, text: &str) -> BufferResult<()> {
        self.apply_edits(vec![EditPrimitive::InsertBefore {
            anchor_span: span,
            text: text.to_string(),
        }])?;
        Ok(())
    }

    /// Insert `text` just after `span`.
    pub fn insert_after(&mut self, span: Span, text: &str) -> BufferResult<()> {
        self.apply_edits(vec![EditPrimitive::InsertAfter {
            anchor_span: span,
            text: text.to_string(),
        }])?;
        Ok(())
    }

    /// Apply a batch of edits expressed against the current text.
    ///
    /// Edits are validated, applied in descending position order and the
    /// tree is rebuilt once. Returns the number of edits applied.
    pub fn apply_edits(&mut self, edits: Vec<EditPrimitive>) -> BufferResult<usize> {
        if edits.is_empty() {
            return Ok(0);
        }
        let count = edits.len();
        let mut editor = BatchSpanEditor::new(&self.text);
        editor.add_all(edits);
        let new_text = editor.apply()?;
        self.tree = parse_java(&new_text)?;
        self.text = new_text;
        debug!(
            path = ?self.path,
            edits = count,
            "applied edit batch"
        );
        Ok(count)
    }

    /// Swap in entirely new text.
    pub fn set_text(&mut self, text: String) -> BufferResult<()> {
        self.tree = parse_java(&text)?;
        self.text = text;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Write the text back to the backing file.
    pub fn save(&self) -> BufferResult<()> {
        let path = self.path.as_deref().ok_or(BufferError::NoPath)?;
        write_file(path, &self.text)
    }

    /// Write the text to `path` and make it the backing file.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> BufferResult<()> {
        let path = path.into();
        write_file(&path, &self.text)?;
        self.path = Some(path);
        Ok(())
    }

    /// Rename the backing file to `<new_stem>.java` in the same directory.
    ///
    /// Returns the new path. Refuses to overwrite an existing file.
    pub fn rename_file(&mut self, new_stem: &str) -> BufferResult<PathBuf> {
        let from = self.path.clone().ok_or(BufferError::NoPath)?;
        let to = from.with_file_name(format!("{new_stem}.java"));
        if to == from {
            return Ok(to);
        }
        if to.exists() {
            return Err(BufferError::TargetExists { path: to });
        }
        fs::rename(&from, &to).map_err(|source| BufferError::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        debug!(from = %from.display(), to = %to.display(), "renamed source file");
        self.path = Some(to.clone());
        Ok(to)
    }
}

fn write_file(path: &Path, text: &str) -> BufferResult<()> {
    fs::write(path, text).map_err(|source| BufferError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "wrote source file");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
