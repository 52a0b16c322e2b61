//! Common types shared between error and output modules.
//!
//! This module contains types that are used by both the error and output modules,
//! avoiding circular dependencies.

use serde::{Deserialize, Serialize};

// ============================================================================
// Location Type
// ============================================================================

/// Location in a source file.
///
/// - `file`: Path as given by the caller (required)
/// - `line`: 1-indexed line number (required)
/// - `col`: 1-indexed column, in characters (required)
/// - `byte_start`: Byte offset from file start (optional)
/// - `byte_end`: Byte offset end, exclusive (optional)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File path.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
    /// Byte offset from file start (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<usize>,
    /// Byte offset end, exclusive (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<usize>,
}

impl Location {
    /// Create a new location without byte offsets.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// Create a location with full byte span.
    pub fn with_span(
        file: impl Into<String>,
        line: u32,
        col: u32,
        byte_start: usize,
        byte_end: usize,
    ) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: Some(byte_start),
            byte_end: Some(byte_end),
        }
    }

    /// Parse a location from "path:line:col" format.
    ///
    /// This parsing is robust against paths containing colons (e.g., Windows paths).
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.rsplitn(3, ':').collect();
        if parts.len() != 3 || parts[2].is_empty() {
            return None;
        }
        let col: u32 = parts[0].parse().ok()?;
        let line: u32 = parts[1].parse().ok()?;
        Some(Location::new(parts[2], line, col))
    }

    /// Comparison key for deterministic sorting: (file, line, col).
    fn sort_key(&self) -> (&str, u32, u32) {
        (&self.file, self.line, self.col)
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

// ============================================================================
// Edit Record
// ============================================================================

/// One applied (or planned) text replacement, as reported to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditRecord {
    /// Where the replaced text started, in the original file.
    pub location: Location,
    /// Text that was replaced (empty for insertions).
    pub old_text: String,
    /// Text written in its place.
    pub new_text: String,
}

// ============================================================================
// Tests
// ============================================================================
