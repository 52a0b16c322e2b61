//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Structured JSON:** every CLI response is a single JSON document on stdout
//! 2. **Status first:** every response has `status` as first field
//! 3. **Deterministic:** same input -> same output (field order, array ordering)
//! 4. **Nullable vs absent:** explicit `null` for "no value"; absent field means "not applicable"
//! 5. **Versioned:** schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, PressoError};

pub use crate::types::{EditRecord, Location};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

fn ok_status() -> String {
    "ok".to_string()
}

// ============================================================================
// Shared Pieces
// ============================================================================

/// Edits applied (or planned) in a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEdits {
    /// File path.
    pub file: String,
    /// Edits, ordered by position in the original file.
    pub edits: Vec<EditRecord>,
}

/// A file that was (or would be) renamed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRename {
    pub from: String,
    pub to: String,
}

/// Edit summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Files modified.
    pub files_changed: u32,
    /// Total edits.
    pub edits_count: u32,
    /// Net bytes added.
    pub bytes_added: i64,
    /// Net bytes removed.
    pub bytes_removed: i64,
}

impl Summary {
    /// Summarize a set of per-file edits.
    pub fn from_files(files: &[FileEdits]) -> Self {
        let mut added: i64 = 0;
        let mut removed: i64 = 0;
        let mut edits_count = 0u32;
        for edit in files.iter().flat_map(|f| f.edits.iter()) {
            added += edit.new_text.len() as i64;
            removed += edit.old_text.len() as i64;
            edits_count += 1;
        }
        Summary {
            files_changed: files.iter().filter(|f| !f.edits.is_empty()).count() as u32,
            edits_count,
            bytes_added: added - removed.min(added),
            bytes_removed: removed - added.min(removed),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a PressoError.
    pub fn from_error(err: &PressoError) -> Self {
        let (details, location) = match err {
            PressoError::SymbolNotFound { file, line, col } => {
                (None, Some(Location::new(file.clone(), *line, *col)))
            }
            PressoError::InvalidArguments { details, .. } => (details.clone(), None),
            PressoError::FileNotFound { path } => (Some(serde_json::json!({ "path": path })), None),
            PressoError::Unclassified { kind, text } => (
                Some(serde_json::json!({ "node_kind": kind, "node_text": text })),
                None,
            ),
            PressoError::ApplyError { file, .. } => {
                (file.as_ref().map(|f| serde_json::json!({ "file": f })), None)
            }
            _ => (None, None),
        };

        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
            location,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a PressoError.
    pub fn from_error(err: &PressoError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for `cursor-info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorInfoResponse {
    pub status: String,
    pub schema_version: String,
    /// File the cursor is in.
    pub file: String,
    /// Grammar kind of the node under the cursor.
    pub node_kind: String,
    /// Source text of that node.
    pub node_text: String,
    /// Semantic identifier kind (class_name, field_name, ...).
    pub identifier_kind: String,
    /// Start of the node.
    pub location: Location,
}

impl CursorInfoResponse {
    pub fn new(
        file: impl Into<String>,
        node_kind: impl Into<String>,
        node_text: impl Into<String>,
        identifier_kind: impl Into<String>,
        location: Location,
    ) -> Self {
        CursorInfoResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            node_kind: node_kind.into(),
            node_text: node_text.into(),
            identifier_kind: identifier_kind.into(),
            location,
        }
    }
}

/// Response for `rename`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameResponse {
    pub status: String,
    pub schema_version: String,
    /// Identifier kind of the renamed symbol.
    pub symbol_kind: String,
    pub old_name: String,
    pub new_name: String,
    /// True when nothing was written.
    pub dry_run: bool,
    /// Edits per file, sorted by file path.
    pub files: Vec<FileEdits>,
    /// Files renamed on disk (public class renames).
    pub renamed_files: Vec<FileRename>,
    pub summary: Summary,
}

impl RenameResponse {
    pub fn new(
        symbol_kind: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
        dry_run: bool,
        mut files: Vec<FileEdits>,
        renamed_files: Vec<FileRename>,
    ) -> Self {
        files.sort_by(|a, b| a.file.cmp(&b.file));
        let summary = Summary::from_files(&files);
        RenameResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            symbol_kind: symbol_kind.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
            dry_run,
            files,
            renamed_files,
            summary,
        }
    }
}

/// Response for `main-class`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainClassResponse {
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub class_name: String,
    pub package: String,
}

impl MainClassResponse {
    pub fn new(
        file: impl Into<String>,
        class_name: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        MainClassResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            class_name: class_name.into(),
            package: package.into(),
        }
    }
}

/// The identity field of an entity, possibly inherited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFieldInfo {
    pub name: String,
    pub type_name: String,
    /// Class that declares the field.
    pub declared_in: String,
    /// File that declares the field.
    pub file: String,
}

/// Response for `entity-info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInfoResponse {
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub entity_type: String,
    pub package: String,
    /// `null` when the hierarchy has no identity field.
    pub id_field: Option<IdFieldInfo>,
    /// Superclass that could not be located in the project, if the walk stopped there.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved_superclass: Option<String>,
}

impl EntityInfoResponse {
    pub fn new(
        file: impl Into<String>,
        entity_type: impl Into<String>,
        package: impl Into<String>,
        id_field: Option<IdFieldInfo>,
        unresolved_superclass: Option<String>,
    ) -> Self {
        EntityInfoResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            entity_type: entity_type.into(),
            package: package.into(),
            id_field,
            unresolved_superclass,
        }
    }
}

/// The interface written by `create-jpa-repository`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub entity_type: String,
    pub id_type: String,
    pub package: String,
}

/// Response for `create-jpa-repository`.
///
/// When the entity's hierarchy could not be followed, `file` is the entity
/// file, `requires_symbol_source` is true and `symbol` names the superclass
/// whose source is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryResponse {
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub requires_symbol_source: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryInfo>,
}

impl RepositoryResponse {
    pub fn created(file: impl Into<String>, repository: RepositoryInfo) -> Self {
        RepositoryResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            requires_symbol_source: false,
            symbol: None,
            repository: Some(repository),
        }
    }

    pub fn requires_symbol_source(entity_file: impl Into<String>, symbol: impl Into<String>) -> Self {
        RepositoryResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: entity_file.into(),
            requires_symbol_source: true,
            symbol: Some(symbol.into()),
            repository: None,
        }
    }
}

/// Response for insertion commands (`add-import`, `add-field`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertResponse {
    pub status: String,
    pub schema_version: String,
    pub file: String,
    /// False when the insertion was skipped (e.g. import already present).
    pub applied: bool,
    pub edits: Vec<EditRecord>,
}

impl InsertResponse {
    pub fn new(file: impl Into<String>, applied: bool, edits: Vec<EditRecord>) -> Self {
        InsertResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            applied,
            edits,
        }
    }
}

/// Response for `files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesResponse {
    pub status: String,
    pub schema_version: String,
    pub count: usize,
    pub files: Vec<String>,
}

impl FilesResponse {
    pub fn new(files: Vec<String>) -> Self {
        FilesResponse {
            status: ok_status(),
            schema_version: SCHEMA_VERSION.to_string(),
            count: files.len(),
            files,
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(file: &str, old: &str, new: &str) -> EditRecord {
        EditRecord {
            location: Location::new(file, 1, 1),
            old_text: old.to_string(),
            new_text: new.to_string(),
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn summary_counts_files_and_bytes() {
            let files = vec![
                FileEdits {
                    file: "A.java".to_string(),
                    edits: vec![edit("A.java", "User", "Customer"), edit("A.java", "user", "customer")],
                },
                FileEdits {
                    file: "B.java".to_string(),
                    edits: vec![],
                },
            ];
            let summary = Summary::from_files(&files);
            assert_eq!(summary.files_changed, 1);
            assert_eq!(summary.edits_count, 2);
            assert_eq!(summary.bytes_added, 8);
            assert_eq!(summary.bytes_removed, 0);
        }

        #[test]
        fn shrinking_rename_reports_removed_bytes() {
            let files = vec![FileEdits {
                file: "A.java".to_string(),
                edits: vec![edit("A.java", "Customer", "User")],
            }];
            let summary = Summary::from_files(&files);
            assert_eq!(summary.bytes_added, 0);
            assert_eq!(summary.bytes_removed, 4);
        }
    }

    mod response_tests {
        use super::*;

        #[test]
        fn status_is_first_field() {
            let response = MainClassResponse::new("App.java", "App", "com.acme");
            let json = serde_json::to_string(&response).unwrap();
            assert!(json.starts_with("{\"status\":\"ok\""));
        }

        #[test]
        fn rename_response_sorts_files() {
            let response = RenameResponse::new(
                "class_name",
                "User",
                "Customer",
                true,
                vec![
                    FileEdits {
                        file: "b/Z.java".to_string(),
                        edits: vec![edit("b/Z.java", "User", "Customer")],
                    },
                    FileEdits {
                        file: "a/A.java".to_string(),
                        edits: vec![edit("a/A.java", "User", "Customer")],
                    },
                ],
                vec![],
            );
            assert_eq!(response.files[0].file, "a/A.java");
            assert_eq!(response.summary.files_changed, 2);
        }

        #[test]
        fn entity_info_null_id_field() {
            let response = EntityInfoResponse::new("Dog.java", "Dog", "zoo", None, None);
            let parsed: serde_json::Value = serde_json::to_value(&response).unwrap();
            assert!(parsed["id_field"].is_null());
            assert!(parsed.get("unresolved_superclass").is_none());
        }

        #[test]
        fn repository_response_shapes() {
            let created = RepositoryResponse::created(
                "shop/TagRepository.java",
                RepositoryInfo {
                    name: "TagRepository".to_string(),
                    entity_type: "Tag".to_string(),
                    id_type: "Long".to_string(),
                    package: "shop".to_string(),
                },
            );
            let parsed: serde_json::Value = serde_json::to_value(&created).unwrap();
            assert_eq!(parsed["requires_symbol_source"], false);
            assert_eq!(parsed["repository"]["id_type"], "Long");
            assert!(parsed.get("symbol").is_none());

            let pending = RepositoryResponse::requires_symbol_source("Tag.java", "Auditable");
            let parsed: serde_json::Value = serde_json::to_value(&pending).unwrap();
            assert_eq!(parsed["requires_symbol_source"], true);
            assert_eq!(parsed["symbol"], "Auditable");
            assert!(parsed.get("repository").is_none());
        }

        #[test]
        fn error_response_carries_code_and_location() {
            let err = PressoError::symbol_not_found("User.java", 3, 9);
            let response = ErrorResponse::from_error(&err);
            let parsed: serde_json::Value = serde_json::to_value(&response).unwrap();
            assert_eq!(parsed["status"], "error");
            assert_eq!(parsed["error"]["code"], 3);
            assert_eq!(parsed["error"]["location"]["line"], 3);
        }

        #[test]
        fn emit_response_produces_valid_json() {
            let response = FilesResponse::new(vec!["A.java".to_string()]);
            let mut out = Vec::new();
            emit_response(&response, &mut out).unwrap();
            let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
            assert_eq!(parsed["count"], 1);
        }
    }
}
