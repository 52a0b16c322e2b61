//! Java file discovery.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::layout::{ProjectLayout, SourceSet};

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// File not found.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

/// Directory names never descended into.
const EXCLUDED_DIRS: [&str; 5] = ["target", "build", "out", "node_modules", "bin"];

// ============================================================================
// File Collection
// ============================================================================

/// Collect `.java` files under `dir`, sorted by path.
///
/// Hidden directories and build output (`target`, `build`, ...) are skipped.
/// A missing directory yields an empty list.
pub fn collect_java_files_under(dir: &Path) -> FileResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), entry.file_type().is_dir()));
    for entry in walker {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io_error) => FileError::Io(io_error),
            None => FileError::Io(io::Error::other("filesystem loop while walking sources")),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "java") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Collect `.java` files in the layout's source roots for `set`.
pub fn collect_java_files(layout: &ProjectLayout, set: SourceSet) -> FileResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in layout.source_roots(set) {
        files.extend(collect_java_files_under(&root)?);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Resolve a user-supplied path against the project root and check it exists.
pub fn resolve_file(layout: &ProjectLayout, path: &str) -> FileResult<PathBuf> {
    let candidate = Path::new(path);
    let resolved = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        layout.root().join(candidate)
    };
    if resolved.is_file() {
        Ok(resolved)
    } else {
        Err(FileError::NotFound {
            path: path.to_string(),
        })
    }
}

fn is_excluded(path: &Path, is_dir: bool) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    name.starts_with('.') || (is_dir && EXCLUDED_DIRS.contains(&name.as_ref()))
}
