//! CLI front door.
//!
//! One `run_*` function per subcommand. Each opens nothing but what it needs,
//! calls into `presso-java`, and returns a response ready for
//! [`emit_response`](presso_core::output::emit_response). Paths in responses
//! are relative to the workspace root.
//!
//! ## Error Handling
//!
//! All functions return `PressoResult<T>`. Errors from `presso-java` convert
//! through the bridges in `presso_java::error_bridges`, which keep the stable
//! error codes for JSON output.

use std::path::{Path, PathBuf};

use presso_core::config::Config;
use presso_core::error::{PressoError, PressoResult};
use presso_core::output::{
    CursorInfoResponse, EntityInfoResponse, FilesResponse, IdFieldInfo, InsertResponse,
    MainClassResponse, RenameResponse, RepositoryInfo, RepositoryResponse,
};
use presso_core::types::{EditRecord, Location};
use presso_java::buffer::SourceBuffer;
use presso_java::files::{collect_java_files, resolve_file};
use presso_java::insert::FieldInsertionPoint;
use presso_java::layout::{ProjectLayout, SourceSet};
use presso_java::ops::add::{add_field, add_import, add_wildcard_import, FieldSpec};
use presso_java::ops::cursor::cursor_info;
use presso_java::ops::entity::entity_info;
use presso_java::ops::main_class::find_main_class;
use presso_java::ops::rename::{rename_symbol, RenameOptions};
use presso_java::ops::repository::{create_jpa_repository, RepositoryOutcome};
use tracing::{debug, info};

use crate::error_bridges::with_file;

// ============================================================================
// Workspace
// ============================================================================

/// A project root with its configuration and source layout.
#[derive(Debug, Clone)]
pub struct Workspace {
    config: Config,
    layout: ProjectLayout,
}

impl Workspace {
    /// Open `root`, reading `.presso/config.toml` when present.
    pub fn open(root: impl Into<PathBuf>) -> PressoResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PressoError::invalid_args(format!(
                "workspace '{}' is not a directory",
                root.display()
            )));
        }
        let config = Config::load_from_project(&root)?;
        let layout = ProjectLayout::from_config(root, &config);
        debug!(root = %layout.root().display(), "opened workspace");
        Ok(Workspace { config, layout })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Resolve a user-supplied path, relative to the root or absolute.
    fn resolve(&self, path: &str) -> PressoResult<PathBuf> {
        Ok(resolve_file(&self.layout, path)?)
    }

    fn display(&self, path: &Path) -> String {
        self.layout.display_path(path)
    }

    /// Point edit records at the workspace-relative path.
    fn relabel(&self, path: &Path, mut records: Vec<EditRecord>) -> Vec<EditRecord> {
        let file = self.display(path);
        for record in &mut records {
            record.location.file = file.clone();
        }
        records
    }
}

/// Parse `path:line:col`.
fn parse_location(at: &str) -> PressoResult<Location> {
    Location::parse(at).ok_or_else(|| {
        PressoError::invalid_args(format!(
            "invalid location format '{}', expected path:line:col",
            at
        ))
    })
}

// ============================================================================
// Query Commands
// ============================================================================

/// Node and identifier kind at a cursor position.
pub fn run_cursor_info(workspace: &Workspace, at: &str) -> PressoResult<CursorInfoResponse> {
    let location = parse_location(at)?;
    let path = workspace.resolve(&location.file)?;
    let file = workspace.display(&path);
    let buffer = SourceBuffer::load(&path)?;
    let cursor = cursor_info(&buffer, location.line, location.col)
        .map_err(|e| with_file(e.into(), &file))?;
    Ok(CursorInfoResponse::new(
        file.clone(),
        cursor.node_kind.clone(),
        cursor.node_text.clone(),
        cursor.kind_label(),
        Location::with_span(file, cursor.line, cursor.col, cursor.span.start, cursor.span.end),
    ))
}

/// The public class declaring `main` under the main source root.
pub fn run_main_class(workspace: &Workspace) -> PressoResult<MainClassResponse> {
    let main = find_main_class(workspace.layout())?;
    Ok(MainClassResponse::new(
        workspace.display(&main.file),
        main.class_name,
        main.package.unwrap_or_default(),
    ))
}

/// Entity type and identity field of the public class in `file`.
pub fn run_entity_info(workspace: &Workspace, file: &str) -> PressoResult<EntityInfoResponse> {
    let path = workspace.resolve(file)?;
    let entity = entity_info(workspace.layout(), &path)?;
    let id_field = entity.id_field.map(|member| IdFieldInfo {
        name: member.name,
        type_name: member.type_text.unwrap_or_default(),
        declared_in: member.class_name,
        file: member
            .file
            .map(|p| workspace.display(&p))
            .unwrap_or_default(),
    });
    Ok(EntityInfoResponse::new(
        workspace.display(&entity.file),
        entity.entity_type,
        entity.package.unwrap_or_default(),
        id_field,
        entity.unresolved_superclass,
    ))
}

/// Write a Spring Data repository for the entity in `file`.
pub fn run_create_repository(
    workspace: &Workspace,
    file: &str,
) -> PressoResult<RepositoryResponse> {
    let path = workspace.resolve(file)?;
    Ok(match create_jpa_repository(workspace.layout(), &path)? {
        RepositoryOutcome::Created(repository) => RepositoryResponse::created(
            workspace.display(&repository.file),
            RepositoryInfo {
                name: repository.name,
                entity_type: repository.entity_type,
                id_type: repository.id_type,
                package: repository.package,
            },
        ),
        RepositoryOutcome::RequiresSymbolSource { symbol } => {
            debug!(symbol = %symbol, "repository needs the superclass source");
            RepositoryResponse::requires_symbol_source(workspace.display(&path), symbol)
        }
    })
}

/// Java files of the workspace.
pub fn run_files(workspace: &Workspace, set: SourceSet) -> PressoResult<FilesResponse> {
    let files = collect_java_files(workspace.layout(), set)?
        .iter()
        .map(|p| workspace.display(p))
        .collect();
    Ok(FilesResponse::new(files))
}

// ============================================================================
// Rewrite Commands
// ============================================================================

/// Rename the symbol at `at` to `to`.
///
/// `no_cascade` overrides the configured cascade setting.
pub fn run_rename(
    workspace: &Workspace,
    at: &str,
    to: &str,
    dry_run: bool,
    no_cascade: bool,
) -> PressoResult<RenameResponse> {
    let location = parse_location(at)?;
    let path = workspace.resolve(&location.file)?;
    let file = workspace.display(&path);
    let options = RenameOptions {
        cascade: workspace.config().rename.cascade && !no_cascade,
        dry_run,
    };
    let outcome = rename_symbol(
        workspace.layout(),
        &path,
        location.line,
        location.col,
        to,
        options,
    )
    .map_err(|e| with_file(e.into(), &file))?;
    info!(
        kind = %outcome.kind,
        from = %outcome.old_name,
        to = %outcome.new_name,
        dry_run,
        "rename complete"
    );
    Ok(RenameResponse::new(
        outcome.kind.as_str(),
        outcome.old_name,
        outcome.new_name,
        outcome.dry_run,
        outcome.files,
        outcome.renamed_files,
    ))
}

/// Add `import` (`a.b.C` or `a.b.*`) to `file` unless already covered.
pub fn run_add_import(
    workspace: &Workspace,
    file: &str,
    import: &str,
) -> PressoResult<InsertResponse> {
    let path = workspace.resolve(file)?;
    let mut buffer = SourceBuffer::load(&path)?;
    let records = match import.strip_suffix(".*") {
        Some(package) => add_wildcard_import(&mut buffer, package)?,
        None => {
            let (package, class_name) = import.rsplit_once('.').ok_or_else(|| {
                PressoError::invalid_args(format!(
                    "invalid import '{}', expected a qualified name",
                    import
                ))
            })?;
            add_import(&mut buffer, package, class_name)?
        }
    };
    finish_insert(workspace, &path, &buffer, records)
}

/// Add a field described by `spec` to class `class_name` in `file`.
pub fn run_add_field(
    workspace: &Workspace,
    file: &str,
    class_name: &str,
    spec: &FieldSpec,
) -> PressoResult<InsertResponse> {
    let path = workspace.resolve(file)?;
    let mut buffer = SourceBuffer::load(&path)?;
    let records = add_field(
        &mut buffer,
        class_name,
        spec,
        FieldInsertionPoint::default(),
        &workspace.config().format.indent,
    )?;
    finish_insert(workspace, &path, &buffer, records)
}

/// Save the buffer if anything was inserted and build the response.
fn finish_insert(
    workspace: &Workspace,
    path: &Path,
    buffer: &SourceBuffer,
    records: Vec<EditRecord>,
) -> PressoResult<InsertResponse> {
    let applied = !records.is_empty();
    if applied {
        buffer.save()?;
        info!(file = %path.display(), edits = records.len(), "wrote insertion");
    }
    Ok(InsertResponse::new(
        workspace.display(path),
        applied,
        workspace.relabel(path, records),
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace_with(files: &[(&str, &str)]) -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        for (path, content) in files {
            let full = temp.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let workspace = Workspace::open(temp.path()).unwrap();
        (temp, workspace)
    }

    #[test]
    fn config_overrides_layout() {
        let (_temp, workspace) = workspace_with(&[
            (".presso/config.toml", "[layout]\nmain_source_dir = \"java\"\n"),
            ("java/App.java", "public class App {}\n"),
        ]);
        let files = run_files(&workspace, SourceSet::Main).unwrap();
        assert_eq!(files.files, ["java/App.java"]);
    }

    #[test]
    fn bad_location_is_invalid_arguments() {
        let (_temp, workspace) = workspace_with(&[]);
        let err = run_cursor_info(&workspace, "App.java:x").unwrap_err();
        assert!(matches!(err, PressoError::InvalidArguments { .. }));
    }

    #[test]
    fn cursor_outside_file_reports_the_file() {
        let (_temp, workspace) =
            workspace_with(&[("src/main/java/App.java", "public class App {}\n")]);
        let err = run_cursor_info(&workspace, "src/main/java/App.java:9:1").unwrap_err();
        match err {
            PressoError::SymbolNotFound { file, line, col } => {
                assert_eq!(file, "src/main/java/App.java");
                assert_eq!((line, col), (9, 1));
            }
            other => panic!("expected SymbolNotFound, got {other:?}"),
        }
    }

    #[test]
    fn add_import_records_use_relative_paths() {
        let (temp, workspace) = workspace_with(&[(
            "src/main/java/App.java",
            "package app;\n\npublic class App {}\n",
        )]);
        let response =
            run_add_import(&workspace, "src/main/java/App.java", "java.util.List").unwrap();
        assert!(response.applied);
        assert_eq!(response.edits[0].location.file, "src/main/java/App.java");
        let text = fs::read_to_string(temp.path().join("src/main/java/App.java")).unwrap();
        assert_eq!(text, "package app;\n\nimport java.util.List;\n\npublic class App {}\n");

        let again =
            run_add_import(&workspace, "src/main/java/App.java", "java.util.List").unwrap();
        assert!(!again.applied);
    }
}
