//! Java rename operation.
//!
//! Renames are planned as a set of [`EditPrimitive`]s against the current
//! text and applied in one batch, back to front:
//!
//! 1. Resolve the cursor to a target: a variable declaration (field,
//!    parameter, local) or a class
//! 2. Collect the declaration's name plus every reference (see
//!    [`crate::scope`])
//! 3. For classes, add constructors, type references, static accesses and
//!    the matching import, and cascade to variables named after the type
//!    (`User user` becomes `Customer customer`, `List<User> users` becomes
//!    `List<Customer> customers`)
//! 4. Apply, reparse, and (for project renames) write files and rename the
//!    public class's file
//!
//! Cascading is convention-based: a variable whose name does not follow the
//! camelCase or plural form of its type is left alone.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use presso_core::edit::EditPrimitive;
use presso_core::output::{FileEdits, FileRename};
use presso_core::patch::{ContentHash, Span};
use thiserror::Error;
use tracing::{debug, info, warn};
use tree_sitter::Node;

use super::edit_records;
use crate::buffer::{BufferError, SourceBuffer};
use crate::classify::{classify, IdentifierKind};
use crate::declaration::{type_parts, Declaration, DeclarationKind};
use crate::files::{collect_java_files, FileError};
use crate::inheritance::qualify_in_project;
use crate::layout::{ProjectLayout, SourceSet};
use crate::locate::class::{all_classes, class_name, public_class};
use crate::locate::import::{all_imports, is_imported};
use crate::locate::local::object_creation_type;
use crate::locate::method::constructors;
use crate::locate::package::package_name;
use crate::naming::{cascaded_name, is_collection_type, validate_identifier, NamingError};
use crate::scope::{all_bindings, declaration_of, reference_set, type_references};
use crate::syntax::{named_children, quote, span_of, SyntaxError, SyntaxResult};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during rename operations.
#[derive(Debug, Error)]
pub enum RenameError {
    /// Nothing at the given position.
    #[error("no symbol found at {line}:{col}")]
    SymbolNotFound { line: u32, col: u32 },

    /// The position holds something that cannot be renamed.
    #[error("'{text}' ({kind}) is not a renameable symbol")]
    NotRenameable { kind: String, text: String },

    /// Method renames need call-site resolution, which is not available.
    #[error("renaming a {kind} is not supported")]
    Unsupported { kind: IdentifierKind },

    /// The new name is not a legal Java identifier.
    #[error("invalid name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: NamingError,
    },

    /// The class is not declared where it was expected.
    #[error("class '{name}' not found in {file}")]
    ClassNotFound { name: String, file: String },

    /// A planned file changed on disk before it was written.
    #[error("file changed since the rename was planned: {path}")]
    ConcurrentModification { path: PathBuf },

    /// Buffer error.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// Query error.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// File discovery error.
    #[error(transparent)]
    File(#[from] FileError),
}

/// Result type for rename operations.
pub type RenameResult<T> = Result<T, RenameError>;

// ============================================================================
// Options and Targets
// ============================================================================

/// Rename behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOptions {
    /// Rename variables named after a renamed type.
    pub cascade: bool,
    /// Plan and report without writing anything.
    pub dry_run: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        RenameOptions {
            cascade: true,
            dry_run: false,
        }
    }
}

/// What a cursor position renames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameTarget {
    /// A field, parameter or local, identified by its declared name's span.
    Variable {
        kind: IdentifierKind,
        name: String,
        name_span: Span,
    },
    /// A class-like type, by simple name.
    Class { name: String },
}

impl RenameTarget {
    pub fn kind(&self) -> IdentifierKind {
        match self {
            RenameTarget::Variable { kind, .. } => *kind,
            RenameTarget::Class { .. } => IdentifierKind::ClassName,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RenameTarget::Variable { name, .. } | RenameTarget::Class { name } => name,
        }
    }
}

/// Resolve the identifier at a 1-indexed `line`/`col`.
///
/// Declared names dispatch on their [`IdentifierKind`]. References resolve to
/// their declaration in the same file; type identifiers and constructor names
/// target the class.
pub fn resolve_target(buffer: &SourceBuffer, line: u32, col: u32) -> RenameResult<RenameTarget> {
    let node = buffer
        .node_at(line, col)
        .ok_or(RenameError::SymbolNotFound { line, col })?;
    let text = buffer.node_text(node).to_string();
    match node.kind() {
        "type_identifier" => return Ok(RenameTarget::Class { name: text }),
        "identifier" => {}
        other => {
            return Err(RenameError::NotRenameable {
                kind: other.to_string(),
                text,
            })
        }
    }
    match classify(node) {
        Some(IdentifierKind::ClassName) => Ok(RenameTarget::Class { name: text }),
        Some(IdentifierKind::MethodName) => {
            let is_constructor = node.parent().is_some_and(|p| {
                matches!(
                    p.kind(),
                    "constructor_declaration" | "compact_constructor_declaration"
                )
            });
            if is_constructor {
                Ok(RenameTarget::Class { name: text })
            } else {
                Err(RenameError::Unsupported {
                    kind: IdentifierKind::MethodName,
                })
            }
        }
        Some(kind) => Ok(RenameTarget::Variable {
            kind,
            name: text,
            name_span: span_of(node),
        }),
        None => {
            let declaration =
                declaration_of(buffer, node)?.ok_or_else(|| RenameError::NotRenameable {
                    kind: "unresolved reference".to_string(),
                    text: text.clone(),
                })?;
            let name_node = declaration.name.ok_or_else(|| RenameError::NotRenameable {
                kind: "unnamed declaration".to_string(),
                text: text.clone(),
            })?;
            let kind = classify(name_node).unwrap_or(match declaration.kind {
                DeclarationKind::Field => IdentifierKind::FieldName,
                DeclarationKind::FormalParameter => IdentifierKind::FormalParameterName,
                _ => IdentifierKind::LocalVariableName,
            });
            Ok(RenameTarget::Variable {
                kind,
                name: text,
                name_span: span_of(name_node),
            })
        }
    }
}

fn check_name(new_name: &str) -> RenameResult<()> {
    validate_identifier(new_name).map_err(|source| RenameError::InvalidName {
        name: new_name.to_string(),
        source,
    })
}

// ============================================================================
// Planning
// ============================================================================

/// Replacement text per span. The first edit planned for a span wins.
#[derive(Debug, Default)]
struct EditSet {
    edits: BTreeMap<Span, String>,
}

impl EditSet {
    fn add(&mut self, node: Node<'_>, text: &str) {
        self.edits
            .entry(span_of(node))
            .or_insert_with(|| text.to_string());
    }

    fn into_edits(self) -> Vec<EditPrimitive> {
        self.edits
            .into_iter()
            .map(|(span, text)| EditPrimitive::replace(span, text))
            .collect()
    }
}

/// Edits renaming a variable declaration and every reference to it.
pub fn plan_variable_rename(
    buffer: &SourceBuffer,
    declaration: &Declaration<'_>,
    new_name: &str,
) -> SyntaxResult<Vec<EditPrimitive>> {
    let mut edits = EditSet::default();
    for node in reference_set(buffer, declaration)? {
        edits.add(node, new_name);
    }
    Ok(edits.into_edits())
}

/// A class rename within one file.
#[derive(Debug, Clone, Copy)]
pub struct TypeRename<'a> {
    pub old_name: &'a str,
    pub new_name: &'a str,
    /// Fully-qualified old name; single-type imports of it are rewritten.
    pub qualified: Option<&'a str>,
    pub cascade: bool,
}

/// Edits renaming a class throughout one buffer.
pub fn plan_type_rename(
    buffer: &SourceBuffer,
    rename: &TypeRename<'_>,
) -> SyntaxResult<Vec<EditPrimitive>> {
    let root = buffer.root();
    let mut edits = EditSet::default();

    for class in all_classes(buffer, root)? {
        if class_name(buffer, class) == Some(rename.old_name) {
            if let Some(name) = class.child_by_field_name("name") {
                edits.add(name, rename.new_name);
            }
        }
    }
    for constructor in constructors(buffer, root)? {
        if let Some(name) = constructor.child_by_field_name("name") {
            if buffer.node_text(name) == rename.old_name {
                edits.add(name, rename.new_name);
            }
        }
    }
    for reference in type_references(buffer, root, rename.old_name)? {
        edits.add(reference, rename.new_name);
    }
    for access in static_accesses(buffer, rename.old_name)? {
        edits.add(access, rename.new_name);
    }
    if let Some(qualified) = rename.qualified {
        for import in all_imports(buffer)? {
            if import.is_static || import.is_wildcard || import.path != qualified {
                continue;
            }
            if let Some(name) = import.path_node.child_by_field_name("name") {
                edits.add(name, rename.new_name);
            }
        }
    }

    if rename.cascade {
        for declaration in all_bindings(buffer, root)? {
            let Some(new_variable) = cascade_target(buffer, &declaration, rename) else {
                continue;
            };
            debug!(
                from = declaration.name_text(buffer).unwrap_or_default(),
                to = %new_variable,
                "cascading variable rename"
            );
            for node in reference_set(buffer, &declaration)? {
                edits.add(node, &new_variable);
            }
        }
    }
    Ok(edits.into_edits())
}

/// `User` in `User.find()`, `User.MAX` and `User::new`.
fn static_accesses<'t>(buffer: &'t SourceBuffer, class_name: &str) -> SyntaxResult<Vec<Node<'t>>> {
    let pattern = format!("((identifier) @id (#eq? @id {}))", quote(class_name));
    Ok(buffer
        .query(pattern)
        .execute()?
        .nodes()
        .iter()
        .copied()
        .filter(|node| {
            let Some(parent) = node.parent() else {
                return false;
            };
            let is_object = parent
                .child_by_field_name("object")
                .is_some_and(|object| object.id() == node.id());
            match parent.kind() {
                "method_invocation" | "field_access" => is_object,
                "method_reference" => named_children(parent)
                    .first()
                    .is_some_and(|first| first.id() == node.id()),
                _ => false,
            }
        })
        .collect())
}

/// New name for a variable declared with the renamed type, if its current
/// name follows the naming convention.
fn cascade_target(
    buffer: &SourceBuffer,
    declaration: &Declaration<'_>,
    rename: &TypeRename<'_>,
) -> Option<String> {
    let name = declaration.name_text(buffer)?;
    let mut type_node = declaration.type_node?;
    if buffer.node_text(type_node) == "var" {
        type_node = object_creation_type(declaration)?;
    }
    let is_collection = is_collection_type(buffer.node_text(type_node));
    let parts = type_parts(type_node);
    let class_node = if is_collection {
        parts.argument?
    } else {
        parts.base?
    };
    let class_text = buffer.node_text(class_node);
    if class_text.rsplit('.').next() != Some(rename.old_name) {
        return None;
    }
    let new_variable = cascaded_name(name, rename.old_name, rename.new_name, is_collection)?;
    validate_identifier(&new_variable).ok()?;
    Some(new_variable)
}

// ============================================================================
// In-Buffer Rename
// ============================================================================

/// Outcome of a rename applied to one buffer.
#[derive(Debug, Clone)]
pub struct BufferRename {
    pub kind: IdentifierKind,
    pub old_name: String,
    /// Edits as planned against the original text.
    pub edits: Vec<EditPrimitive>,
    /// Number of edits written to the buffer (0 for dry runs).
    pub applied: usize,
}

/// Rename the declaration whose name occupies `name_span`, with all its
/// references.
///
/// Class declarations are renamed with [`plan_type_rename`], cascading into
/// variables when `options.cascade` is set.
pub fn rename_declaration(
    buffer: &mut SourceBuffer,
    name_span: Span,
    new_name: &str,
    options: RenameOptions,
) -> RenameResult<BufferRename> {
    check_name(new_name)?;
    let (kind, old_name, edits) = {
        let node = buffer.node_for_span(name_span).ok_or_else(|| {
            RenameError::NotRenameable {
                kind: "span".to_string(),
                text: format!("{}..{}", name_span.start, name_span.end),
            }
        })?;
        let not_renameable = || RenameError::NotRenameable {
            kind: node.kind().to_string(),
            text: buffer.node_text(node).to_string(),
        };
        let declaration = Declaration::for_name(node).ok_or_else(not_renameable)?;
        let kind = classify(node).ok_or_else(not_renameable)?;
        let old_name = buffer.node_text(node);
        let edits = if declaration.kind == DeclarationKind::Class {
            plan_type_rename(
                buffer,
                &TypeRename {
                    old_name,
                    new_name,
                    qualified: None,
                    cascade: options.cascade,
                },
            )?
        } else {
            plan_variable_rename(buffer, &declaration, new_name)?
        };
        (kind, old_name.to_string(), edits)
    };
    let applied = if options.dry_run {
        0
    } else {
        buffer.apply_edits(edits.clone())?
    };
    Ok(BufferRename {
        kind,
        old_name,
        edits,
        applied,
    })
}

/// Classify the identifier at `line`/`col` and rename it within the buffer.
pub fn rename_at(
    buffer: &mut SourceBuffer,
    line: u32,
    col: u32,
    new_name: &str,
    options: RenameOptions,
) -> RenameResult<BufferRename> {
    check_name(new_name)?;
    let target = resolve_target(buffer, line, col)?;
    let edits = plan_target(buffer, &target, new_name, None, options.cascade)?;
    let applied = if options.dry_run {
        0
    } else {
        buffer.apply_edits(edits.clone())?
    };
    Ok(BufferRename {
        kind: target.kind(),
        old_name: target.name().to_string(),
        edits,
        applied,
    })
}

fn plan_target(
    buffer: &SourceBuffer,
    target: &RenameTarget,
    new_name: &str,
    qualified: Option<&str>,
    cascade: bool,
) -> RenameResult<Vec<EditPrimitive>> {
    match target {
        RenameTarget::Class { name } => Ok(plan_type_rename(
            buffer,
            &TypeRename {
                old_name: name,
                new_name,
                qualified,
                cascade,
            },
        )?),
        RenameTarget::Variable { name_span, name, .. } => {
            let declaration = buffer
                .node_for_span(*name_span)
                .and_then(Declaration::for_name)
                .ok_or_else(|| RenameError::NotRenameable {
                    kind: "variable".to_string(),
                    text: name.clone(),
                })?;
            Ok(plan_variable_rename(buffer, &declaration, new_name)?)
        }
    }
}

// ============================================================================
// Project Rename
// ============================================================================

/// Outcome of a rename across the project.
#[derive(Debug, Clone)]
pub struct ProjectRename {
    pub kind: IdentifierKind,
    pub old_name: String,
    pub new_name: String,
    pub dry_run: bool,
    /// Edits per file, paths relative to the project root.
    pub files: Vec<FileEdits>,
    pub renamed_files: Vec<FileRename>,
}

/// One file's planned edits.
struct FilePlan {
    buffer: SourceBuffer,
    path: PathBuf,
    hash: ContentHash,
    edits: Vec<EditPrimitive>,
}

/// Rename the symbol at `line`/`col` of `path`.
///
/// Variables are renamed within their file. Classes are renamed across the
/// project with [`rename_class_in_project`]; a cursor on a type reference
/// finds the declaring file through the file's imports and package.
pub fn rename_symbol(
    layout: &ProjectLayout,
    path: &Path,
    line: u32,
    col: u32,
    new_name: &str,
    options: RenameOptions,
) -> RenameResult<ProjectRename> {
    check_name(new_name)?;
    let mut buffer = SourceBuffer::load(path)?;
    let target = resolve_target(&buffer, line, col)?;

    if let RenameTarget::Class { name } = &target {
        let declared_here = all_classes(&buffer, buffer.root())?
            .iter()
            .any(|class| class_name(&buffer, *class) == Some(name.as_str()));
        let declaring_file = if declared_here {
            path.to_path_buf()
        } else {
            let fq_name = qualify_in_project(layout, &buffer, name)?
                .filter(|fq| layout.is_local(fq))
                .ok_or_else(|| RenameError::ClassNotFound {
                    name: name.clone(),
                    file: layout.display_path(path),
                })?;
            layout.source_file_for(&fq_name)
        };
        return rename_class_in_project(layout, &declaring_file, name, new_name, options);
    }

    let edits = plan_target(&buffer, &target, new_name, None, options.cascade)?;
    let label = layout.display_path(path);
    let records = edit_records(&buffer, &label, &edits);
    if !options.dry_run {
        buffer.apply_edits(edits)?;
        buffer.save()?;
        info!(file = %label, edits = records.len(), "renamed variable");
    }
    Ok(ProjectRename {
        kind: target.kind(),
        old_name: target.name().to_string(),
        new_name: new_name.to_string(),
        dry_run: options.dry_run,
        files: vec![FileEdits {
            file: label,
            edits: records,
        }],
        renamed_files: Vec::new(),
    })
}

/// Rename class `old_name`, declared in `declaring_file`, across the project.
///
/// The declaring file and files of the same package are always processed;
/// other files only when they import the class (explicitly or by wildcard)
/// or spell out its qualified name. Every file is planned before any is
/// written, and the declaring file is renamed when the class is its public
/// class.
pub fn rename_class_in_project(
    layout: &ProjectLayout,
    declaring_file: &Path,
    old_name: &str,
    new_name: &str,
    options: RenameOptions,
) -> RenameResult<ProjectRename> {
    check_name(new_name)?;
    let declaring = SourceBuffer::load(declaring_file)?;
    let declared = all_classes(&declaring, declaring.root())?
        .iter()
        .any(|class| class_name(&declaring, *class) == Some(old_name));
    if !declared {
        return Err(RenameError::ClassNotFound {
            name: old_name.to_string(),
            file: layout.display_path(declaring_file),
        });
    }
    let package = package_name(&declaring);
    let qualified = match &package {
        Some(package) => format!("{package}.{old_name}"),
        None => old_name.to_string(),
    };
    let file_rename = public_class(&declaring)
        .filter(|class| class_name(&declaring, *class) == Some(old_name))
        .map(|_| declaring_file.with_file_name(format!("{new_name}.java")));
    if let Some(target) = &file_rename {
        if target.exists() {
            return Err(BufferError::TargetExists {
                path: target.clone(),
            }
            .into());
        }
    }

    let rename = TypeRename {
        old_name,
        new_name,
        qualified: package.as_ref().map(|_| qualified.as_str()),
        cascade: options.cascade,
    };

    // Plan
    let mut plans = vec![plan_file(declaring, declaring_file, &rename)?];
    for path in collect_java_files(layout, SourceSet::All)? {
        if same_file(&path, declaring_file) {
            continue;
        }
        let buffer = match SourceBuffer::load(&path) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable source file");
                continue;
            }
        };
        if !refers_to_class(&buffer, package.as_deref(), &qualified, old_name)? {
            continue;
        }
        let plan = plan_file(buffer, &path, &rename)?;
        if !plan.edits.is_empty() {
            plans.push(plan);
        }
    }

    let files: Vec<FileEdits> = plans
        .iter()
        .filter(|plan| !plan.edits.is_empty())
        .map(|plan| FileEdits {
            file: layout.display_path(&plan.path),
            edits: edit_records(&plan.buffer, &layout.display_path(&plan.path), &plan.edits),
        })
        .collect();
    let renamed_files: Vec<FileRename> = file_rename
        .iter()
        .map(|to| FileRename {
            from: layout.display_path(declaring_file),
            to: layout.display_path(to),
        })
        .collect();

    if !options.dry_run {
        // Check
        for plan in &plans {
            let on_disk = fs::read(&plan.path).map_err(|source| BufferError::Read {
                path: plan.path.clone(),
                source,
            })?;
            if ContentHash::compute(&on_disk) != plan.hash {
                return Err(RenameError::ConcurrentModification {
                    path: plan.path.clone(),
                });
            }
        }
        // Write
        for plan in &mut plans {
            let edits = std::mem::take(&mut plan.edits);
            if edits.is_empty() {
                continue;
            }
            plan.buffer.apply_edits(edits)?;
            plan.buffer.save()?;
        }
        if file_rename.is_some() {
            plans[0].buffer.rename_file(new_name)?;
        }
        info!(
            from = old_name,
            to = new_name,
            files = files.len(),
            "renamed class across project"
        );
    }

    Ok(ProjectRename {
        kind: IdentifierKind::ClassName,
        old_name: old_name.to_string(),
        new_name: new_name.to_string(),
        dry_run: options.dry_run,
        files,
        renamed_files,
    })
}

fn plan_file(buffer: SourceBuffer, path: &Path, rename: &TypeRename<'_>) -> RenameResult<FilePlan> {
    let edits = plan_type_rename(&buffer, rename)?;
    debug!(path = %path.display(), edits = edits.len(), "planned class rename");
    Ok(FilePlan {
        hash: buffer.content_hash(),
        path: path.to_path_buf(),
        edits,
        buffer,
    })
}

/// True if `buffer` can see the class: same package, imported, or named by
/// its qualified name.
fn refers_to_class(
    buffer: &SourceBuffer,
    package: Option<&str>,
    qualified: &str,
    simple_name: &str,
) -> SyntaxResult<bool> {
    if !buffer.text().contains(simple_name) {
        return Ok(false);
    }
    if package_name(buffer).as_deref() == package {
        return Ok(true);
    }
    let Some(package) = package else {
        return Ok(false);
    };
    Ok(is_imported(buffer, package, simple_name)? || buffer.text().contains(qualified))
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    matches!((a.canonicalize(), b.canonicalize()), (Ok(x), Ok(y)) if x == y)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn position(source: &str, needle: &str) -> (u32, u32) {
        let offset = source.find(needle).unwrap();
        let (line, col) = presso_core::text::byte_offset_to_position(source, offset);
        (line, col)
    }

    mod variable_tests {
        use super::*;

        #[test]
        fn renames_field_with_this_access() {
            let source = "class Counter {\n    private int count;\n    void inc() { this.count = count + 1; }\n}\n";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let (line, col) = position(source, "count;");
            let outcome =
                rename_at(&mut buffer, line, col, "total", RenameOptions::default()).unwrap();
            assert_eq!(outcome.kind, IdentifierKind::FieldName);
            assert_eq!(outcome.applied, 3);
            assert_eq!(
                buffer.text(),
                "class Counter {\n    private int total;\n    void inc() { this.total = total + 1; }\n}\n"
            );
        }

        #[test]
        fn renames_from_a_reference() {
            let source = "class C {\n    void m(int size) {\n        print(size);\n    }\n}\n";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let (line, col) = position(source, "size);");
            let outcome =
                rename_at(&mut buffer, line, col, "length", RenameOptions::default()).unwrap();
            assert_eq!(outcome.kind, IdentifierKind::FormalParameterName);
            assert_eq!(
                buffer.text(),
                "class C {\n    void m(int length) {\n        print(length);\n    }\n}\n"
            );
        }

        #[test]
        fn case_group_local_renames_in_later_cases() {
            let source = "class C { void m(int k) { switch (k) { case 1: int y = 1; use(y); break; case 2: y = 2; use(y); break; } } }";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let (line, col) = position(source, "y = 1");
            rename_at(&mut buffer, line, col, "z", RenameOptions::default()).unwrap();
            assert_eq!(
                buffer.text(),
                "class C { void m(int k) { switch (k) { case 1: int z = 1; use(z); break; case 2: z = 2; use(z); break; } } }"
            );
        }

        #[test]
        fn field_rename_skips_case_group_local() {
            let source = "class C { int y; void m(int k) { switch (k) { case 1: int y = 1; break; case 2: y = 2; break; } } }";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let (line, col) = position(source, "y;");
            rename_at(&mut buffer, line, col, "w", RenameOptions::default()).unwrap();
            assert_eq!(
                buffer.text(),
                "class C { int w; void m(int k) { switch (k) { case 1: int y = 1; break; case 2: y = 2; break; } } }"
            );
        }

        #[test]
        fn shadowed_field_keeps_parameter_usages() {
            let source = "class C { int x; void m(int x) { print(x); } int g() { return x; } }";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let span = {
                let offset = source.find("x;").unwrap();
                Span::new(offset, offset + 1)
            };
            let outcome =
                rename_declaration(&mut buffer, span, "y", RenameOptions::default()).unwrap();
            assert_eq!(outcome.kind, IdentifierKind::FieldName);
            assert_eq!(outcome.applied, 2);
            assert_eq!(
                buffer.text(),
                "class C { int y; void m(int x) { print(x); } int g() { return y; } }"
            );
        }

        #[test]
        fn rejects_invalid_names_and_methods() {
            let source = "class C { void run() { int n = 1; } }";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let (line, col) = position(source, "n =");
            assert!(matches!(
                rename_at(&mut buffer, line, col, "class", RenameOptions::default()),
                Err(RenameError::InvalidName { .. })
            ));
            let (line, col) = position(source, "run");
            assert!(matches!(
                rename_at(&mut buffer, line, col, "go", RenameOptions::default()),
                Err(RenameError::Unsupported { .. })
            ));
            assert_eq!(buffer.text(), source);
        }

        #[test]
        fn dry_run_leaves_buffer_untouched() {
            let source = "class C { void m() { int n = 1; use(n); } }";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let (line, col) = position(source, "n =");
            let options = RenameOptions {
                dry_run: true,
                ..RenameOptions::default()
            };
            let outcome = rename_at(&mut buffer, line, col, "k", options).unwrap();
            assert_eq!(outcome.edits.len(), 2);
            assert_eq!(outcome.applied, 0);
            assert_eq!(buffer.text(), source);
        }
    }

    mod type_tests {
        use super::*;

        fn rename_type(source: &str, old_name: &str, new_name: &str, cascade: bool) -> String {
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let edits = plan_type_rename(
                &buffer,
                &TypeRename {
                    old_name,
                    new_name,
                    qualified: Some("com.acme.User"),
                    cascade,
                },
            )
            .unwrap();
            buffer.apply_edits(edits).unwrap();
            buffer.text().to_string()
        }

        #[test]
        fn cascades_to_conventional_names() {
            let source = r#"import com.acme.User;

class Service {
    private User user;
    private List<User> users;
    private User owner;

    Service(User user) {
        this.user = user;
    }

    String name() {
        var admin = new User();
        for (User u : users) { log(u); }
        return user.getName() + User.PREFIX;
    }
}
"#;
            let expected = r#"import com.acme.Customer;

class Service {
    private Customer customer;
    private List<Customer> customers;
    private Customer owner;

    Service(Customer customer) {
        this.customer = customer;
    }

    String name() {
        var admin = new Customer();
        for (Customer u : customers) { log(u); }
        return customer.getName() + Customer.PREFIX;
    }
}
"#;
            assert_eq!(rename_type(source, "User", "Customer", true), expected);
        }

        #[test]
        fn no_cascade_keeps_variable_names() {
            let source = "class A { User user; User make() { return new User(); } }";
            assert_eq!(
                rename_type(source, "User", "Member", false),
                "class A { Member user; Member make() { return new Member(); } }"
            );
        }

        #[test]
        fn renames_declaration_and_constructors() {
            let source = "public class User {\n    public User() {}\n    public User(String n) {}\n    static User of() { return new User(); }\n}\n";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let span = {
                let offset = source.find("User {").unwrap();
                Span::new(offset, offset + 4)
            };
            let outcome =
                rename_declaration(&mut buffer, span, "Account", RenameOptions::default()).unwrap();
            assert_eq!(outcome.kind, IdentifierKind::ClassName);
            assert_eq!(outcome.applied, 5);
            assert!(!buffer.text().contains("User"));
        }

        #[test]
        fn declaration_rename_honours_cascade_switch() {
            let source = "class User { User next; User copy() { User user = new User(); return user; } }";
            let span = {
                let offset = source.find("User {").unwrap();
                Span::new(offset, offset + 4)
            };

            let mut buffer = SourceBuffer::parse(source).unwrap();
            let options = RenameOptions {
                cascade: false,
                dry_run: false,
            };
            rename_declaration(&mut buffer, span, "Member", options).unwrap();
            assert_eq!(
                buffer.text(),
                "class Member { Member next; Member copy() { Member user = new Member(); return user; } }"
            );

            let mut buffer = SourceBuffer::parse(source).unwrap();
            rename_declaration(&mut buffer, span, "Member", RenameOptions::default()).unwrap();
            assert_eq!(
                buffer.text(),
                "class Member { Member next; Member copy() { Member member = new Member(); return member; } }"
            );
        }

        #[test]
        fn declaration_dry_run_leaves_buffer_alone() {
            let source = "class C { int count; int get() { return count; } }";
            let mut buffer = SourceBuffer::parse(source).unwrap();
            let offset = source.find("count;").unwrap();
            let options = RenameOptions {
                cascade: true,
                dry_run: true,
            };
            let outcome =
                rename_declaration(&mut buffer, Span::new(offset, offset + 5), "total", options)
                    .unwrap();
            assert_eq!(outcome.edits.len(), 2);
            assert_eq!(outcome.applied, 0);
            assert_eq!(buffer.text(), source);
        }

        #[test]
        fn var_locals_cascade_through_initializer() {
            let source = "class A { void m() { var user = new User(); user.save(); } }";
            assert_eq!(
                rename_type(source, "User", "Customer", true),
                "class A { void m() { var customer = new Customer(); customer.save(); } }"
            );
        }
    }
}
