//! Cross-file inheritance resolution.
//!
//! Resolves `extends` clauses to fully-qualified names and walks the
//! superclass chain through the project's source files, looking for a member
//! that satisfies a predicate (typically "annotated `@Id`").
//!
//! # Resolution order
//!
//! A simple superclass name is qualified by, in order:
//!
//! 1. the name itself, if it already contains a `.`
//! 2. a single-type import whose last segment is the name
//! 3. `java.lang`, for the implicitly imported platform types
//! 4. the current file's package
//!
//! Wildcard imports only contribute a guess: `import com.acme.base.*;` turns
//! `Base` into `com.acme.base.Base` only when that file exists in the
//! project. They never produce an external link.
//!
//! # Failure
//!
//! Every way a walk can end without a match (no superclass, external class,
//! missing or unparsable file, a cycle) is a [`WalkStop`], never an error.
//! Errors are reserved for malformed query patterns.

use std::collections::HashSet;
use std::path::PathBuf;

use presso_core::patch::Span;
use tracing::{debug, warn};
use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::declaration::Declaration;
use crate::layout::ProjectLayout;
use crate::locate::annotation::annotation_name;
use crate::locate::class::{class_body, class_name, find_class_by_name, superclass_name_node};
use crate::locate::import::{find_import_for_class, wildcard_imports};
use crate::locate::package::package_name;
use crate::syntax::{named_children, span_of, SyntaxResult};

/// Package whose types are imported implicitly.
pub const PLATFORM_PACKAGE: &str = "java.lang";

/// Implicitly imported platform types recognised as superclasses.
pub const PLATFORM_TYPES: [&str; 10] = [
    "Object",
    "String",
    "Integer",
    "Long",
    "Double",
    "Float",
    "Boolean",
    "Character",
    "Byte",
    "Short",
];

// ============================================================================
// Types
// ============================================================================

/// One resolved `extends` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceLink {
    /// Simple name of the subclass.
    pub class_name: String,
    /// Fully-qualified name of the superclass.
    pub superclass: String,
    /// True if the superclass source exists in the project.
    pub local: bool,
    /// Expected source file of the superclass.
    pub path: PathBuf,
}

/// A member found by a hierarchy walk, detached from its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritedMember {
    /// File declaring the member; `None` for an in-memory buffer.
    pub file: Option<PathBuf>,
    /// Simple name of the declaring class.
    pub class_name: String,
    pub name: String,
    pub type_text: Option<String>,
    /// Span of the member's name in its file.
    pub span: Span,
}

/// Why a hierarchy walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStop {
    /// A member matched the predicate.
    Found,
    /// The last class has no `extends` clause.
    NoSuperclass,
    /// The superclass name could not be qualified.
    Unresolvable,
    /// The superclass is not part of the project.
    External,
    /// The superclass file exists but does not declare the class.
    ClassNotFound,
    /// The superclass file could not be read or parsed.
    LoadFailed,
    /// The chain revisits a class.
    Cycle,
}

/// Result of [`walk_hierarchy`].
#[derive(Debug, Clone)]
pub struct HierarchyWalk {
    pub links: Vec<InheritanceLink>,
    /// Number of superclass files loaded.
    pub loads: usize,
    pub member: Option<InheritedMember>,
    pub stop: WalkStop,
    /// Superclass name at which the walk gave up, for `Unresolvable`,
    /// `ClassNotFound` and `LoadFailed`.
    pub unresolved: Option<String>,
}

impl HierarchyWalk {
    fn new() -> Self {
        HierarchyWalk {
            links: Vec::new(),
            loads: 0,
            member: None,
            stop: WalkStop::NoSuperclass,
            unresolved: None,
        }
    }

    fn finish(mut self, stop: WalkStop) -> Self {
        self.stop = stop;
        self
    }
}

/// What inspecting one class produced.
enum ClassStep {
    Found(InheritedMember),
    Superclass { class_name: String, fq_name: String },
    Unresolvable(String),
    NoSuperclass,
}

// ============================================================================
// Name Resolution
// ============================================================================

/// Literal name after `extends`, without generic arguments.
pub fn superclass_name<'b>(buffer: &'b SourceBuffer, class: Node<'_>) -> Option<&'b str> {
    superclass_name_node(class).map(|n| buffer.node_text(n))
}

/// Fully-qualify `simple_name` as seen from `buffer`.
///
/// Returns `None` when the name is not imported, not a platform type, and
/// the file declares no package.
pub fn fully_qualify(buffer: &SourceBuffer, simple_name: &str) -> SyntaxResult<Option<String>> {
    if simple_name.contains('.') {
        return Ok(Some(simple_name.to_string()));
    }
    if let Some(import) = find_import_for_class(buffer, simple_name)? {
        return Ok(Some(import.path));
    }
    if PLATFORM_TYPES.contains(&simple_name) {
        return Ok(Some(format!("{PLATFORM_PACKAGE}.{simple_name}")));
    }
    Ok(package_name(buffer).map(|package| format!("{package}.{simple_name}")))
}

/// [`fully_qualify`], plus wildcard-import guesses confirmed against the
/// project's files.
pub fn qualify_in_project(
    layout: &ProjectLayout,
    buffer: &SourceBuffer,
    simple_name: &str,
) -> SyntaxResult<Option<String>> {
    let qualified = fully_qualify(buffer, simple_name)?;
    if qualified.as_deref().is_some_and(|fq| layout.is_local(fq)) || simple_name.contains('.') {
        return Ok(qualified);
    }
    for import in wildcard_imports(buffer)? {
        let guess = format!("{}.{simple_name}", import.package());
        if layout.is_local(&guess) {
            debug!(name = simple_name, resolved = %guess, "resolved through wildcard import");
            return Ok(Some(guess));
        }
    }
    Ok(qualified)
}

// ============================================================================
// Hierarchy Walk
// ============================================================================

/// Predicate matching fields annotated with `@<name>`.
pub fn annotated_with(name: &str) -> impl Fn(&SourceBuffer, &Declaration<'_>) -> bool + '_ {
    move |buffer, declaration| {
        declaration.modifiers.is_some_and(|modifiers| {
            named_children(modifiers)
                .into_iter()
                .any(|annotation| annotation_name(buffer, annotation) == Some(name))
        })
    }
}

/// Walk from `class` up its superclass chain until a field satisfies
/// `predicate`.
///
/// Only the fields declared directly in each class body are checked. Each
/// local superclass file is loaded at most once; external superclasses are
/// never inspected.
pub fn walk_hierarchy<F>(
    layout: &ProjectLayout,
    buffer: &SourceBuffer,
    class: Node<'_>,
    predicate: F,
) -> SyntaxResult<HierarchyWalk>
where
    F: Fn(&SourceBuffer, &Declaration<'_>) -> bool,
{
    let mut walk = HierarchyWalk::new();
    let mut visited = HashSet::new();
    if let Some(name) = class_name(buffer, class) {
        if let Some(fq_name) = fully_qualify(buffer, name)? {
            visited.insert(fq_name);
        }
    }

    let mut step = inspect_class(layout, buffer, class, &predicate)?;
    loop {
        let (class_name, fq_name) = match step {
            ClassStep::Found(member) => {
                walk.member = Some(member);
                return Ok(walk.finish(WalkStop::Found));
            }
            ClassStep::NoSuperclass => return Ok(walk.finish(WalkStop::NoSuperclass)),
            ClassStep::Unresolvable(name) => {
                debug!(superclass = %name, "superclass name could not be qualified");
                walk.unresolved = Some(name);
                return Ok(walk.finish(WalkStop::Unresolvable));
            }
            ClassStep::Superclass {
                class_name,
                fq_name,
            } => (class_name, fq_name),
        };

        let path = layout.source_file_for(&fq_name);
        let local = path.is_file();
        walk.links.push(InheritanceLink {
            class_name,
            superclass: fq_name.clone(),
            local,
            path: path.clone(),
        });
        if !local {
            debug!(superclass = %fq_name, "superclass is external, stopping");
            return Ok(walk.finish(WalkStop::External));
        }
        if !visited.insert(fq_name.clone()) {
            warn!(superclass = %fq_name, "inheritance cycle detected");
            return Ok(walk.finish(WalkStop::Cycle));
        }

        walk.loads += 1;
        let parent = match SourceBuffer::load(&path) {
            Ok(parent) => parent,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load superclass file");
                walk.unresolved = Some(fq_name);
                return Ok(walk.finish(WalkStop::LoadFailed));
            }
        };
        let simple = fq_name.rsplit('.').next().unwrap_or(&fq_name);
        let Some(parent_class) = find_class_by_name(&parent, parent.root(), simple)? else {
            warn!(path = %path.display(), class = simple, "superclass not declared in its file");
            walk.unresolved = Some(fq_name);
            return Ok(walk.finish(WalkStop::ClassNotFound));
        };
        step = inspect_class(layout, &parent, parent_class, &predicate)?;
    }
}

/// First field in `class` or its local superclasses satisfying `predicate`.
pub fn find_inherited_member<F>(
    layout: &ProjectLayout,
    buffer: &SourceBuffer,
    class: Node<'_>,
    predicate: F,
) -> SyntaxResult<Option<InheritedMember>>
where
    F: Fn(&SourceBuffer, &Declaration<'_>) -> bool,
{
    Ok(walk_hierarchy(layout, buffer, class, predicate)?.member)
}

fn inspect_class<F>(
    layout: &ProjectLayout,
    buffer: &SourceBuffer,
    class: Node<'_>,
    predicate: &F,
) -> SyntaxResult<ClassStep>
where
    F: Fn(&SourceBuffer, &Declaration<'_>) -> bool,
{
    let name = class_name(buffer, class).unwrap_or_default().to_string();
    if let Some(field) = direct_fields(class)
        .into_iter()
        .find(|field| predicate(buffer, field))
    {
        return Ok(ClassStep::Found(detach(buffer, &name, &field)));
    }
    let Some(superclass) = superclass_name(buffer, class) else {
        return Ok(ClassStep::NoSuperclass);
    };
    Ok(match qualify_in_project(layout, buffer, superclass)? {
        Some(fq_name) => ClassStep::Superclass {
            class_name: name,
            fq_name,
        },
        None => ClassStep::Unresolvable(superclass.to_string()),
    })
}

/// Fields declared directly in the class body, nested classes excluded.
fn direct_fields(class: Node<'_>) -> Vec<Declaration<'_>> {
    let Some(body) = class_body(class) else {
        return Vec::new();
    };
    named_children(body)
        .into_iter()
        .flat_map(|member| match member.kind() {
            "enum_body_declarations" => named_children(member),
            _ => vec![member],
        })
        .filter(|member| member.kind() == "field_declaration")
        .flat_map(Declaration::all_from_node)
        .collect()
}

fn detach(buffer: &SourceBuffer, class_name: &str, field: &Declaration<'_>) -> InheritedMember {
    let info = field.info(buffer);
    InheritedMember {
        file: buffer.path().map(|p| p.to_path_buf()),
        class_name: class_name.to_string(),
        name: info.name.unwrap_or_default(),
        type_text: info.type_text,
        span: field.name.map(span_of).unwrap_or_else(|| span_of(field.node)),
    }
}
