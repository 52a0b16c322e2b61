//! Lexical scope and shadowing resolution.
//!
//! # Algorithm
//!
//! A declaration's scope is the smallest node where its name is visible:
//!
//! - local variable: the enclosing block (or the `for` statement for a loop
//!   initialiser, or the enhanced-for statement for its loop variable). A
//!   local declared in a `case` group stays visible in the later groups, so
//!   its scope is the whole `switch_block`
//! - formal parameter: the body of the owning method, constructor, lambda or
//!   catch clause
//! - field: the body of the owning class
//!
//! Usages are the identifiers inside that scope whose text equals the
//! declaration's name, minus:
//!
//! 1. the declaration's own name node
//! 2. identifiers in non-reference positions: declared names, method names,
//!    the member side of `a.b`, annotation keys, package and import paths
//! 3. for locals, identifiers positioned before the declaration
//! 4. identifiers bound by a nearer declaration of the same name, found by
//!    walking outward from the usage to the scope boundary
//!
//! # Limitations
//!
//! - No type information: `other.x` never counts as a usage of field `x`,
//!   and a method-local class that inherits a field named `x` is not seen.
//! - `this.x` has a different node shape and is reported separately by
//!   [`crate::locate::field::field_access_usages`].

use std::collections::HashSet;

use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::classify::classify;
use crate::declaration::{Declaration, DeclarationKind};
use crate::locate::field::field_access_usages;
use crate::syntax::{children_by_field, find_ancestor, named_children, quote, SyntaxResult};

const BLOCK_SCOPES: [&str; 4] = [
    "block",
    "constructor_body",
    "switch_block_statement_group",
    "switch_rule",
];

const CLASS_BODIES: [&str; 4] = [
    "class_body",
    "interface_body",
    "enum_body",
    "annotation_type_body",
];

// ============================================================================
// Scope Computation
// ============================================================================

/// The node within which `declaration`'s name is visible.
///
/// `None` when the declaration has no body to be visible in (a parameter
/// of an abstract method) or is an annotation.
pub fn scope_of<'t>(declaration: &Declaration<'t>) -> Option<Node<'t>> {
    let node = declaration.node;
    match declaration.kind {
        DeclarationKind::LocalVariable => match node.kind() {
            "enhanced_for_statement" => Some(node),
            _ => {
                let parent = node.parent()?;
                if parent.kind() == "for_statement" {
                    return Some(parent);
                }
                let block = find_ancestor(node, &BLOCK_SCOPES)?;
                if block.kind() == "switch_block_statement_group" {
                    block.parent()
                } else {
                    Some(block)
                }
            }
        },
        DeclarationKind::FormalParameter => match node.kind() {
            "catch_formal_parameter" => node.parent()?.child_by_field_name("body"),
            "lambda_expression" => node.child_by_field_name("body"),
            "inferred_parameters" => node.parent()?.child_by_field_name("body"),
            _ => {
                let callable = find_ancestor(node, &crate::locate::CALLABLE_KINDS)?;
                callable.child_by_field_name("body")
            }
        },
        DeclarationKind::Field => find_ancestor(node, &CLASS_BODIES),
        DeclarationKind::Class => match find_ancestor(node, &CLASS_BODIES) {
            Some(body) => Some(body),
            None => std::iter::successors(Some(node), |n| n.parent()).last(),
        },
        DeclarationKind::Import => std::iter::successors(Some(node), |n| n.parent()).last(),
        DeclarationKind::Annotation => None,
    }
}

// ============================================================================
// Usage Collection
// ============================================================================

/// Identifiers inside the declaration's scope that refer to it.
///
/// Returned in document order, never including the declaration's own name.
pub fn usages_of<'t>(
    buffer: &'t SourceBuffer,
    declaration: &Declaration<'t>,
) -> SyntaxResult<Vec<Node<'t>>> {
    let (Some(name_node), Some(scope)) = (declaration.name, scope_of(declaration)) else {
        return Ok(Vec::new());
    };
    if !matches!(
        declaration.kind,
        DeclarationKind::Field | DeclarationKind::FormalParameter | DeclarationKind::LocalVariable
    ) {
        return Ok(Vec::new());
    }
    let name = buffer.node_text(name_node);
    let pattern = format!("((identifier) @id (#eq? @id {}))", quote(name));
    let candidates = buffer.query(pattern).within(scope).execute()?;

    let usages = candidates
        .nodes()
        .iter()
        .copied()
        .filter(|n| n.id() != name_node.id())
        .filter(|n| is_reference(*n))
        .filter(|n| {
            declaration.kind != DeclarationKind::LocalVariable
                || n.start_byte() > name_node.start_byte()
        })
        .filter(|n| !is_shadowed(buffer, *n, name, scope))
        .collect();
    Ok(usages)
}

/// `this.<field>` accesses that refer to a field declaration.
///
/// Accesses inside nested or anonymous classes are excluded, since `this`
/// there is a different object.
pub fn this_field_usages<'t>(
    buffer: &'t SourceBuffer,
    declaration: &Declaration<'t>,
) -> SyntaxResult<Vec<Node<'t>>> {
    if declaration.kind != DeclarationKind::Field {
        return Ok(Vec::new());
    }
    let (Some(name_node), Some(body)) = (declaration.name, scope_of(declaration)) else {
        return Ok(Vec::new());
    };
    let name = buffer.node_text(name_node);
    Ok(field_access_usages(buffer, body, name)?
        .into_iter()
        .filter(|access| {
            find_ancestor(*access, &CLASS_BODIES).is_some_and(|b| b.id() == body.id())
        })
        .collect())
}

/// Type identifiers naming `class_name` anywhere under `scope`.
pub fn type_references<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    class_name: &str,
) -> SyntaxResult<Vec<Node<'t>>> {
    let pattern = format!("((type_identifier) @type (#eq? @type {}))", quote(class_name));
    Ok(buffer
        .query(pattern)
        .within(scope)
        .execute()?
        .nodes()
        .iter()
        .copied()
        .filter(|n| names_class(buffer, *n))
        .collect())
}

/// False for package segments of a qualified type (`acme` in `com.acme.User`).
///
/// Without type information a capitalised qualifier is taken to be an outer
/// class (`Outer` in `Outer.Inner`).
fn names_class(buffer: &SourceBuffer, node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    if parent.kind() != "scoped_type_identifier" {
        return true;
    }
    let is_last = named_children(parent)
        .last()
        .is_some_and(|last| last.id() == node.id());
    let parent_is_qualifier = parent
        .parent()
        .is_some_and(|p| p.kind() == "scoped_type_identifier");
    (is_last && !parent_is_qualifier)
        || buffer
            .node_text(node)
            .starts_with(|c: char| c.is_uppercase())
}

/// True if the identifier can refer to a variable.
pub fn is_reference(node: Node<'_>) -> bool {
    if classify(node).is_some() {
        return false;
    }
    let Some(parent) = node.parent() else {
        return true;
    };
    let is_field = |field: &str| {
        parent
            .child_by_field_name(field)
            .is_some_and(|n| n.id() == node.id())
    };
    match parent.kind() {
        "method_invocation" => !is_field("name"),
        "field_access" => !is_field("field"),
        "method_reference" => named_children(parent)
            .first()
            .is_some_and(|first| first.id() == node.id()),
        "element_value_pair" => !is_field("key"),
        "annotation" | "marker_annotation" => false,
        "scoped_identifier" | "package_declaration" | "import_declaration" => false,
        "enum_constant" => !is_field("name"),
        "labeled_statement" | "break_statement" | "continue_statement" => false,
        _ => true,
    }
}

// ============================================================================
// Shadowing
// ============================================================================

/// True if a declaration nearer than `scope` binds `name` at `usage`.
fn is_shadowed(buffer: &SourceBuffer, usage: Node<'_>, name: &str, scope: Node<'_>) -> bool {
    let position = usage.start_byte();
    let mut current = usage.parent();
    while let Some(ancestor) = current {
        if ancestor.id() == scope.id() {
            return false;
        }
        if binds_name(buffer, ancestor, name, position) {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

/// True if `node` introduces a binding of `name` visible at `position`.
fn binds_name(buffer: &SourceBuffer, node: Node<'_>, name: &str, position: usize) -> bool {
    let named = |n: Option<Node<'_>>| n.is_some_and(|n| buffer.node_text(n) == name);
    match node.kind() {
        "method_declaration"
        | "constructor_declaration"
        | "compact_constructor_declaration"
        | "lambda_expression" => callable_binds(buffer, node, name),
        "block" | "constructor_body" => locals_before(buffer, node, name, position),
        // Locals of earlier case groups are still in scope
        "switch_block" => named_children(node)
            .into_iter()
            .filter(|group| group.kind() == "switch_block_statement_group")
            .filter(|group| group.start_byte() < position)
            .any(|group| locals_before(buffer, group, name, position)),
        "for_statement" => children_by_field(node, "init")
            .into_iter()
            .filter(|init| init.kind() == "local_variable_declaration")
            .any(|init| declarators_bind(buffer, init, name)),
        "enhanced_for_statement" => named(node.child_by_field_name("name")),
        "catch_clause" => named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "catch_formal_parameter")
            .any(|p| named(p.child_by_field_name("name"))),
        kind if CLASS_BODIES.contains(&kind) => named_children(node)
            .into_iter()
            .filter(|member| member.kind() == "field_declaration")
            .any(|field| declarators_bind(buffer, field, name)),
        _ => false,
    }
}

/// True if a local declared directly in `block` before `position` binds `name`.
fn locals_before(buffer: &SourceBuffer, block: Node<'_>, name: &str, position: usize) -> bool {
    named_children(block)
        .into_iter()
        .filter(|stmt| stmt.kind() == "local_variable_declaration")
        .filter(|stmt| stmt.start_byte() < position)
        .any(|stmt| declarators_bind(buffer, stmt, name))
}

fn callable_binds(buffer: &SourceBuffer, callable: Node<'_>, name: &str) -> bool {
    let Some(parameters) = callable.child_by_field_name("parameters") else {
        return false;
    };
    if parameters.kind() == "identifier" {
        return buffer.node_text(parameters) == name;
    }
    named_children(parameters).into_iter().any(|param| {
        let name_node = match param.kind() {
            "formal_parameter" => param.child_by_field_name("name"),
            "spread_parameter" => named_children(param)
                .into_iter()
                .find(|c| c.kind() == "variable_declarator")
                .and_then(|d| d.child_by_field_name("name")),
            "identifier" => Some(param),
            _ => None,
        };
        name_node.is_some_and(|n| buffer.node_text(n) == name)
    })
}

fn declarators_bind(buffer: &SourceBuffer, declaration: Node<'_>, name: &str) -> bool {
    children_by_field(declaration, "declarator")
        .into_iter()
        .filter_map(|d| d.child_by_field_name("name"))
        .any(|n| buffer.node_text(n) == name)
}

/// Name node, declaration node and every usage, deduplicated by position.
pub fn reference_set<'t>(
    buffer: &'t SourceBuffer,
    declaration: &Declaration<'t>,
) -> SyntaxResult<Vec<Node<'t>>> {
    let mut nodes: Vec<Node<'t>> = declaration.name.into_iter().collect();
    nodes.extend(usages_of(buffer, declaration)?);
    nodes.extend(this_field_usages(buffer, declaration)?);
    let mut seen = HashSet::new();
    nodes.retain(|n| seen.insert((n.start_byte(), n.end_byte())));
    nodes.sort_by_key(|n| n.start_byte());
    Ok(nodes)
}

// ============================================================================
// Reference Resolution
// ============================================================================

/// Name positions of every variable-like binding: fields, locals, formal,
/// catch, loop and lambda parameters.
const BINDING_PATTERNS: [&str; 6] = [
    "(variable_declarator name: (identifier) @name",
    "(formal_parameter name: (identifier) @name",
    "(catch_formal_parameter name: (identifier) @name",
    "(enhanced_for_statement name: (identifier) @name",
    "(inferred_parameters (identifier) @name",
    "(lambda_expression parameters: (identifier) @name",
];

fn binding_pattern(name: Option<&str>) -> String {
    BINDING_PATTERNS
        .iter()
        .map(|pattern| match name {
            Some(name) => format!("{pattern} (#eq? @name {}))", quote(name)),
            None => format!("{pattern})"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every variable-like declaration under `scope`, in document order.
pub fn all_bindings<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
) -> SyntaxResult<Vec<Declaration<'t>>> {
    Ok(buffer
        .query(binding_pattern(None))
        .within(scope)
        .execute()?
        .nodes()
        .iter()
        .filter_map(|n| Declaration::for_name(*n))
        .collect())
}

/// The declaration an identifier refers to, if it is declared in this file.
///
/// A declared name resolves to its own declaration. A reference resolves to
/// the same-named declaration whose reference set contains it, which makes
/// the answer agree with [`usages_of`] on shadowing.
pub fn declaration_of<'t>(
    buffer: &'t SourceBuffer,
    identifier: Node<'t>,
) -> SyntaxResult<Option<Declaration<'t>>> {
    if identifier.kind() != "identifier" {
        return Ok(None);
    }
    if classify(identifier).is_some() {
        return Ok(Declaration::for_name(identifier));
    }
    let name = buffer.node_text(identifier);
    let candidates = buffer
        .query(binding_pattern(Some(name)))
        .execute()?
        .nodes()
        .to_vec();
    for candidate in candidates.into_iter().filter_map(Declaration::for_name) {
        if reference_set(buffer, &candidate)?
            .iter()
            .any(|n| n.id() == identifier.id())
        {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

// ============================================================================
// Tests
// ============================================================================
