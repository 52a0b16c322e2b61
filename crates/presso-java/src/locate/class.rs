//! Class, interface, enum, record and annotation-type declarations.

use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::declaration::{Declaration, CLASS_LIKE_KINDS};
use crate::syntax::{named_children, quote, SyntaxResult};

/// One pattern per class-like kind, capturing `@class` and `@name`.
fn class_pattern(name: Option<&str>) -> String {
    CLASS_LIKE_KINDS
        .iter()
        .map(|kind| match name {
            Some(name) => format!(
                "({kind} name: (identifier) @name (#eq? @name {})) @class",
                quote(name)
            ),
            None => format!("({kind} name: (identifier) @name) @class"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every class-like declaration inside `scope`, outermost first.
pub fn all_classes<'t>(buffer: &'t SourceBuffer, scope: Node<'t>) -> SyntaxResult<Vec<Node<'t>>> {
    Ok(buffer
        .query(class_pattern(None))
        .within(scope)
        .returning("class")
        .execute()?
        .nodes()
        .to_vec())
}

/// First class-like declaration named `name` inside `scope`.
pub fn find_class_by_name<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    name: &str,
) -> SyntaxResult<Option<Node<'t>>> {
    Ok(buffer
        .query(class_pattern(Some(name)))
        .within(scope)
        .returning("class")
        .execute()?
        .first_node())
}

/// Top-level class-like declarations of the file.
pub fn top_level_classes(buffer: &SourceBuffer) -> Vec<Node<'_>> {
    named_children(buffer.root())
        .into_iter()
        .filter(|n| CLASS_LIKE_KINDS.contains(&n.kind()))
        .collect()
}

/// The file's public top-level class.
///
/// Prefers the one named after the file; a buffer without a path falls back
/// to the first public top-level class.
pub fn public_class(buffer: &SourceBuffer) -> Option<Node<'_>> {
    let public: Vec<Node<'_>> = top_level_classes(buffer)
        .into_iter()
        .filter(|class| {
            Declaration::from_node(*class).is_some_and(|d| d.has_modifier(buffer, "public"))
        })
        .collect();
    match buffer.file_stem() {
        Some(stem) => public
            .into_iter()
            .find(|class| class_name(buffer, *class) == Some(stem)),
        None => public.into_iter().next(),
    }
}

/// Simple name of a class-like declaration.
pub fn class_name<'b>(buffer: &'b SourceBuffer, class: Node<'_>) -> Option<&'b str> {
    if !CLASS_LIKE_KINDS.contains(&class.kind()) {
        return None;
    }
    class
        .child_by_field_name("name")
        .map(|n| buffer.node_text(n))
}

/// The type identifier after `extends`, with generic arguments stripped.
///
/// `class A extends Base<T>` yields the `Base` node; a qualified
/// `extends com.acme.Base` yields the whole scoped type.
pub fn superclass_name_node(class: Node<'_>) -> Option<Node<'_>> {
    if class.kind() != "class_declaration" {
        return None;
    }
    let superclass = class.child_by_field_name("superclass")?;
    let ty = named_children(superclass).into_iter().next()?;
    match ty.kind() {
        "type_identifier" | "scoped_type_identifier" => Some(ty),
        "generic_type" => named_children(ty)
            .into_iter()
            .find(|c| matches!(c.kind(), "type_identifier" | "scoped_type_identifier")),
        _ => None,
    }
}

/// Body node of a class-like declaration.
pub fn class_body(class: Node<'_>) -> Option<Node<'_>> {
    if !CLASS_LIKE_KINDS.contains(&class.kind()) {
        return None;
    }
    class.child_by_field_name("body")
}
