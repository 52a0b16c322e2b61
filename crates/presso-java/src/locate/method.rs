//! Method and constructor declarations.

use tree_sitter::Node;

use super::{accepts, MEMBER_SCOPES};
use crate::buffer::SourceBuffer;
use crate::syntax::{child_of_kind, named_children, quote, SyntaxResult};

/// Every method declared inside `scope`, nested classes included.
pub fn all_methods<'t>(buffer: &'t SourceBuffer, scope: Node<'t>) -> SyntaxResult<Vec<Node<'t>>> {
    if !accepts(scope, &MEMBER_SCOPES) {
        return Ok(Vec::new());
    }
    Ok(buffer
        .query("(method_declaration) @method")
        .within(scope)
        .execute()?
        .nodes()
        .to_vec())
}

/// First method named `name` inside `scope`.
pub fn find_method_by_name<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    name: &str,
) -> SyntaxResult<Option<Node<'t>>> {
    if !accepts(scope, &MEMBER_SCOPES) {
        return Ok(None);
    }
    let pattern = format!(
        "(method_declaration name: (identifier) @name (#eq? @name {})) @method",
        quote(name)
    );
    Ok(buffer
        .query(pattern)
        .within(scope)
        .returning("method")
        .execute()?
        .first_node())
}

/// Constructors declared inside `scope`.
pub fn constructors<'t>(buffer: &'t SourceBuffer, scope: Node<'t>) -> SyntaxResult<Vec<Node<'t>>> {
    if !accepts(scope, &MEMBER_SCOPES) {
        return Ok(Vec::new());
    }
    Ok(buffer
        .query("[(constructor_declaration) (compact_constructor_declaration)] @ctor")
        .within(scope)
        .execute()?
        .nodes()
        .to_vec())
}

pub fn method_name<'b>(buffer: &'b SourceBuffer, method: Node<'_>) -> Option<&'b str> {
    if !matches!(method.kind(), "method_declaration" | "constructor_declaration") {
        return None;
    }
    method
        .child_by_field_name("name")
        .map(|n| buffer.node_text(n))
}

/// Body block of a method or constructor; `None` for abstract methods.
pub fn method_body(method: Node<'_>) -> Option<Node<'_>> {
    if !matches!(
        method.kind(),
        "method_declaration" | "constructor_declaration" | "compact_constructor_declaration"
    ) {
        return None;
    }
    method.child_by_field_name("body")
}

/// True for `public static void main(String[] args)` or the varargs form.
pub fn is_main_method(buffer: &SourceBuffer, method: Node<'_>) -> bool {
    if method.kind() != "method_declaration" || method_name(buffer, method) != Some("main") {
        return false;
    }
    let keywords = modifier_keywords(buffer, method);
    if !keywords.contains(&"public") || !keywords.contains(&"static") {
        return false;
    }
    if !matches!(method.child_by_field_name("type"), Some(t) if t.kind() == "void_type") {
        return false;
    }
    let Some(parameters) = method.child_by_field_name("parameters") else {
        return false;
    };
    let params = named_children(parameters);
    let [param] = params.as_slice() else {
        return false;
    };
    match param.kind() {
        "formal_parameter" => param.child_by_field_name("type").is_some_and(|t| {
            t.kind() == "array_type"
                && t.child_by_field_name("element")
                    .is_some_and(|e| buffer.node_text(e) == "String")
                && t.child_by_field_name("dimensions")
                    .is_some_and(|d| buffer.node_text(d).replace(char::is_whitespace, "") == "[]")
        }),
        "spread_parameter" => named_children(*param)
            .into_iter()
            .any(|c| c.kind() == "type_identifier" && buffer.node_text(c) == "String"),
        _ => false,
    }
}

/// Keyword and annotation texts in a member's `modifiers` node.
fn modifier_keywords<'b>(buffer: &'b SourceBuffer, member: Node<'_>) -> Vec<&'b str> {
    let Some(modifiers) = child_of_kind(member, "modifiers") else {
        return Vec::new();
    };
    let mut cursor = modifiers.walk();
    modifiers
        .children(&mut cursor)
        .map(|c| buffer.node_text(c))
        .collect()
}
