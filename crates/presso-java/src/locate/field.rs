//! Field declarations and `this.<field>` accesses.

use tree_sitter::Node;

use super::{accepts, MEMBER_SCOPES};
use crate::buffer::SourceBuffer;
use crate::declaration::{type_matches, Declaration};
use crate::syntax::{quote, SyntaxResult};

const FIELD_PATTERN: &str =
    "(field_declaration declarator: (variable_declarator name: (identifier) @name)) @field";

/// Every field declared inside `scope`, one entry per declarator.
pub fn all_fields<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
) -> SyntaxResult<Vec<Declaration<'t>>> {
    if !accepts(scope, &MEMBER_SCOPES) {
        return Ok(Vec::new());
    }
    let result = buffer.query(FIELD_PATTERN).within(scope).execute()?;
    Ok(result
        .nodes_from("name")
        .into_iter()
        .filter_map(Declaration::for_name)
        .collect())
}

/// First field named `name` inside `scope`.
pub fn find_field_by_name<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    name: &str,
) -> SyntaxResult<Option<Declaration<'t>>> {
    if !accepts(scope, &MEMBER_SCOPES) {
        return Ok(None);
    }
    let pattern = format!(
        "(field_declaration declarator: (variable_declarator name: (identifier) @name (#eq? @name {}))) @field",
        quote(name)
    );
    let result = buffer.query(pattern).within(scope).execute()?;
    Ok(result
        .first_node_from("name")
        .and_then(Declaration::for_name))
}

/// Fields whose type matches `type_name` (generic argument, base type or
/// full text).
pub fn find_fields_by_type<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    type_name: &str,
) -> SyntaxResult<Vec<Declaration<'t>>> {
    Ok(all_fields(buffer, scope)?
        .into_iter()
        .filter(|d| {
            d.type_node
                .is_some_and(|t| type_matches(buffer, t, type_name))
        })
        .collect())
}

/// Field names in `this.<name>` accesses inside `scope`.
///
/// These are the `field` side of a `field_access` whose object is `this`;
/// plain identifier usage collection never sees them.
pub fn field_access_usages<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    name: &str,
) -> SyntaxResult<Vec<Node<'t>>> {
    let pattern = format!(
        "(field_access object: (this) field: (identifier) @field (#eq? @field {}))",
        quote(name)
    );
    Ok(buffer
        .query(pattern)
        .within(scope)
        .returning("field")
        .execute()?
        .nodes()
        .to_vec())
}
