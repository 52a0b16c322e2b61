//! Annotations on declarations and their arguments.
//!
//! Annotation names match on their simple name, so `@Id` and
//! `@jakarta.persistence.Id` both answer to `"Id"`.

use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::syntax::{child_of_kind, named_children, SyntaxResult};

/// Annotations attached to `declaration`, in source order.
///
/// `declaration` is any node that may carry a `modifiers` list (class,
/// field, method, parameter, local). Anything else yields nothing.
pub fn all_annotations<'t>(
    buffer: &'t SourceBuffer,
    declaration: Node<'t>,
) -> SyntaxResult<Vec<Node<'t>>> {
    let Some(modifiers) = child_of_kind(declaration, "modifiers") else {
        return Ok(Vec::new());
    };
    let result = buffer
        .query("[(annotation) (marker_annotation)] @annotation")
        .within(modifiers)
        .execute()?;
    Ok(result
        .nodes()
        .iter()
        .copied()
        .filter(|a| a.parent().is_some_and(|p| p.id() == modifiers.id()))
        .collect())
}

/// Simple name of an annotation (`Table` for `@javax.persistence.Table`).
pub fn annotation_name<'b>(buffer: &'b SourceBuffer, annotation: Node<'_>) -> Option<&'b str> {
    if !matches!(annotation.kind(), "annotation" | "marker_annotation") {
        return None;
    }
    let name = annotation.child_by_field_name("name")?;
    let text = buffer.node_text(name);
    Some(text.rsplit('.').next().unwrap_or(text))
}

/// First annotation on `declaration` whose simple name is `name`.
pub fn find_annotation_by_name<'t>(
    buffer: &'t SourceBuffer,
    declaration: Node<'t>,
    name: &str,
) -> SyntaxResult<Option<Node<'t>>> {
    let simple = name.rsplit('.').next().unwrap_or(name);
    Ok(all_annotations(buffer, declaration)?
        .into_iter()
        .find(|a| annotation_name(buffer, *a) == Some(simple)))
}

/// True if `declaration` carries an annotation named `name`.
pub fn has_annotation(buffer: &SourceBuffer, declaration: Node<'_>, name: &str) -> SyntaxResult<bool> {
    Ok(find_annotation_by_name(buffer, declaration, name)?.is_some())
}

/// Arguments of an annotation as `(key, value node)` pairs in source order.
///
/// A single unnamed argument (`@Table("t")`) is reported under `value`.
pub fn annotation_arguments<'t>(
    buffer: &'t SourceBuffer,
    annotation: Node<'t>,
) -> Vec<(&'t str, Node<'t>)> {
    if annotation.kind() != "annotation" {
        return Vec::new();
    }
    let Some(arguments) = annotation.child_by_field_name("arguments") else {
        return Vec::new();
    };
    named_children(arguments)
        .into_iter()
        .filter(|c| !c.kind().ends_with("comment"))
        .filter_map(|c| {
            if c.kind() == "element_value_pair" {
                let key = c.child_by_field_name("key")?;
                let value = c.child_by_field_name("value")?;
                Some((buffer.node_text(key), value))
            } else {
                Some(("value", c))
            }
        })
        .collect()
}

/// Value node for `key`, if present.
pub fn annotation_value<'t>(
    buffer: &'t SourceBuffer,
    annotation: Node<'t>,
    key: &str,
) -> Option<Node<'t>> {
    annotation_arguments(buffer, annotation)
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, value)| value)
}
