//! Identifier classification from immediate structural context.
//!
//! The rule looks at the parent node only (plus the grandparent for
//! variable declarators): no symbol table, no lookahead into siblings, no
//! type resolution. An identifier that is not the name of a declaration is
//! unclassified.

use serde::Serialize;
use tree_sitter::Node;

use crate::declaration::CLASS_LIKE_KINDS;

/// Semantic kind of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    ClassName,
    MethodName,
    FieldName,
    FormalParameterName,
    LocalVariableName,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::ClassName => "class_name",
            IdentifierKind::MethodName => "method_name",
            IdentifierKind::FieldName => "field_name",
            IdentifierKind::FormalParameterName => "formal_parameter_name",
            IdentifierKind::LocalVariableName => "local_variable_name",
        }
    }
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an identifier node, or `None` if it names nothing.
pub fn classify(node: Node<'_>) -> Option<IdentifierKind> {
    if node.kind() != "identifier" {
        return None;
    }
    let parent = node.parent()?;
    let is_name = |owner: Node<'_>| {
        owner
            .child_by_field_name("name")
            .is_some_and(|n| n.id() == node.id())
    };
    match parent.kind() {
        kind if CLASS_LIKE_KINDS.contains(&kind) && is_name(parent) => {
            Some(IdentifierKind::ClassName)
        }
        "method_declaration" | "constructor_declaration" | "compact_constructor_declaration"
            if is_name(parent) =>
        {
            Some(IdentifierKind::MethodName)
        }
        "formal_parameter" | "catch_formal_parameter" if is_name(parent) => {
            Some(IdentifierKind::FormalParameterName)
        }
        "inferred_parameters" => Some(IdentifierKind::FormalParameterName),
        "lambda_expression"
            if parent
                .child_by_field_name("parameters")
                .is_some_and(|p| p.id() == node.id()) =>
        {
            Some(IdentifierKind::FormalParameterName)
        }
        "enhanced_for_statement" if is_name(parent) => Some(IdentifierKind::LocalVariableName),
        "variable_declarator" if is_name(parent) => match parent.parent()?.kind() {
            "field_declaration" => Some(IdentifierKind::FieldName),
            "spread_parameter" => Some(IdentifierKind::FormalParameterName),
            _ => Some(IdentifierKind::LocalVariableName),
        },
        _ => None,
    }
}
