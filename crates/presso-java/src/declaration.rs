//! Tagged view over every kind of Java binding site.
//!
//! A [`Declaration`] is built from a tree node with one switch over the node
//! kind. Components that do not apply to a kind (a class has no initializer,
//! an import has no type) are simply `None`.

use serde::Serialize;
use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::syntax::{child_of_kind, children_by_field, named_children};

/// The closed set of declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Class,
    Field,
    FormalParameter,
    LocalVariable,
    Import,
    Annotation,
}

impl DeclarationKind {
    /// Tree node kinds that introduce this kind of declaration.
    pub fn node_kinds(self) -> &'static [&'static str] {
        match self {
            DeclarationKind::Class => &CLASS_LIKE_KINDS,
            DeclarationKind::Field => &["field_declaration"],
            DeclarationKind::FormalParameter => &["formal_parameter", "spread_parameter"],
            DeclarationKind::LocalVariable => &["local_variable_declaration"],
            DeclarationKind::Import => &["import_declaration"],
            DeclarationKind::Annotation => &["annotation", "marker_annotation"],
        }
    }
}

/// Node kinds whose `name` is a type name.
pub const CLASS_LIKE_KINDS: [&str; 5] = [
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// A binding site and its structural components.
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'t> {
    pub kind: DeclarationKind,
    /// The declaring node (`field_declaration`, `formal_parameter`, ...).
    pub node: Node<'t>,
    /// For fields and locals, the `variable_declarator` that binds `name`.
    pub declarator: Option<Node<'t>>,
    pub name: Option<Node<'t>>,
    pub type_node: Option<Node<'t>>,
    /// Initializer for variables, argument list for annotations.
    pub value: Option<Node<'t>>,
    pub modifiers: Option<Node<'t>>,
}

/// Owned text of a declaration's components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclarationInfo {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_text: Option<String>,
    pub value: Option<String>,
    pub modifiers: Option<String>,
}

impl<'t> Declaration<'t> {
    /// Build a declaration from its declaring node.
    ///
    /// For multi-declarator fields and locals the first declarator is used.
    /// Returns `None` for nodes that declare nothing.
    pub fn from_node(node: Node<'t>) -> Option<Self> {
        let modifiers = child_of_kind(node, "modifiers");
        let declaration = match node.kind() {
            kind if CLASS_LIKE_KINDS.contains(&kind) => Declaration {
                kind: DeclarationKind::Class,
                node,
                declarator: None,
                name: node.child_by_field_name("name"),
                type_node: None,
                value: None,
                modifiers,
            },
            "field_declaration" | "local_variable_declaration" => {
                let declarator = children_by_field(node, "declarator").into_iter().next();
                Declaration {
                    kind: if node.kind() == "field_declaration" {
                        DeclarationKind::Field
                    } else {
                        DeclarationKind::LocalVariable
                    },
                    node,
                    declarator,
                    name: declarator.and_then(|d| d.child_by_field_name("name")),
                    type_node: node.child_by_field_name("type"),
                    value: declarator.and_then(|d| d.child_by_field_name("value")),
                    modifiers,
                }
            }
            "formal_parameter" => Declaration {
                kind: DeclarationKind::FormalParameter,
                node,
                declarator: None,
                name: node.child_by_field_name("name"),
                type_node: node.child_by_field_name("type"),
                value: None,
                modifiers,
            },
            "spread_parameter" => {
                let declarator = child_of_kind(node, "variable_declarator");
                Declaration {
                    kind: DeclarationKind::FormalParameter,
                    node,
                    declarator,
                    name: declarator.and_then(|d| d.child_by_field_name("name")),
                    type_node: named_children(node)
                        .into_iter()
                        .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator")),
                    value: None,
                    modifiers,
                }
            }
            "import_declaration" => {
                let path = import_path(node);
                let name = if child_of_kind(node, "asterisk").is_some() {
                    path
                } else {
                    path.map(|p| p.child_by_field_name("name").unwrap_or(p))
                };
                Declaration {
                    kind: DeclarationKind::Import,
                    node,
                    declarator: None,
                    name,
                    type_node: None,
                    value: None,
                    modifiers: None,
                }
            }
            "annotation" | "marker_annotation" => Declaration {
                kind: DeclarationKind::Annotation,
                node,
                declarator: None,
                name: node.child_by_field_name("name"),
                type_node: None,
                value: node.child_by_field_name("arguments"),
                modifiers: None,
            },
            _ => return None,
        };
        Some(declaration)
    }

    /// Build the declaration that binds `name_node`.
    ///
    /// Picks the right declarator of a multi-variable declaration
    /// (`int a, b;`).
    pub fn for_name(name_node: Node<'t>) -> Option<Self> {
        let parent = name_node.parent()?;
        if parent.kind() == "variable_declarator" {
            let owner = parent.parent()?;
            let mut declaration = Declaration::from_node(owner)?;
            declaration.declarator = Some(parent);
            declaration.name = Some(name_node);
            declaration.value = parent.child_by_field_name("value");
            return Some(declaration);
        }
        if parent.kind() == "catch_formal_parameter" {
            return Some(Declaration {
                kind: DeclarationKind::FormalParameter,
                node: parent,
                declarator: None,
                name: Some(name_node),
                type_node: child_of_kind(parent, "catch_type"),
                value: None,
                modifiers: child_of_kind(parent, "modifiers"),
            });
        }
        if parent.kind() == "enhanced_for_statement" {
            return Some(Declaration {
                kind: DeclarationKind::LocalVariable,
                node: parent,
                declarator: None,
                name: Some(name_node),
                type_node: parent.child_by_field_name("type"),
                value: parent.child_by_field_name("value"),
                modifiers: child_of_kind(parent, "modifiers"),
            });
        }
        let lambda_param = match parent.kind() {
            "inferred_parameters" => true,
            "lambda_expression" => parent
                .child_by_field_name("parameters")
                .is_some_and(|p| p.id() == name_node.id()),
            _ => false,
        };
        if lambda_param {
            return Some(Declaration {
                kind: DeclarationKind::FormalParameter,
                node: parent,
                declarator: None,
                name: Some(name_node),
                type_node: None,
                value: None,
                modifiers: None,
            });
        }
        let declaration = Declaration::from_node(parent)?;
        let same = declaration.name.is_some_and(|n| n.id() == name_node.id());
        same.then_some(declaration)
    }

    /// All declarations made by one declaring node (one per declarator).
    pub fn all_from_node(node: Node<'t>) -> Vec<Self> {
        match node.kind() {
            "field_declaration" | "local_variable_declaration" => {
                children_by_field(node, "declarator")
                    .into_iter()
                    .filter_map(|d| d.child_by_field_name("name"))
                    .filter_map(Declaration::for_name)
                    .collect()
            }
            _ => Declaration::from_node(node).into_iter().collect(),
        }
    }

    /// Declared name, or `None` if the node has no name.
    pub fn name_text<'b>(&self, buffer: &'b SourceBuffer) -> Option<&'b str> {
        self.name.map(|n| buffer.node_text(n))
    }

    /// The type node most useful for matching a class name: the first
    /// generic argument, else the base type, else the full type.
    pub fn class_type_node(&self) -> Option<Node<'t>> {
        let full = self.type_node?;
        let parts = type_parts(full);
        Some(parts.argument.or(parts.base).unwrap_or(full))
    }

    /// Owned text of name, type, value and modifiers.
    pub fn info(&self, buffer: &SourceBuffer) -> DeclarationInfo {
        let text = |n: Option<Node<'_>>| n.map(|n| buffer.node_text(n).to_string());
        DeclarationInfo {
            name: text(self.name),
            type_text: text(self.type_node),
            value: text(self.value),
            modifiers: text(self.modifiers),
        }
    }

    /// True if the modifiers list contains `keyword` (`public`, `static`, ...).
    pub fn has_modifier(&self, buffer: &SourceBuffer, keyword: &str) -> bool {
        let Some(modifiers) = self.modifiers else {
            return false;
        };
        let mut cursor = modifiers.walk();
        let found = modifiers
            .children(&mut cursor)
            .any(|c| buffer.node_text(c) == keyword);
        found
    }
}

/// Decomposition of a type node.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeParts<'t> {
    /// `List` in `List<User>`, `User` in `User`.
    pub base: Option<Node<'t>>,
    /// `User` in `List<User>`.
    pub argument: Option<Node<'t>>,
}

/// Split a type node into base type and first generic argument.
pub fn type_parts(type_node: Node<'_>) -> TypeParts<'_> {
    match type_node.kind() {
        "generic_type" => {
            let base = named_children(type_node)
                .into_iter()
                .find(|c| matches!(c.kind(), "type_identifier" | "scoped_type_identifier"));
            let argument = child_of_kind(type_node, "type_arguments")
                .and_then(|args| named_children(args).into_iter().next());
            TypeParts { base, argument }
        }
        "array_type" => match type_node.child_by_field_name("element") {
            Some(element) => type_parts(element),
            None => TypeParts::default(),
        },
        "type_identifier" | "scoped_type_identifier" => TypeParts {
            base: Some(type_node),
            argument: None,
        },
        _ => TypeParts::default(),
    }
}

/// True if the type node matches `type_name` by generic argument, base type
/// or full text, in that order.
pub fn type_matches(buffer: &SourceBuffer, type_node: Node<'_>, type_name: &str) -> bool {
    let parts = type_parts(type_node);
    [parts.argument, parts.base, Some(type_node)]
        .into_iter()
        .flatten()
        .any(|n| buffer.node_text(n) == type_name)
}

/// The dotted path of an import (`scoped_identifier` or `identifier`).
pub fn import_path(import: Node<'_>) -> Option<Node<'_>> {
    named_children(import)
        .into_iter()
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'t>(buffer: &'t SourceBuffer, pattern: &str) -> Node<'t> {
        buffer
            .query(pattern)
            .execute()
            .unwrap()
            .first_node()
            .unwrap()
    }

    #[test]
    fn field_components() {
        let buffer =
            SourceBuffer::parse("class A { private static List<User> users = new ArrayList<>(); }")
                .unwrap();
        let node = first(&buffer, "(field_declaration) @f");
        let decl = Declaration::from_node(node).unwrap();
        assert_eq!(decl.kind, DeclarationKind::Field);
        let info = decl.info(&buffer);
        assert_eq!(info.name.as_deref(), Some("users"));
        assert_eq!(info.type_text.as_deref(), Some("List<User>"));
        assert_eq!(info.value.as_deref(), Some("new ArrayList<>()"));
        assert_eq!(info.modifiers.as_deref(), Some("private static"));
        assert!(decl.has_modifier(&buffer, "static"));
        assert!(!decl.has_modifier(&buffer, "final"));
        assert_eq!(buffer.node_text(decl.class_type_node().unwrap()), "User");
    }

    #[test]
    fn absent_components_are_none() {
        let buffer = SourceBuffer::parse("class A { void m() { int x; } }").unwrap();
        let node = first(&buffer, "(local_variable_declaration) @l");
        let info = Declaration::from_node(node).unwrap().info(&buffer);
        assert_eq!(info.name.as_deref(), Some("x"));
        assert!(info.value.is_none());
        assert!(info.modifiers.is_none());
    }

    #[test]
    fn for_name_picks_declarator() {
        let buffer = SourceBuffer::parse("class A { int a = 1, b = 2; }").unwrap();
        let names = buffer
            .query("(variable_declarator name: (identifier) @n)")
            .execute()
            .unwrap();
        let second = result_node(&names, 1);
        let decl = Declaration::for_name(second).unwrap();
        assert_eq!(decl.name_text(&buffer), Some("b"));
        assert_eq!(buffer.node_text(decl.value.unwrap()), "2");

        let field = first(&buffer, "(field_declaration) @f");
        assert_eq!(Declaration::all_from_node(field).len(), 2);
    }

    fn result_node<'t>(result: &crate::syntax::QueryResult<'t>, i: usize) -> Node<'t> {
        result.nodes()[i]
    }

    #[test]
    fn imports_and_annotations() {
        let buffer = SourceBuffer::parse(
            "import java.util.List;\nimport java.util.*;\n@Table(name = \"t\") class A {}",
        )
        .unwrap();
        let imports = buffer.query("(import_declaration) @i").execute().unwrap();
        let single = Declaration::from_node(imports.nodes()[0]).unwrap();
        assert_eq!(single.name_text(&buffer), Some("List"));
        let wildcard = Declaration::from_node(imports.nodes()[1]).unwrap();
        assert_eq!(wildcard.name_text(&buffer), Some("java.util"));

        let annotation = Declaration::from_node(first(&buffer, "(annotation) @a")).unwrap();
        assert_eq!(annotation.kind, DeclarationKind::Annotation);
        assert_eq!(annotation.name_text(&buffer), Some("Table"));
        assert_eq!(buffer.node_text(annotation.value.unwrap()), "(name = \"t\")");
    }

    #[test]
    fn non_declarations_yield_none() {
        let buffer = SourceBuffer::parse("class A { void m() { run(); } }").unwrap();
        let call = first(&buffer, "(method_invocation) @c");
        assert!(Declaration::from_node(call).is_none());
    }

    #[test]
    fn type_matching_prefers_argument() {
        let buffer = SourceBuffer::parse("class A { Set<Role> roles; Role[] all; }").unwrap();
        let types = buffer
            .query("(field_declaration type: (_) @t)")
            .execute()
            .unwrap();
        assert!(type_matches(&buffer, types.nodes()[0], "Role"));
        assert!(type_matches(&buffer, types.nodes()[0], "Set"));
        assert!(type_matches(&buffer, types.nodes()[1], "Role"));
        assert!(!type_matches(&buffer, types.nodes()[1], "Set"));
    }
}
