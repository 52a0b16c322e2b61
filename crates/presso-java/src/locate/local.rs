//! Local variable declarations.

use tree_sitter::Node;

use super::{accepts, CALLABLE_KINDS, MEMBER_SCOPES};
use crate::buffer::SourceBuffer;
use crate::declaration::{type_matches, Declaration, DeclarationKind};
use crate::syntax::{quote, SyntaxResult};

const BLOCK_KINDS: [&str; 6] = [
    "block",
    "constructor_body",
    "static_initializer",
    "switch_block",
    "switch_block_statement_group",
    "for_statement",
];

fn accepts_locals(scope: Node<'_>) -> bool {
    accepts(scope, &CALLABLE_KINDS) || accepts(scope, &BLOCK_KINDS) || accepts(scope, &MEMBER_SCOPES)
}

/// Every local variable declared inside `scope`, one entry per declarator.
pub fn all_locals<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
) -> SyntaxResult<Vec<Declaration<'t>>> {
    if !accepts_locals(scope) {
        return Ok(Vec::new());
    }
    let result = buffer
        .query("(local_variable_declaration declarator: (variable_declarator name: (identifier) @name))")
        .within(scope)
        .execute()?;
    Ok(result
        .nodes()
        .iter()
        .filter_map(|n| Declaration::for_name(*n))
        .collect())
}

/// First local named `name` inside `scope`.
pub fn find_local_by_name<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    name: &str,
) -> SyntaxResult<Option<Declaration<'t>>> {
    if !accepts_locals(scope) {
        return Ok(None);
    }
    let pattern = format!(
        "(local_variable_declaration declarator: (variable_declarator name: (identifier) @name (#eq? @name {})))",
        quote(name)
    );
    Ok(buffer
        .query(pattern)
        .within(scope)
        .execute()?
        .first_node()
        .and_then(Declaration::for_name))
}

/// Locals inside `scope` whose declared type matches `type_name`.
pub fn find_locals_by_type<'t>(
    buffer: &'t SourceBuffer,
    scope: Node<'t>,
    type_name: &str,
) -> SyntaxResult<Vec<Declaration<'t>>> {
    Ok(all_locals(buffer, scope)?
        .into_iter()
        .filter(|d| {
            d.type_node
                .is_some_and(|t| type_matches(buffer, t, type_name))
        })
        .collect())
}

/// Type node of a `new T(...)` initializer.
pub fn object_creation_type<'t>(declaration: &Declaration<'t>) -> Option<Node<'t>> {
    if !matches!(
        declaration.kind,
        DeclarationKind::LocalVariable | DeclarationKind::Field
    ) {
        return None;
    }
    let value = declaration.value?;
    if value.kind() != "object_creation_expression" {
        return None;
    }
    value.child_by_field_name("type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::method::find_method_by_name;

    const SOURCE: &str = r#"
class Service {
    void handle() {
        User user = new User("a");
        List<User> users = new ArrayList<>();
        int a = 1, b = 2;
        for (int i = 0; i < 3; i++) {
            String line = read();
        }
    }
}
"#;

    #[test]
    fn lists_locals_in_order() {
        let buffer = SourceBuffer::parse(SOURCE).unwrap();
        let method = find_method_by_name(&buffer, buffer.root(), "handle")
            .unwrap()
            .unwrap();
        let names: Vec<&str> = all_locals(&buffer, method)
            .unwrap()
            .iter()
            .filter_map(|d| d.name_text(&buffer))
            .collect();
        assert_eq!(names, vec!["user", "users", "a", "b", "i", "line"]);
    }

    #[test]
    fn finds_by_name_type_and_creation() {
        let buffer = SourceBuffer::parse(SOURCE).unwrap();
        let method = find_method_by_name(&buffer, buffer.root(), "handle")
            .unwrap()
            .unwrap();
        let b = find_local_by_name(&buffer, method, "b").unwrap().unwrap();
        assert_eq!(buffer.node_text(b.value.unwrap()), "2");

        let typed = find_locals_by_type(&buffer, method, "User").unwrap();
        assert_eq!(typed.len(), 2);

        let user = find_local_by_name(&buffer, method, "user").unwrap().unwrap();
        assert_eq!(buffer.node_text(object_creation_type(&user).unwrap()), "User");
        let users = find_local_by_name(&buffer, method, "users").unwrap().unwrap();
        assert_eq!(
            buffer.node_text(object_creation_type(&users).unwrap()),
            "ArrayList<>"
        );
        assert!(object_creation_type(&b).is_none());
    }

    #[test]
    fn wrong_scope_kind_is_empty() {
        let buffer = SourceBuffer::parse(SOURCE).unwrap();
        let ty = buffer
            .query("(integral_type) @t")
            .execute()
            .unwrap()
            .first_node()
            .unwrap();
        assert!(all_locals(&buffer, ty).unwrap().is_empty());
    }
}
