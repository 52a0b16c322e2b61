//! Formal parameters of methods, constructors and lambdas.

use tree_sitter::Node;

use super::{accepts, CALLABLE_KINDS};
use crate::buffer::SourceBuffer;
use crate::declaration::{type_matches, Declaration};
use crate::syntax::{named_children, SyntaxResult};

/// Parameters owned directly by `callable`, in declaration order.
///
/// Parameters of nested lambdas are not included.
pub fn all_parameters<'t>(
    buffer: &'t SourceBuffer,
    callable: Node<'t>,
) -> SyntaxResult<Vec<Declaration<'t>>> {
    if !accepts(callable, &CALLABLE_KINDS) {
        return Ok(Vec::new());
    }
    let Some(parameters) = callable.child_by_field_name("parameters") else {
        return Ok(Vec::new());
    };
    if parameters.kind() == "identifier" {
        return Ok(Declaration::for_name(parameters).into_iter().collect());
    }
    if parameters.kind() == "inferred_parameters" {
        return Ok(named_children(parameters)
            .into_iter()
            .filter_map(Declaration::for_name)
            .collect());
    }
    let result = buffer
        .query("[(formal_parameter) (spread_parameter)] @param")
        .within(parameters)
        .execute()?;
    Ok(result
        .nodes()
        .iter()
        .filter(|p| p.parent().is_some_and(|owner| owner.id() == parameters.id()))
        .filter_map(|p| Declaration::from_node(*p))
        .collect())
}

/// Parameter of `callable` named `name`.
pub fn find_parameter_by_name<'t>(
    buffer: &'t SourceBuffer,
    callable: Node<'t>,
    name: &str,
) -> SyntaxResult<Option<Declaration<'t>>> {
    Ok(all_parameters(buffer, callable)?
        .into_iter()
        .find(|p| p.name_text(buffer) == Some(name)))
}

/// Parameters of `callable` whose type matches `type_name`.
pub fn find_parameters_by_type<'t>(
    buffer: &'t SourceBuffer,
    callable: Node<'t>,
    type_name: &str,
) -> SyntaxResult<Vec<Declaration<'t>>> {
    Ok(all_parameters(buffer, callable)?
        .into_iter()
        .filter(|p| {
            p.type_node
                .is_some_and(|t| type_matches(buffer, t, type_name))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::method::find_method_by_name;

    #[test]
    fn lists_method_parameters() {
        let buffer = SourceBuffer::parse(
            "class A { void save(User user, List<Role> roles, String... tags) { run(x -> x); } }",
        )
        .unwrap();
        let method = find_method_by_name(&buffer, buffer.root(), "save")
            .unwrap()
            .unwrap();
        let params = all_parameters(&buffer, method).unwrap();
        let names: Vec<&str> = params.iter().filter_map(|p| p.name_text(&buffer)).collect();
        assert_eq!(names, vec!["user", "roles", "tags"]);

        let roles = find_parameter_by_name(&buffer, method, "roles").unwrap().unwrap();
        assert_eq!(buffer.node_text(roles.type_node.unwrap()), "List<Role>");
        assert_eq!(find_parameters_by_type(&buffer, method, "Role").unwrap().len(), 1);
        assert_eq!(find_parameters_by_type(&buffer, method, "User").unwrap().len(), 1);
    }

    #[test]
    fn lambda_parameters() {
        let buffer =
            SourceBuffer::parse("class A { void m() { f(x -> x); g((a, b) -> a); } }").unwrap();
        let lambdas = buffer.query("(lambda_expression) @l").execute().unwrap();
        let first = all_parameters(&buffer, lambdas.nodes()[0]).unwrap();
        assert_eq!(first[0].name_text(&buffer), Some("x"));
        let second = all_parameters(&buffer, lambdas.nodes()[1]).unwrap();
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn non_callable_is_empty() {
        let buffer = SourceBuffer::parse("class A { int x; }").unwrap();
        assert!(all_parameters(&buffer, buffer.root()).unwrap().is_empty());
        assert!(find_parameter_by_name(&buffer, buffer.root(), "x")
            .unwrap()
            .is_none());
    }
}
