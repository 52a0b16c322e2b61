//! Import declarations.

use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::declaration::import_path;
use crate::syntax::{child_of_kind, quote, SyntaxResult};

/// One `import` line.
#[derive(Debug, Clone)]
pub struct Import<'t> {
    pub node: Node<'t>,
    /// The dotted path node (`java.util.List`, or `java.util` for `java.util.*`).
    pub path_node: Node<'t>,
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

impl<'t> Import<'t> {
    fn from_node(buffer: &'t SourceBuffer, node: Node<'t>) -> Option<Self> {
        let path_node = import_path(node)?;
        let mut cursor = node.walk();
        let is_static = node.children(&mut cursor).any(|c| c.kind() == "static");
        Some(Import {
            node,
            path_node,
            path: buffer.node_text(path_node).to_string(),
            is_static,
            is_wildcard: child_of_kind(node, "asterisk").is_some(),
        })
    }

    /// Last path segment of a single-type import; `None` for wildcards.
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_wildcard {
            return None;
        }
        Some(self.path.rsplit('.').next().unwrap_or(&self.path))
    }

    /// The imported package: everything before the last segment, or the whole
    /// path for a wildcard.
    pub fn package(&self) -> &str {
        if self.is_wildcard {
            return &self.path;
        }
        self.path
            .rsplit_once('.')
            .map(|(package, _)| package)
            .unwrap_or_default()
    }
}

/// Every import of the file, in order.
pub fn all_imports(buffer: &SourceBuffer) -> SyntaxResult<Vec<Import<'_>>> {
    Ok(buffer
        .query("(import_declaration) @import")
        .execute()?
        .nodes()
        .iter()
        .filter_map(|n| Import::from_node(buffer, *n))
        .collect())
}

/// The single-type import whose last segment is `class_name`.
pub fn find_import_for_class<'t>(
    buffer: &'t SourceBuffer,
    class_name: &str,
) -> SyntaxResult<Option<Import<'t>>> {
    let pattern = format!(
        "(import_declaration (scoped_identifier name: (identifier) @name (#eq? @name {}))) @import",
        quote(class_name)
    );
    let result = buffer.query(pattern).returning("import").execute()?;
    Ok(result
        .nodes()
        .iter()
        .filter_map(|n| Import::from_node(buffer, *n))
        .find(|i| !i.is_static && !i.is_wildcard))
}

/// Wildcard imports (`import a.b.*;`), non-static.
pub fn wildcard_imports(buffer: &SourceBuffer) -> SyntaxResult<Vec<Import<'_>>> {
    Ok(all_imports(buffer)?
        .into_iter()
        .filter(|i| i.is_wildcard && !i.is_static)
        .collect())
}

/// True if `package.class_name` is imported exactly or by wildcard.
pub fn is_imported(buffer: &SourceBuffer, package: &str, class_name: &str) -> SyntaxResult<bool> {
    let full = format!("{package}.{class_name}");
    Ok(all_imports(buffer)?.iter().any(|i| {
        !i.is_static && ((i.is_wildcard && i.path == package) || (!i.is_wildcard && i.path == full))
    }))
}
