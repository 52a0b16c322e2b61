//! The `package` declaration.

use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::syntax::named_children;

/// The file's `package_declaration` node.
pub fn package_declaration(buffer: &SourceBuffer) -> Option<Node<'_>> {
    named_children(buffer.root())
        .into_iter()
        .find(|n| n.kind() == "package_declaration")
}

/// Dotted package name, e.g. `com.acme.model`.
pub fn package_name(buffer: &SourceBuffer) -> Option<String> {
    let declaration = package_declaration(buffer)?;
    named_children(declaration)
        .into_iter()
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
        .map(|n| buffer.node_text(n).to_string())
}
