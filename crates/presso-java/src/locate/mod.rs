//! Declaration locators.
//!
//! One module per declaration kind. Every locator is a pure query over a
//! [`SourceBuffer`](crate::buffer::SourceBuffer): it never mutates, and a
//! scope node of the wrong kind yields an empty result rather than an error.
//! "By name" lookups match exact, case-sensitive text and return the first
//! match in document order.
//!
//! Errors are reserved for query patterns that fail to compile.

pub mod annotation;
pub mod class;
pub mod field;
pub mod import;
pub mod local;
pub mod method;
pub mod package;
pub mod parameter;

use tree_sitter::Node;

/// Node kinds that can hold class members.
pub(crate) const MEMBER_SCOPES: [&str; 11] = [
    "program",
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
    "class_body",
    "interface_body",
    "enum_body",
    "enum_body_declarations",
    "annotation_type_body",
];

/// Node kinds that own formal parameters.
pub(crate) const CALLABLE_KINDS: [&str; 4] = [
    "method_declaration",
    "constructor_declaration",
    "compact_constructor_declaration",
    "lambda_expression",
];

/// True if `scope` is one of `kinds`.
pub(crate) fn accepts(scope: Node<'_>, kinds: &[&str]) -> bool {
    kinds.contains(&scope.kind())
}
