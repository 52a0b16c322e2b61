//! Syntax query facade over tree-sitter-java.
//!
//! Everything above this module talks to the parse tree through two things:
//! structural patterns run by [`SyntaxQuery`], and a handful of node helpers
//! (ancestor walks, named children, spans). Patterns use tree-sitter query
//! syntax; `#eq?` text predicates are evaluated by tree-sitter itself.
//!
//! # Example
//!
//! ```
//! use presso_java::buffer::SourceBuffer;
//!
//! let buffer = SourceBuffer::parse("class A { int x; int y; }").unwrap();
//! let result = buffer
//!     .query("(variable_declarator name: (identifier) @name)")
//!     .execute()
//!     .unwrap();
//! let names: Vec<&str> = result.nodes().iter().map(|n| buffer.node_text(*n)).collect();
//! assert_eq!(names, vec!["x", "y"]);
//! ```
//!
//! Results come back in document order, and `nodes()` never lists the same
//! node twice even when several matches capture it.

use std::collections::HashSet;

use presso_core::patch::Span;
use thiserror::Error;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by the query facade.
#[derive(Debug, Error)]
pub enum SyntaxError {
    /// The pattern does not compile against the Java grammar.
    #[error("invalid query pattern: {message}\n{pattern}")]
    InvalidQuery { pattern: String, message: String },

    /// `returning` named a capture the pattern does not define.
    #[error("unknown capture '@{capture}' in query")]
    UnknownCapture { capture: String },

    /// The grammar could not be loaded into the parser.
    #[error("failed to load Java grammar: {0}")]
    Language(String),

    /// The parser produced no tree.
    #[error("failed to parse source")]
    ParseFailed,
}

/// Result type for syntax operations.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

// ============================================================================
// Parsing
// ============================================================================

/// The tree-sitter Java grammar.
pub fn java_language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

/// Parse Java source into a fresh tree.
pub fn parse_java(source: &str) -> SyntaxResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&java_language())
        .map_err(|e| SyntaxError::Language(e.to_string()))?;
    parser.parse(source, None).ok_or(SyntaxError::ParseFailed)
}

/// Quote text for use as a string literal inside a query predicate.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

// ============================================================================
// Query Builder
// ============================================================================

/// The captures of one match, keyed by capture name.
#[derive(Debug, Clone, Default)]
pub struct Captures<'t> {
    entries: Vec<(String, Node<'t>)>,
}

impl<'t> Captures<'t> {
    /// First node captured under `name`.
    pub fn get(&self, name: &str) -> Option<Node<'t>> {
        self.entries
            .iter()
            .find(|(capture, _)| capture == name)
            .map(|(_, node)| *node)
    }

    /// Every node captured under `name` (quantified captures yield several).
    pub fn get_all(&self, name: &str) -> Vec<Node<'t>> {
        self.entries
            .iter()
            .filter(|(capture, _)| capture == name)
            .map(|(_, node)| *node)
            .collect()
    }

    /// True if `name` captured anything in this match.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All (capture name, node) pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Node<'t>)> + '_ {
        self.entries.iter().map(|(name, node)| (name.as_str(), *node))
    }

    fn first_start(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| node.start_byte())
            .min()
            .unwrap_or(0)
    }
}

/// A structural query under construction.
pub struct SyntaxQuery<'t> {
    source: &'t str,
    root: Node<'t>,
    pattern: String,
    within: Option<Node<'t>>,
    returning: Vec<String>,
}

impl<'t> SyntaxQuery<'t> {
    /// Start a query over the tree rooted at `root`.
    pub fn new(source: &'t str, root: Node<'t>, pattern: impl Into<String>) -> Self {
        SyntaxQuery {
            source,
            root,
            pattern: pattern.into(),
            within: None,
            returning: Vec::new(),
        }
    }

    /// Only match inside `node` (the node itself included).
    pub fn within(mut self, node: Node<'t>) -> Self {
        self.within = Some(node);
        self
    }

    /// Restrict `nodes()` to this capture. May be called repeatedly.
    pub fn returning(mut self, capture: &str) -> Self {
        self.returning.push(capture.to_string());
        self
    }

    /// Run the query.
    pub fn execute(self) -> SyntaxResult<QueryResult<'t>> {
        let query = Query::new(&java_language(), &self.pattern).map_err(|e| {
            SyntaxError::InvalidQuery {
                pattern: self.pattern.clone(),
                message: e.to_string(),
            }
        })?;
        let names = query.capture_names();
        if let Some(missing) = self.returning.iter().find(|r| !names.contains(&r.as_str())) {
            return Err(SyntaxError::UnknownCapture {
                capture: missing.clone(),
            });
        }

        let target = self.within.unwrap_or(self.root);
        let mut cursor = QueryCursor::new();
        let mut iter = cursor.matches(&query, target, self.source.as_bytes());
        let mut matches: Vec<Captures<'t>> = Vec::new();
        while let Some(query_match) = iter.next() {
            let entries = query_match
                .captures
                .iter()
                .map(|capture| {
                    let name = names
                        .get(capture.index as usize)
                        .copied()
                        .unwrap_or_default();
                    (name.to_string(), capture.node)
                })
                .collect();
            matches.push(Captures { entries });
        }
        matches.sort_by_key(|m| m.first_start());

        let mut seen = HashSet::new();
        let mut nodes: Vec<Node<'t>> = Vec::new();
        for m in &matches {
            for (name, node) in m.iter() {
                let wanted = self.returning.is_empty() || self.returning.iter().any(|r| r == name);
                if wanted && seen.insert(node.id()) {
                    nodes.push(node);
                }
            }
        }
        nodes.sort_by_key(|n| (n.start_byte(), std::cmp::Reverse(n.end_byte())));

        Ok(QueryResult { matches, nodes })
    }
}

/// Matches and flattened nodes of an executed query.
#[derive(Debug, Clone, Default)]
pub struct QueryResult<'t> {
    matches: Vec<Captures<'t>>,
    nodes: Vec<Node<'t>>,
}

impl<'t> QueryResult<'t> {
    /// Returned nodes, de-duplicated, in document order.
    pub fn nodes(&self) -> &[Node<'t>] {
        &self.nodes
    }

    /// Every match with all of its captures, in document order.
    pub fn matches(&self) -> &[Captures<'t>] {
        &self.matches
    }

    /// First returned node.
    pub fn first_node(&self) -> Option<Node<'t>> {
        self.nodes.first().copied()
    }

    /// Nodes captured as `capture` across all matches, de-duplicated.
    pub fn nodes_from(&self, capture: &str) -> Vec<Node<'t>> {
        let mut seen = HashSet::new();
        self.matches
            .iter()
            .flat_map(|m| m.get_all(capture))
            .filter(|node| seen.insert(node.id()))
            .collect()
    }

    /// First node captured as `capture`.
    pub fn first_node_from(&self, capture: &str) -> Option<Node<'t>> {
        self.matches.iter().find_map(|m| m.get(capture))
    }

    /// True if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

// ============================================================================
// Node Helpers
// ============================================================================

/// Byte span of a node.
pub fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// True if `inner` lies inside `outer` (inclusive of equal ranges).
pub fn is_within(inner: Node<'_>, outer: Node<'_>) -> bool {
    outer.start_byte() <= inner.start_byte() && inner.end_byte() <= outer.end_byte()
}

/// Same position and kind. Stable across separately parsed trees of the same text.
pub fn same_node(a: Node<'_>, b: Node<'_>) -> bool {
    a.start_byte() == b.start_byte() && a.end_byte() == b.end_byte() && a.kind() == b.kind()
}

/// Strict ancestors of `node`, innermost first.
pub fn ancestors<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    std::iter::successors(node.parent(), |n| n.parent())
}

/// Nearest strict ancestor whose kind is one of `kinds`.
pub fn find_ancestor<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    ancestors(node).find(|n| kinds.contains(&n.kind()))
}

/// Named children of `node`, in order.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Children assigned to `field`, in order (e.g. every `declarator`).
pub fn children_by_field<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// First named child of a given kind.
pub fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|c| c.kind() == kind)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SourceBuffer;

    const SOURCE: &str = r#"
package com.acme;

class Outer {
    int a;
    String b = "x";

    class Inner {
        int a;
    }
}
"#;

    mod query_tests {
        use super::*;

        #[test]
        fn eq_predicate_filters_by_text() {
            let buffer = SourceBuffer::parse(SOURCE).unwrap();
            let pattern = format!(
                "(variable_declarator name: (identifier) @name (#eq? @name {}))",
                quote("a")
            );
            let result = buffer.query(&pattern).execute().unwrap();
            assert_eq!(result.nodes().len(), 2);
            assert!(result.nodes()[0].start_byte() < result.nodes()[1].start_byte());
        }

        #[test]
        fn within_restricts_to_subtree() {
            let buffer = SourceBuffer::parse(SOURCE).unwrap();
            let inner = buffer
                .query("(class_declaration name: (identifier) @n (#eq? @n \"Inner\")) @c")
                .returning("c")
                .execute()
                .unwrap()
                .first_node()
                .unwrap();
            let result = buffer
                .query("(field_declaration) @f")
                .within(inner)
                .execute()
                .unwrap();
            assert_eq!(result.nodes().len(), 1);
        }

        #[test]
        fn returning_selects_capture() {
            let buffer = SourceBuffer::parse(SOURCE).unwrap();
            let result = buffer
                .query("(field_declaration type: (_) @type declarator: (variable_declarator name: (identifier) @name)) @field")
                .returning("type")
                .execute()
                .unwrap();
            let texts: Vec<&str> = result.nodes().iter().map(|n| buffer.node_text(*n)).collect();
            assert_eq!(texts, vec!["int", "String", "int"]);
            assert_eq!(result.nodes_from("name").len(), 3);
            assert_eq!(
                buffer.node_text(result.first_node_from("name").unwrap()),
                "a"
            );
        }

        #[test]
        fn invalid_pattern_is_an_error() {
            let buffer = SourceBuffer::parse(SOURCE).unwrap();
            let err = buffer.query("(no_such_node) @x").execute().unwrap_err();
            assert!(matches!(err, SyntaxError::InvalidQuery { .. }));
        }

        #[test]
        fn unknown_capture_is_an_error() {
            let buffer = SourceBuffer::parse(SOURCE).unwrap();
            let err = buffer
                .query("(field_declaration) @f")
                .returning("g")
                .execute()
                .unwrap_err();
            assert!(matches!(err, SyntaxError::UnknownCapture { .. }));
        }

        #[test]
        fn quote_escapes() {
            assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
        }
    }

    mod node_helper_tests {
        use super::*;

        #[test]
        fn ancestors_walk_outward() {
            let buffer = SourceBuffer::parse(SOURCE).unwrap();
            let offset = SOURCE.find("String").unwrap();
            let node = buffer.node_at_offset(offset).unwrap();
            let kinds: Vec<&str> = ancestors(node).map(|n| n.kind()).collect();
            assert!(kinds.contains(&"field_declaration"));
            assert!(kinds.contains(&"class_body"));
            assert_eq!(kinds.last(), Some(&"program"));
            assert!(find_ancestor(node, &["class_declaration"]).is_some());
        }

        #[test]
        fn within_and_same_node() {
            let buffer = SourceBuffer::parse(SOURCE).unwrap();
            let root = buffer.root();
            let class = child_of_kind(root, "class_declaration").unwrap();
            assert!(is_within(class, root));
            assert!(!is_within(root, class));
            assert!(same_node(class, class));
            assert_eq!(span_of(class).start, SOURCE.find("class Outer").unwrap());
        }
    }
}
