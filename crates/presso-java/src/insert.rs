//! Structural insertion planning.
//!
//! Planners compute where new text goes and which line breaks surround it.
//! They never mutate a buffer: the result is an [`EditPrimitive`] that the
//! caller applies through [`SourceBuffer::apply_edits`].

use presso_core::edit::{detect_indentation, EditPrimitive};
use tree_sitter::Node;

use crate::buffer::SourceBuffer;
use crate::locate::annotation::all_annotations;
use crate::locate::class::class_body;
use crate::locate::import::all_imports;
use crate::locate::package::package_declaration;
use crate::syntax::{named_children, SyntaxResult};

/// Where new text goes relative to existing siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionStrategy {
    BeforeFirstSibling,
    AfterLastSibling,
    AtScopeStart,
}

/// Byte offset plus the line breaks the inserted text needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPlan {
    pub offset: usize,
    pub leading_break: bool,
    pub trailing_break: bool,
}

impl InsertionPlan {
    /// Surround `text` with the planned breaks.
    ///
    /// `indent` follows a leading break; `trailing_indent` follows a trailing
    /// one, so whatever comes after the insertion keeps its indentation.
    pub fn render(&self, text: &str, indent: &str, trailing_indent: &str) -> String {
        let mut rendered = String::new();
        if self.leading_break {
            rendered.push('\n');
            rendered.push_str(indent);
        }
        rendered.push_str(text);
        if self.trailing_break {
            rendered.push('\n');
            rendered.push_str(trailing_indent);
        }
        rendered
    }
}

/// Plan an insertion into `scope` given its existing `siblings`.
///
/// With no siblings, the text goes right after the scope's opening `{`, or
/// at the scope's start if it has none.
pub fn plan_insertion(
    scope: Node<'_>,
    siblings: &[Node<'_>],
    strategy: InsertionStrategy,
) -> InsertionPlan {
    match (strategy, siblings.first(), siblings.last()) {
        (InsertionStrategy::BeforeFirstSibling, Some(first), _) => InsertionPlan {
            offset: first.start_byte(),
            leading_break: false,
            trailing_break: true,
        },
        (InsertionStrategy::AfterLastSibling, _, Some(last)) => InsertionPlan {
            offset: last.end_byte(),
            leading_break: true,
            trailing_break: false,
        },
        _ => plan_at_scope_start(scope, !siblings.is_empty()),
    }
}

fn plan_at_scope_start(scope: Node<'_>, has_siblings: bool) -> InsertionPlan {
    let mut cursor = scope.walk();
    let delimiters: Vec<Node<'_>> = scope
        .children(&mut cursor)
        .filter(|c| matches!(c.kind(), "{" | "}"))
        .collect();
    let Some(open) = delimiters.first().filter(|d| d.kind() == "{") else {
        return InsertionPlan {
            offset: scope.start_byte(),
            leading_break: false,
            trailing_break: true,
        };
    };
    // `{}` on one line needs a break before the closing brace.
    let closes_on_same_line = delimiters
        .last()
        .filter(|d| d.kind() == "}")
        .is_some_and(|close| close.start_position().row == open.end_position().row);
    InsertionPlan {
        offset: open.end_byte(),
        leading_break: true,
        trailing_break: !has_siblings && closes_on_same_line,
    }
}

// ============================================================================
// Members
// ============================================================================

/// Where a new field goes inside a class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldInsertionPoint {
    /// After the last existing field, else at the start of the body.
    #[default]
    AfterLastField,
    /// Before the first member of any kind.
    BeforeFirstMember,
    /// Right after the opening brace.
    BodyStart,
}

/// Where a new annotation goes on a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationInsertionPoint {
    /// Before the existing annotations.
    BeforeFirstAnnotation,
    /// Directly above the declaration, after any existing annotations.
    #[default]
    AboveDeclaration,
}

/// Insertion of `member_text` into `class`'s body, or `None` if the node has
/// no body.
///
/// `default_indent` is used when no existing member shows the indentation.
pub fn plan_member(
    buffer: &SourceBuffer,
    class: Node<'_>,
    member_text: &str,
    point: FieldInsertionPoint,
    default_indent: &str,
) -> Option<EditPrimitive> {
    let body = class_body(class)?;
    let members: Vec<Node<'_>> = named_children(body)
        .into_iter()
        .filter(|m| !m.kind().ends_with("comment"))
        .collect();
    let (siblings, strategy) = match point {
        FieldInsertionPoint::AfterLastField => (
            members
                .iter()
                .copied()
                .filter(|m| m.kind() == "field_declaration")
                .collect::<Vec<_>>(),
            InsertionStrategy::AfterLastSibling,
        ),
        FieldInsertionPoint::BeforeFirstMember => {
            (members.clone(), InsertionStrategy::BeforeFirstSibling)
        }
        FieldInsertionPoint::BodyStart => (members.clone(), InsertionStrategy::AtScopeStart),
    };
    let plan = plan_insertion(body, &siblings, strategy);

    let text = buffer.text();
    let class_indent = detect_indentation(text, class.start_byte());
    let member_indent = match members.first() {
        Some(member) => detect_indentation(text, member.start_byte()).to_string(),
        None => format!("{class_indent}{default_indent}"),
    };
    let trailing_indent = if strategy == InsertionStrategy::BeforeFirstSibling && !siblings.is_empty() {
        member_indent.as_str()
    } else {
        class_indent
    };
    let rendered = plan.render(member_text, &member_indent, trailing_indent);
    Some(EditPrimitive::insert_at(plan.offset, rendered))
}

/// Insertion of `annotation_text` (e.g. `@Id`) on `declaration`.
pub fn plan_annotation(
    buffer: &SourceBuffer,
    declaration: Node<'_>,
    annotation_text: &str,
    point: AnnotationInsertionPoint,
) -> SyntaxResult<EditPrimitive> {
    let annotations = all_annotations(buffer, declaration)?;
    let strategy = match point {
        AnnotationInsertionPoint::BeforeFirstAnnotation => InsertionStrategy::BeforeFirstSibling,
        AnnotationInsertionPoint::AboveDeclaration => InsertionStrategy::AfterLastSibling,
    };
    let plan = plan_insertion(declaration, &annotations, strategy);
    let indent = detect_indentation(buffer.text(), declaration.start_byte());
    let rendered = plan.render(annotation_text, indent, indent);
    Ok(EditPrimitive::insert_at(plan.offset, rendered))
}

/// Insertion of `import <path>;` into the file header.
///
/// After the last import: `\nimport X;`. After the package declaration when
/// there are no imports: `\n\nimport X;`. Otherwise at the top: `import X;\n`.
pub fn plan_import(buffer: &SourceBuffer, path: &str) -> SyntaxResult<EditPrimitive> {
    let line = format!("import {path};");
    if let Some(last) = all_imports(buffer)?.last() {
        return Ok(EditPrimitive::insert_at(
            last.node.end_byte(),
            format!("\n{line}"),
        ));
    }
    if let Some(package) = package_declaration(buffer) {
        return Ok(EditPrimitive::insert_at(
            package.end_byte(),
            format!("\n\n{line}"),
        ));
    }
    Ok(EditPrimitive::insert_at(0, format!("{line}\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::class::find_class_by_name;
    use crate::locate::field::find_field_by_name;

    fn apply(buffer: &mut SourceBuffer, edit: EditPrimitive) -> String {
        buffer.apply_edits(vec![edit]).unwrap();
        buffer.text().to_string()
    }

    mod planner_tests {
        use super::*;

        #[test]
        fn strategies_against_siblings() {
            let buffer = SourceBuffer::parse("class A {\n    int x;\n    int y;\n}\n").unwrap();
            let class = find_class_by_name(&buffer, buffer.root(), "A").unwrap().unwrap();
            let body = class_body(class).unwrap();
            let fields = named_children(body);

            let before = plan_insertion(body, &fields, InsertionStrategy::BeforeFirstSibling);
            assert_eq!(before.offset, fields[0].start_byte());
            assert!(!before.leading_break && before.trailing_break);

            let after = plan_insertion(body, &fields, InsertionStrategy::AfterLastSibling);
            assert_eq!(after.offset, fields[1].end_byte());
            assert!(after.leading_break && !after.trailing_break);

            let start = plan_insertion(body, &fields, InsertionStrategy::AtScopeStart);
            assert_eq!(start.offset, body.start_byte() + 1);
            assert!(start.leading_break && !start.trailing_break);
        }

        #[test]
        fn empty_scope_falls_back_to_opening_brace() {
            let buffer = SourceBuffer::parse("class A {}").unwrap();
            let body = class_body(buffer.root().named_child(0).unwrap()).unwrap();
            for strategy in [
                InsertionStrategy::BeforeFirstSibling,
                InsertionStrategy::AfterLastSibling,
                InsertionStrategy::AtScopeStart,
            ] {
                let plan = plan_insertion(body, &[], strategy);
                assert_eq!(plan.offset, 9);
                assert!(plan.leading_break && plan.trailing_break);
            }
        }
    }

    mod member_tests {
        use super::*;

        #[test]
        fn field_after_last_field() {
            let mut buffer =
                SourceBuffer::parse("class A {\n    int x;\n\n    void m() {}\n}\n").unwrap();
            let class = buffer.root().named_child(0).unwrap();
            let edit = plan_member(&buffer, class, "int y;", FieldInsertionPoint::AfterLastField, "  ")
                .unwrap();
            assert_eq!(
                apply(&mut buffer, edit),
                "class A {\n    int x;\n    int y;\n\n    void m() {}\n}\n"
            );
        }

        #[test]
        fn field_into_empty_class_uses_default_indent() {
            let mut buffer = SourceBuffer::parse("class A {}\n").unwrap();
            let class = buffer.root().named_child(0).unwrap();
            let edit = plan_member(&buffer, class, "int y;", FieldInsertionPoint::AfterLastField, "    ")
                .unwrap();
            assert_eq!(apply(&mut buffer, edit), "class A {\n    int y;\n}\n");
        }

        #[test]
        fn field_before_first_member() {
            let mut buffer = SourceBuffer::parse("class A {\n  void m() {}\n}\n").unwrap();
            let class = buffer.root().named_child(0).unwrap();
            let edit = plan_member(&buffer, class, "int y;", FieldInsertionPoint::BeforeFirstMember, "    ")
                .unwrap();
            assert_eq!(apply(&mut buffer, edit), "class A {\n  int y;\n  void m() {}\n}\n");
        }
    }

    mod annotation_tests {
        use super::*;

        const SOURCE: &str = "class A {\n    @Column\n    private Long id;\n}\n";

        #[test]
        fn above_declaration_goes_after_existing_annotations() {
            let mut buffer = SourceBuffer::parse(SOURCE).unwrap();
            let field = find_field_by_name(&buffer, buffer.root(), "id").unwrap().unwrap();
            let edit =
                plan_annotation(&buffer, field.node, "@Id", AnnotationInsertionPoint::AboveDeclaration)
                    .unwrap();
            assert_eq!(
                apply(&mut buffer, edit),
                "class A {\n    @Column\n    @Id\n    private Long id;\n}\n"
            );
        }

        #[test]
        fn before_first_annotation() {
            let mut buffer = SourceBuffer::parse(SOURCE).unwrap();
            let field = find_field_by_name(&buffer, buffer.root(), "id").unwrap().unwrap();
            let edit = plan_annotation(
                &buffer,
                field.node,
                "@Id",
                AnnotationInsertionPoint::BeforeFirstAnnotation,
            )
            .unwrap();
            assert_eq!(
                apply(&mut buffer, edit),
                "class A {\n    @Id\n    @Column\n    private Long id;\n}\n"
            );
        }

        #[test]
        fn unannotated_declaration() {
            let mut buffer = SourceBuffer::parse("class A {\n    Long id;\n}\n").unwrap();
            let field = find_field_by_name(&buffer, buffer.root(), "id").unwrap().unwrap();
            let edit =
                plan_annotation(&buffer, field.node, "@Id", AnnotationInsertionPoint::AboveDeclaration)
                    .unwrap();
            assert_eq!(apply(&mut buffer, edit), "class A {\n    @Id\n    Long id;\n}\n");
        }
    }

    mod import_tests {
        use super::*;

        #[test]
        fn after_last_import() {
            let mut buffer =
                SourceBuffer::parse("package p;\n\nimport a.B;\n\nclass C {}\n").unwrap();
            let edit = plan_import(&buffer, "x.Y").unwrap();
            assert_eq!(
                apply(&mut buffer, edit),
                "package p;\n\nimport a.B;\nimport x.Y;\n\nclass C {}\n"
            );
        }

        #[test]
        fn after_package() {
            let mut buffer = SourceBuffer::parse("package p;\n\nclass C {}\n").unwrap();
            let edit = plan_import(&buffer, "x.Y").unwrap();
            assert_eq!(
                apply(&mut buffer, edit),
                "package p;\n\nimport x.Y;\n\nclass C {}\n"
            );
        }

        #[test]
        fn empty_header() {
            let mut buffer = SourceBuffer::parse("class C {}\n").unwrap();
            let edit = plan_import(&buffer, "x.Y").unwrap();
            assert_eq!(apply(&mut buffer, edit), "import x.Y;\nclass C {}\n");
        }
    }
}
