//! Code insertion: fields, annotations and imports.

use std::fmt;
use std::str::FromStr;

use presso_core::edit::EditPrimitive;
use presso_core::patch::Span;
use presso_core::types::EditRecord;
use thiserror::Error;
use tracing::debug;

use super::{buffer_label, edit_records};
use crate::buffer::{BufferError, SourceBuffer};
use crate::insert::{plan_annotation, plan_import, plan_member, AnnotationInsertionPoint, FieldInsertionPoint};
use crate::locate::annotation::find_annotation_by_name;
use crate::locate::class::{class_body, find_class_by_name};
use crate::locate::field::find_field_by_name;
use crate::locate::import::{all_imports, is_imported};
use crate::naming::{validate_identifier, NamingError};
use crate::syntax::{find_ancestor, SyntaxError};

/// Errors raised by insertion operations.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("class '{name}' not found")]
    ClassNotFound { name: String },

    #[error("no declaration at {start}..{end}")]
    DeclarationNotFound { start: usize, end: usize },

    #[error("field '{name}' already exists in class '{class}'")]
    DuplicateField { class: String, name: String },

    #[error("invalid name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: NamingError,
    },

    #[error("invalid import '{path}'")]
    InvalidImport { path: String },

    #[error("import '{path}' not found")]
    ImportNotFound { path: String },

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Result type for insertion operations.
pub type InsertResult<T> = Result<T, InsertError>;

// ============================================================================
// Fields
// ============================================================================

/// Access modifier of a generated member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Private,
    /// No modifier.
    Package,
}

impl Visibility {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Protected => Some("protected"),
            Visibility::Private => Some("private"),
            Visibility::Package => None,
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "private" => Ok(Visibility::Private),
            "package" | "" => Ok(Visibility::Package),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

/// A field to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub type_name: String,
    pub name: String,
    pub value: Option<String>,
}

impl FieldSpec {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        FieldSpec {
            visibility: Visibility::default(),
            is_static: false,
            is_final: false,
            type_name: type_name.into(),
            name: name.into(),
            value: None,
        }
    }
}

impl fmt::Display for FieldSpec {
    /// `<visibility> [static] [final] Type name [= value];`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.visibility.keyword());
        if self.is_static {
            parts.push("static");
        }
        if self.is_final {
            parts.push("final");
        }
        parts.push(&self.type_name);
        parts.push(&self.name);
        write!(f, "{}", parts.join(" "))?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        f.write_str(";")
    }
}

/// Add a field to the class named `class_name`.
///
/// Refuses to add a field whose name is already declared directly in that
/// class.
pub fn add_field(
    buffer: &mut SourceBuffer,
    class_name: &str,
    spec: &FieldSpec,
    point: FieldInsertionPoint,
    default_indent: &str,
) -> InsertResult<Vec<EditRecord>> {
    validate_identifier(&spec.name).map_err(|source| InsertError::InvalidName {
        name: spec.name.clone(),
        source,
    })?;
    let (edit, records) = {
        let class = find_class_by_name(buffer, buffer.root(), class_name)?.ok_or_else(|| {
            InsertError::ClassNotFound {
                name: class_name.to_string(),
            }
        })?;
        if let Some(body) = class_body(class) {
            let existing = find_field_by_name(buffer, body, &spec.name)?;
            let declared_here = existing.is_some_and(|field| {
                find_ancestor(field.node, &["class_body", "enum_body", "interface_body"])
                    .is_some_and(|owner| owner.id() == body.id())
            });
            if declared_here {
                return Err(InsertError::DuplicateField {
                    class: class_name.to_string(),
                    name: spec.name.clone(),
                });
            }
        }
        let edit = plan_member(buffer, class, &spec.to_string(), point, default_indent).ok_or_else(
            || InsertError::ClassNotFound {
                name: class_name.to_string(),
            },
        )?;
        let records = edit_records(buffer, &buffer_label(buffer), std::slice::from_ref(&edit));
        (edit, records)
    };
    buffer.apply_edits(vec![edit])?;
    debug!(class = class_name, field = %spec.name, "added field");
    Ok(records)
}

// ============================================================================
// Annotations
// ============================================================================

/// Add `annotation` (e.g. `@Id` or `@Table(name = "t")`) to the declaration
/// occupying `declaration_span`.
///
/// Returns no records when an annotation with the same simple name is
/// already present.
pub fn add_annotation(
    buffer: &mut SourceBuffer,
    declaration_span: Span,
    annotation: &str,
    point: AnnotationInsertionPoint,
) -> InsertResult<Vec<EditRecord>> {
    let text = if annotation.starts_with('@') {
        annotation.to_string()
    } else {
        format!("@{annotation}")
    };
    let simple = text[1..]
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    let (edit, records) = {
        let declaration = buffer.node_for_span(declaration_span).ok_or(
            InsertError::DeclarationNotFound {
                start: declaration_span.start,
                end: declaration_span.end,
            },
        )?;
        if find_annotation_by_name(buffer, declaration, &simple)?.is_some() {
            return Ok(Vec::new());
        }
        let edit = plan_annotation(buffer, declaration, &text, point)?;
        let records = edit_records(buffer, &buffer_label(buffer), std::slice::from_ref(&edit));
        (edit, records)
    };
    buffer.apply_edits(vec![edit])?;
    Ok(records)
}

// ============================================================================
// Imports
// ============================================================================

/// Import `package.class_name` unless it is already imported, exactly or by
/// wildcard.
pub fn add_import(
    buffer: &mut SourceBuffer,
    package: &str,
    class_name: &str,
) -> InsertResult<Vec<EditRecord>> {
    let path = format!("{package}.{class_name}");
    if package.is_empty() || validate_identifier(class_name).is_err() {
        return Err(InsertError::InvalidImport { path });
    }
    if is_imported(buffer, package, class_name)? {
        debug!(import = %path, "already imported");
        return Ok(Vec::new());
    }
    insert_import(buffer, &path)
}

/// Import `package.*` unless that wildcard is already present.
pub fn add_wildcard_import(buffer: &mut SourceBuffer, package: &str) -> InsertResult<Vec<EditRecord>> {
    if package.is_empty() {
        return Err(InsertError::InvalidImport {
            path: format!("{package}.*"),
        });
    }
    let present = all_imports(buffer)?
        .iter()
        .any(|i| i.is_wildcard && !i.is_static && i.path == package);
    if present {
        return Ok(Vec::new());
    }
    insert_import(buffer, &format!("{package}.*"))
}

/// Rewrite the single-type import `old_path` to `new_path`.
pub fn update_import(
    buffer: &mut SourceBuffer,
    old_path: &str,
    new_path: &str,
) -> InsertResult<Vec<EditRecord>> {
    let (edit, records) = {
        let import = all_imports(buffer)?
            .into_iter()
            .find(|i| !i.is_wildcard && i.path == old_path)
            .ok_or_else(|| InsertError::ImportNotFound {
                path: old_path.to_string(),
            })?;
        let edit = EditPrimitive::replace(
            Span::new(import.path_node.start_byte(), import.path_node.end_byte()),
            new_path,
        );
        let records = edit_records(buffer, &buffer_label(buffer), std::slice::from_ref(&edit));
        (edit, records)
    };
    buffer.apply_edits(vec![edit])?;
    Ok(records)
}

fn insert_import(buffer: &mut SourceBuffer, path: &str) -> InsertResult<Vec<EditRecord>> {
    let edit = plan_import(buffer, path)?;
    let records = edit_records(buffer, &buffer_label(buffer), std::slice::from_ref(&edit));
    buffer.apply_edits(vec![edit])?;
    debug!(import = path, "added import");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::span_of;

    mod field_tests {
        use super::*;

        #[test]
        fn renders_modifiers_in_order() {
            let mut spec = FieldSpec::new("Map<String, Long>", "CACHE");
            spec.visibility = Visibility::Public;
            spec.is_static = true;
            spec.is_final = true;
            spec.value = Some("new HashMap<>()".to_string());
            assert_eq!(
                spec.to_string(),
                "public static final Map<String, Long> CACHE = new HashMap<>();"
            );
            let mut plain = FieldSpec::new("int", "count");
            plain.visibility = Visibility::Package;
            assert_eq!(plain.to_string(), "int count;");
        }

        #[test]
        fn adds_after_last_field() {
            let mut buffer =
                SourceBuffer::parse("class Cart {\n    private int size;\n}\n").unwrap();
            let records = add_field(
                &mut buffer,
                "Cart",
                &FieldSpec::new("String", "owner"),
                FieldInsertionPoint::AfterLastField,
                "    ",
            )
            .unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].location.line, 2);
            assert_eq!(
                buffer.text(),
                "class Cart {\n    private int size;\n    private String owner;\n}\n"
            );
        }

        #[test]
        fn rejects_duplicates_and_bad_names() {
            let mut buffer = SourceBuffer::parse("class Cart { int size; }").unwrap();
            let err = add_field(
                &mut buffer,
                "Cart",
                &FieldSpec::new("long", "size"),
                FieldInsertionPoint::AfterLastField,
                "    ",
            )
            .unwrap_err();
            assert!(matches!(err, InsertError::DuplicateField { .. }));

            let err = add_field(
                &mut buffer,
                "Cart",
                &FieldSpec::new("long", "new"),
                FieldInsertionPoint::AfterLastField,
                "    ",
            )
            .unwrap_err();
            assert!(matches!(err, InsertError::InvalidName { .. }));

            let err = add_field(
                &mut buffer,
                "Basket",
                &FieldSpec::new("long", "total"),
                FieldInsertionPoint::AfterLastField,
                "    ",
            )
            .unwrap_err();
            assert!(matches!(err, InsertError::ClassNotFound { .. }));
        }

        #[test]
        fn nested_field_with_same_name_is_not_a_duplicate() {
            let mut buffer =
                SourceBuffer::parse("class Outer {\n    static class Inner { int size; }\n}\n")
                    .unwrap();
            add_field(
                &mut buffer,
                "Outer",
                &FieldSpec::new("int", "size"),
                FieldInsertionPoint::BodyStart,
                "    ",
            )
            .unwrap();
            assert!(buffer.text().contains("class Outer {\n    private int size;\n"));
        }
    }

    mod annotation_tests {
        use super::*;

        #[test]
        fn adds_once() {
            let mut buffer =
                SourceBuffer::parse("class E {\n    private Long id;\n}\n").unwrap();
            let span = {
                let field = find_field_by_name(&buffer, buffer.root(), "id").unwrap().unwrap();
                span_of(field.node)
            };
            let records =
                add_annotation(&mut buffer, span, "Id", AnnotationInsertionPoint::AboveDeclaration)
                    .unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(buffer.text(), "class E {\n    @Id\n    private Long id;\n}\n");

            let span = {
                let field = find_field_by_name(&buffer, buffer.root(), "id").unwrap().unwrap();
                span_of(field.node)
            };
            let again =
                add_annotation(&mut buffer, span, "@Id", AnnotationInsertionPoint::AboveDeclaration)
                    .unwrap();
            assert!(again.is_empty());
        }
    }

    mod import_tests {
        use super::*;

        #[test]
        fn skips_exact_and_wildcard_duplicates() {
            let mut buffer = SourceBuffer::parse(
                "package app;\n\nimport java.util.List;\nimport java.time.*;\n\nclass A {}\n",
            )
            .unwrap();
            assert!(add_import(&mut buffer, "java.util", "List").unwrap().is_empty());
            assert!(add_import(&mut buffer, "java.time", "Instant").unwrap().is_empty());
            assert!(add_wildcard_import(&mut buffer, "java.time").unwrap().is_empty());

            let records = add_import(&mut buffer, "java.util", "Map").unwrap();
            assert_eq!(records[0].new_text, "\nimport java.util.Map;");
            assert!(buffer
                .text()
                .contains("import java.time.*;\nimport java.util.Map;\n"));
        }

        #[test]
        fn update_rewrites_path() {
            let mut buffer =
                SourceBuffer::parse("import com.acme.User;\n\nclass A { User u; }\n").unwrap();
            update_import(&mut buffer, "com.acme.User", "com.acme.Customer").unwrap();
            assert!(buffer.text().starts_with("import com.acme.Customer;\n"));
            assert!(matches!(
                update_import(&mut buffer, "com.acme.User", "x.Y"),
                Err(InsertError::ImportNotFound { .. })
            ));
        }

        #[test]
        fn invalid_import() {
            let mut buffer = SourceBuffer::parse("class A {}").unwrap();
            assert!(matches!(
                add_import(&mut buffer, "", "A"),
                Err(InsertError::InvalidImport { .. })
            ));
        }
    }
}
