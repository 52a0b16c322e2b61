//! Java language support for presso.
//!
//! This crate provides Java-specific source intelligence on top of
//! tree-sitter. It includes:
//! - A query facade and parsed source buffers
//! - Declaration locators (classes, fields, methods, parameters, locals,
//!   imports, packages, annotations)
//! - Identifier classification and scope/shadowing resolution
//! - Cross-file superclass resolution
//! - Operations: rename with type-to-variable cascade, structural
//!   insertion, cursor info, entity and main-class lookup

pub mod buffer;
pub mod classify;
pub mod declaration;
pub mod error_bridges;
pub mod files;
pub mod inheritance;
pub mod insert;
pub mod layout;
pub mod locate;
pub mod naming;
pub mod ops;
pub mod scope;
pub mod syntax;

pub use buffer::{BufferError, SourceBuffer};
pub use classify::{classify, IdentifierKind};
pub use layout::{ProjectLayout, SourceSet};
