//! Spring Data repository generation for an entity.
//!
//! The id type comes from the entity's `@Id` field, which may be declared
//! on a local superclass. The repository is written next to the entity's
//! package under the main source root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::entity::entity_info;
use super::{OperationError, OperationResult};
use crate::buffer::{BufferError, SourceBuffer};
use crate::layout::ProjectLayout;

const PRIMITIVE_WRAPPERS: [(&str, &str); 8] = [
    ("boolean", "Boolean"),
    ("byte", "Byte"),
    ("char", "Character"),
    ("short", "Short"),
    ("int", "Integer"),
    ("long", "Long"),
    ("float", "Float"),
    ("double", "Double"),
];

/// A generated repository interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub file: PathBuf,
    pub name: String,
    pub entity_type: String,
    pub id_type: String,
    pub package: String,
}

/// Result of [`create_jpa_repository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Created(Repository),
    /// The `@Id` may live on a superclass that could not be followed;
    /// nothing was written.
    RequiresSymbolSource { symbol: String },
}

/// Write `<Entity>Repository.java` for the entity declared in `path`.
///
/// Fails when the entity has no `@Id` field or no package, or when the
/// repository file already exists. A superclass that cannot be qualified
/// is handed back as [`RepositoryOutcome::RequiresSymbolSource`].
pub fn create_jpa_repository(
    layout: &ProjectLayout,
    path: &Path,
) -> OperationResult<RepositoryOutcome> {
    let entity = entity_info(layout, path)?;
    let id_field = match (entity.id_field, entity.unresolved_superclass) {
        (Some(field), _) => field,
        (None, Some(symbol)) => return Ok(RepositoryOutcome::RequiresSymbolSource { symbol }),
        (None, None) => return Err(OperationError::NoIdField),
    };
    let package = entity.package.ok_or(OperationError::NoPackage)?;
    let id_type = id_field
        .type_text
        .as_deref()
        .map(boxed_type)
        .ok_or(OperationError::NoIdType)?;

    let name = format!("{}Repository", entity.entity_type);
    let directory = layout.package_directory(&package);
    let file = directory.join(format!("{name}.java"));
    if file.exists() {
        return Err(BufferError::TargetExists { path: file }.into());
    }
    fs::create_dir_all(&directory).map_err(|source| BufferError::Write {
        path: directory.clone(),
        source,
    })?;
    let mut buffer = SourceBuffer::parse(repository_source(
        &package,
        &name,
        &entity.entity_type,
        &id_type,
    ))?;
    buffer.save_as(&file)?;
    info!(
        repository = %name,
        entity = %entity.entity_type,
        id = %id_type,
        "created repository"
    );

    Ok(RepositoryOutcome::Created(Repository {
        file,
        name,
        entity_type: entity.entity_type,
        id_type,
        package,
    }))
}

fn repository_source(package: &str, name: &str, entity_type: &str, id_type: &str) -> String {
    format!(
        "package {package};\n\n\
         import org.springframework.data.jpa.repository.JpaRepository;\n\
         import org.springframework.stereotype.Repository;\n\n\
         @Repository\n\
         public interface {name} extends JpaRepository<{entity_type}, {id_type}> {{}}\n"
    )
}

/// Wrapper class for a primitive type; other types are returned as written.
fn boxed_type(type_text: &str) -> String {
    PRIMITIVE_WRAPPERS
        .iter()
        .find(|(primitive, _)| *primitive == type_text)
        .map(|(_, wrapper)| wrapper.to_string())
        .unwrap_or_else(|| type_text.to_string())
}
