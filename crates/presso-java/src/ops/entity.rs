//! Entity introspection: the public class of a file and its identity field,
//! which may be inherited from a local superclass.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{OperationError, OperationResult};
use crate::buffer::SourceBuffer;
use crate::inheritance::{annotated_with, walk_hierarchy, InheritedMember, WalkStop};
use crate::layout::ProjectLayout;
use crate::locate::class::{class_name, public_class};
use crate::locate::package::package_name;

/// Annotation marking the identity field.
pub const ID_ANNOTATION: &str = "Id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    pub file: PathBuf,
    pub entity_type: String,
    pub package: Option<String>,
    pub id_field: Option<InheritedMember>,
    /// Local superclass the walk could not follow, when no `@Id` was found
    /// before reaching it.
    pub unresolved_superclass: Option<String>,
}

/// Describe the entity declared in `path`.
///
/// Fails when the file has no public class, or when the hierarchy was
/// fully walked without finding an `@Id` field. A walk that stops at an
/// unfollowable superclass is reported through `unresolved_superclass`.
pub fn entity_info(layout: &ProjectLayout, path: &Path) -> OperationResult<EntityInfo> {
    let buffer = SourceBuffer::load(path)?;
    let class = public_class(&buffer).ok_or(OperationError::NoPublicClass)?;
    let entity_type = class_name(&buffer, class).unwrap_or_default().to_string();
    let walk = walk_hierarchy(layout, &buffer, class, annotated_with(ID_ANNOTATION))?;
    info!(
        entity = %entity_type,
        stop = ?walk.stop,
        loads = walk.loads,
        "resolved entity hierarchy"
    );

    let unresolved_superclass = match walk.stop {
        WalkStop::Found => None,
        WalkStop::Unresolvable | WalkStop::ClassNotFound | WalkStop::LoadFailed => {
            walk.unresolved.clone()
        }
        WalkStop::NoSuperclass | WalkStop::External | WalkStop::Cycle => {
            return Err(OperationError::NoIdField)
        }
    };
    Ok(EntityInfo {
        file: path.to_path_buf(),
        package: package_name(&buffer),
        entity_type,
        id_field: walk.member,
        unresolved_superclass,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(layout: &ProjectLayout, fq: &str, content: &str) -> PathBuf {
        let path = layout.source_file_for(fq);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn local_id_field() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let path = write(
            &layout,
            "shop.Product",
            "package shop;\n\npublic class Product {\n    @Id\n    private Long id;\n}\n",
        );
        let info = entity_info(&layout, &path).unwrap();
        assert_eq!(info.entity_type, "Product");
        assert_eq!(info.package.as_deref(), Some("shop"));
        let id = info.id_field.unwrap();
        assert_eq!(id.name, "id");
        assert_eq!(id.type_text.as_deref(), Some("Long"));
        assert_eq!(id.class_name, "Product");
    }

    #[test]
    fn inherited_id_field() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        write(
            &layout,
            "shop.base.BaseEntity",
            "package shop.base;\n\npublic abstract class BaseEntity {\n    @Id\n    protected String uuid;\n}\n",
        );
        let path = write(
            &layout,
            "shop.Order",
            "package shop;\n\nimport shop.base.BaseEntity;\n\npublic class Order extends BaseEntity {\n    private int total;\n}\n",
        );
        let info = entity_info(&layout, &path).unwrap();
        let id = info.id_field.unwrap();
        assert_eq!(id.name, "uuid");
        assert_eq!(id.class_name, "BaseEntity");
        assert!(id.file.unwrap().ends_with("shop/base/BaseEntity.java"));
    }

    #[test]
    fn missing_public_class_and_id() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let hidden = write(&layout, "shop.Hidden", "package shop;\nclass Hidden {}\n");
        assert_eq!(
            entity_info(&layout, &hidden).unwrap_err().to_string(),
            "No public class found in the entity file."
        );
        let plain = write(&layout, "shop.Plain", "package shop;\npublic class Plain { Long id; }\n");
        assert!(matches!(
            entity_info(&layout, &plain),
            Err(OperationError::NoIdField)
        ));
    }

    #[test]
    fn unresolvable_superclass_is_reported() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let path = write(&layout, "Thing", "public class Thing extends Base {}\n");
        let info = entity_info(&layout, &path).unwrap();
        assert!(info.id_field.is_none());
        assert_eq!(info.unresolved_superclass.as_deref(), Some("Base"));
    }
}
