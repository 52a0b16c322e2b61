//! Locate the project's entry point.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::{OperationError, OperationResult};
use crate::buffer::SourceBuffer;
use crate::files::collect_java_files;
use crate::layout::{ProjectLayout, SourceSet};
use crate::locate::class::{class_body, class_name, public_class};
use crate::locate::method::is_main_method;
use crate::locate::package::package_name;
use crate::syntax::named_children;

/// The public class declaring `public static void main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainClass {
    pub file: PathBuf,
    pub class_name: String,
    pub package: Option<String>,
}

/// Search the main source root for the first file (by path) whose public
/// class declares a `main` method.
///
/// Files that fail to load are skipped.
pub fn find_main_class(layout: &ProjectLayout) -> OperationResult<MainClass> {
    for path in collect_java_files(layout, SourceSet::Main)? {
        let buffer = match SourceBuffer::load(&path) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable source file");
                continue;
            }
        };
        let Some(class) = public_class(&buffer) else {
            continue;
        };
        let has_main = class_body(class).is_some_and(|body| {
            named_children(body)
                .into_iter()
                .any(|member| is_main_method(&buffer, member))
        });
        if has_main {
            let name = class_name(&buffer, class).unwrap_or_default().to_string();
            debug!(path = %path.display(), class = %name, "found main class");
            return Ok(MainClass {
                package: package_name(&buffer),
                class_name: name,
                file: path,
            });
        }
    }
    Err(OperationError::NoMainClass)
}
