//! Project layout: where Java sources live and how class names map to files.

use std::path::{Path, PathBuf};

use presso_core::config::Config;

/// Build files that mark a directory as a Java project.
const PROJECT_MARKERS: [&str; 3] = ["pom.xml", "build.gradle", "build.gradle.kts"];

/// Which source roots an operation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceSet {
    #[default]
    Main,
    Test,
    All,
}

/// Source roots of one project, resolved against its root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    main_source_dir: PathBuf,
    test_source_dir: PathBuf,
}

impl ProjectLayout {
    /// Maven/Gradle default layout (`src/main/java`, `src/test/java`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &Config::default())
    }

    /// Layout with source directories taken from configuration.
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Self {
        ProjectLayout {
            root: root.into(),
            main_source_dir: PathBuf::from(&config.layout.main_source_dir),
            test_source_dir: PathBuf::from(&config.layout.test_source_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn main_source_root(&self) -> PathBuf {
        self.root.join(&self.main_source_dir)
    }

    pub fn test_source_root(&self) -> PathBuf {
        self.root.join(&self.test_source_dir)
    }

    /// Roots covered by `set`.
    pub fn source_roots(&self, set: SourceSet) -> Vec<PathBuf> {
        match set {
            SourceSet::Main => vec![self.main_source_root()],
            SourceSet::Test => vec![self.test_source_root()],
            SourceSet::All => vec![self.main_source_root(), self.test_source_root()],
        }
    }

    /// Directory holding the sources of `package` under the main root.
    pub fn package_directory(&self, package: &str) -> PathBuf {
        package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self.main_source_root(), |dir, segment| dir.join(segment))
    }

    /// Expected source file of a fully-qualified class name.
    ///
    /// `com.acme.User` maps to `<main root>/com/acme/User.java`.
    pub fn source_file_for(&self, fq_name: &str) -> PathBuf {
        match fq_name.rsplit_once('.') {
            Some((package, class)) => self.package_directory(package).join(format!("{class}.java")),
            None => self.main_source_root().join(format!("{fq_name}.java")),
        }
    }

    /// True if the class's source file exists in the project.
    pub fn is_local(&self, fq_name: &str) -> bool {
        self.source_file_for(fq_name).is_file()
    }

    /// `path` relative to the project root, with `/` separators, for output.
    pub fn display_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// True if `root` looks like a Maven or Gradle project, or has `src/main/java`.
pub fn is_java_project(root: &Path) -> bool {
    PROJECT_MARKERS.iter().any(|marker| root.join(marker).is_file())
        || root.join("src").join("main").join("java").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use presso_core::config::LayoutConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn maps_class_names_to_files() {
        let layout = ProjectLayout::new("/work/shop");
        assert_eq!(
            layout.source_file_for("com.acme.model.User"),
            PathBuf::from("/work/shop/src/main/java/com/acme/model/User.java")
        );
        assert_eq!(
            layout.source_file_for("Main"),
            PathBuf::from("/work/shop/src/main/java/Main.java")
        );
        assert_eq!(
            layout.package_directory("com.acme"),
            PathBuf::from("/work/shop/src/main/java/com/acme")
        );
    }

    #[test]
    fn configured_source_dirs() {
        let config = Config {
            layout: LayoutConfig {
                main_source_dir: "app/src".to_string(),
                test_source_dir: "app/test".to_string(),
            },
            ..Config::default()
        };
        let layout = ProjectLayout::from_config("/p", &config);
        assert_eq!(layout.main_source_root(), PathBuf::from("/p/app/src"));
        assert_eq!(layout.source_roots(SourceSet::All).len(), 2);
        assert_eq!(layout.source_roots(SourceSet::Test), vec![PathBuf::from("/p/app/test")]);
    }

    #[test]
    fn locality_and_project_detection() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        assert!(!is_java_project(temp.path()));
        assert!(!layout.is_local("com.acme.Base"));

        let dir = layout.package_directory("com.acme");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Base.java"), "package com.acme; class Base {}").unwrap();
        assert!(layout.is_local("com.acme.Base"));
        assert!(!layout.is_local("java.lang.Object"));
        assert!(is_java_project(temp.path()));
        assert_eq!(
            layout.display_path(&dir.join("Base.java")),
            "src/main/java/com/acme/Base.java"
        );
    }
}
