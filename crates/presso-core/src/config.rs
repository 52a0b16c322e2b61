//! Configuration handling for presso.
//!
//! Configuration lives in `<project>/.presso/config.toml`. Every field has a
//! default, so a missing file or a partial file is fine.
//!
//! ```toml
//! [layout]
//! main_source_dir = "src/main/java"
//! test_source_dir = "src/test/java"
//!
//! [format]
//! indent = "    "
//!
//! [rename]
//! cascade = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory under the project root that holds presso state.
pub const CONFIG_DIR: &str = ".presso";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Presso configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Project source layout
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Formatting of generated code
    #[serde(default)]
    pub format: FormatConfig,

    /// Rename behaviour
    #[serde(default)]
    pub rename: RenameConfig,
}

/// Where sources live, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_main_source_dir")]
    pub main_source_dir: String,

    #[serde(default = "default_test_source_dir")]
    pub test_source_dir: String,
}

/// Formatting of inserted members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Indent used when no neighbouring line shows one
    #[serde(default = "default_indent")]
    pub indent: String,
}

/// Rename settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameConfig {
    /// Rename conventionally-named variables along with their type
    #[serde(default = "default_cascade")]
    pub cascade: bool,
}

fn default_main_source_dir() -> String {
    "src/main/java".to_string()
}

fn default_test_source_dir() -> String {
    "src/test/java".to_string()
}

fn default_indent() -> String {
    "    ".to_string()
}

fn default_cascade() -> bool {
    true
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            main_source_dir: default_main_source_dir(),
            test_source_dir: default_test_source_dir(),
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            cascade: default_cascade(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from .presso/config.toml in the given project root
    pub fn load_from_project(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = project_root.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
