//! Builder bootstrap configuration.
//!
//! A [`BuilderConfig`] lists where configuration files live and which ones
//! to load. It can be deserialized from any serde format, assembled in
//! code, or seeded from the environment.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable holding extra search paths, separated like `PATH`.
pub const PATH_ENV_VAR: &str = "FERROUS_SYRINGE_PATH";

/// A file to queue, optionally under an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub alias: String,
}

/// Search paths and files for [`ContainerBuilder::from_config`](crate::ContainerBuilder::from_config).
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::BuilderConfig;
///
/// let config: BuilderConfig = serde_json::from_str(r#"{
///     "config_paths": ["/etc/app"],
///     "files": [{"path": "services.yml"}, {"path": "billing.yml", "alias": "billing"}]
/// }"#).unwrap();
///
/// assert_eq!(config.files[1].alias, "billing");
/// assert_eq!(config.files[0].alias, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Directories searched, in order, for relative file names
    pub config_paths: Vec<PathBuf>,
    /// Files queued in order
    pub files: Vec<FileEntry>,
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration whose search paths come from [`PATH_ENV_VAR`].
    pub fn from_env() -> Self {
        Self::from_env_var(PATH_ENV_VAR)
    }

    /// Configuration whose search paths come from the variable `name`.
    ///
    /// A missing variable yields no paths; empty entries are skipped.
    pub fn from_env_var(name: &str) -> Self {
        let config_paths = env::var_os(name)
            .map(|value| {
                env::split_paths(&value)
                    .filter(|path| !path.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            config_paths,
            files: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_paths.push(path.into());
        self
    }

    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_aliased_file("", path)
    }

    pub fn with_aliased_file(mut self, alias: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.push(FileEntry {
            path: path.into(),
            alias: alias.into(),
        });
        self
    }
}
