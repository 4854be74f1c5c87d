//! File loaders: turn one configuration file into a [`Value`] tree.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::value::Value;
use crate::{DiError, DiResult};

mod json;
#[cfg(feature = "yaml")]
mod yaml;

pub use json::JsonLoader;
#[cfg(feature = "yaml")]
pub use yaml::YamlLoader;

/// A configuration file format.
///
/// The builder asks each registered loader in turn whether it
/// [`supports`](Loader::supports) a file; the first that does loads it.
pub trait Loader: Send + Sync {
    /// Name used by [`ContainerBuilder::remove_loader`](crate::ContainerBuilder::remove_loader).
    fn name(&self) -> &str;

    fn supports(&self, file: &Path) -> bool;

    /// Reads and parses `file`.
    fn load_file(&self, file: &Path) -> DiResult<Value>;
}

impl fmt::Debug for dyn Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Loader({})", self.name())
    }
}

/// Loaders registered on a fresh builder.
pub fn default_loaders() -> Vec<Box<dyn Loader>> {
    let mut loaders: Vec<Box<dyn Loader>> = Vec::new();
    #[cfg(feature = "yaml")]
    loaders.push(Box::new(YamlLoader));
    loaders.push(Box::new(JsonLoader));
    loaders
}

/// True when the file extension is one of `extensions` (case-insensitive).
pub(crate) fn has_extension(file: &Path, extensions: &[&str]) -> bool {
    file.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|candidate| ext.eq_ignore_ascii_case(candidate)))
}

pub(crate) fn read_to_string(file: &Path) -> DiResult<String> {
    fs::read_to_string(file)
        .map_err(|err| DiError::Load(format!("Could not read '{}': {}", file.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_matching() {
        assert!(has_extension(&PathBuf::from("a/services.YML"), &["yml", "yaml"]));
        assert!(!has_extension(&PathBuf::from("services"), &["yml"]));
        assert!(!has_extension(&PathBuf::from("services.json.bak"), &["json"]));
    }

    #[test]
    fn default_set_supports_json() {
        let loaders = default_loaders();
        assert!(loaders.iter().any(|loader| loader.supports(Path::new("x.json"))));
        #[cfg(feature = "yaml")]
        assert_eq!(loaders[0].name(), "yaml");
    }
}
