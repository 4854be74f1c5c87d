use std::path::Path;

use super::{has_extension, read_to_string, Loader};
use crate::value::Value;
use crate::{DiError, DiResult};

/// Loads `.yml` and `.yaml` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

impl Loader for YamlLoader {
    fn name(&self) -> &str {
        "yaml"
    }

    fn supports(&self, file: &Path) -> bool {
        has_extension(file, &["yml", "yaml"])
    }

    fn load_file(&self, file: &Path) -> DiResult<Value> {
        let text = read_to_string(file)?;
        serde_yaml::from_str(&text)
            .map_err(|err| DiError::Load(format!("Could not parse '{}' as YAML: {}", file.display(), err)))
    }
}
