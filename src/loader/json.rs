use std::path::Path;

use super::{has_extension, read_to_string, Loader};
use crate::value::Value;
use crate::{DiError, DiResult};

/// Loads `.json` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl Loader for JsonLoader {
    fn name(&self) -> &str {
        "json"
    }

    fn supports(&self, file: &Path) -> bool {
        has_extension(file, &["json"])
    }

    fn load_file(&self, file: &Path) -> DiResult<Value> {
        let text = read_to_string(file)?;
        serde_json::from_str(&text)
            .map_err(|err| DiError::Load(format!("Could not parse '{}' as JSON: {}", file.display(), err)))
    }
}
