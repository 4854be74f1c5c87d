//! Locating, loading and merging configuration files (`inherit` / `imports`).

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::loader::Loader;
use crate::merge::merge_recursive;
use crate::value::Value;
use crate::{DiError, DiResult};

const INHERIT_KEY: &str = "inherit";
const IMPORTS_KEY: &str = "imports";

/// Finds `file`, trying `base` (the importing file's directory) first, then
/// every search path, then the path as given.
pub(crate) fn locate(file: &str, base: Option<&Path>, config_paths: &[PathBuf]) -> DiResult<PathBuf> {
    let requested = Path::new(file);
    if requested.is_absolute() {
        return if requested.is_file() {
            Ok(requested.to_path_buf())
        } else {
            Err(DiError::Load(format!("The config file '{}' does not exist", file)))
        };
    }

    base.into_iter()
        .chain(config_paths.iter().map(PathBuf::as_path))
        .map(|dir| dir.join(requested))
        .chain(std::iter::once(requested.to_path_buf()))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            DiError::Load(format!(
                "The config file '{}' does not exist in any of the configured paths",
                file
            ))
        })
}

/// Loads files and expands their `inherit` and `imports` keys.
pub(crate) struct ImportProcessor<'a> {
    loaders: &'a [Box<dyn Loader>],
    config_paths: &'a [PathBuf],
}

impl<'a> ImportProcessor<'a> {
    pub(crate) fn new(loaders: &'a [Box<dyn Loader>], config_paths: &'a [PathBuf]) -> Self {
        Self { loaders, config_paths }
    }

    /// Loads `path` with the first loader that supports it.
    ///
    /// The document must be a mapping.
    pub(crate) fn load(&self, path: &Path) -> DiResult<Value> {
        let loader = self
            .loaders
            .iter()
            .find(|loader| loader.supports(path))
            .ok_or_else(|| {
                DiError::Load(format!(
                    "The file '{}' is not supported by any of the available loaders",
                    path.display()
                ))
            })?;

        let tree = loader.load_file(path)?;
        if tree.as_map().is_none() {
            return Err(DiError::Load(format!("The data from '{}' is invalid", path.display())));
        }
        debug!(file = %path.display(), loader = loader.name(), "loaded config file");
        Ok(tree)
    }

    /// Loads `path` and everything it inherits or imports.
    pub(crate) fn load_root(&self, path: &Path) -> DiResult<Value> {
        let mut chain = Vec::new();
        self.load_nested(path, &mut chain)
    }

    /// Expands the `inherit`/`imports` keys of an in-memory tree.
    pub(crate) fn expand_tree(&self, tree: Value) -> DiResult<Value> {
        let mut chain = Vec::new();
        self.process_imports(tree, None, &mut chain)
    }

    fn load_nested(&self, path: &Path, chain: &mut Vec<PathBuf>) -> DiResult<Value> {
        let canonical = path
            .canonicalize()
            .map_err(|err| DiError::Load(format!("Could not open '{}': {}", path.display(), err)))?;

        if chain.contains(&canonical) {
            let cycle: Vec<String> = chain
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect();
            return Err(DiError::Load(format!("Import cycle detected: {}", cycle.join(" -> "))));
        }

        chain.push(canonical.clone());
        let result = self
            .load(&canonical)
            .and_then(|tree| self.process_imports(tree, canonical.parent(), chain));
        chain.pop();
        result
    }

    /// Merges inherited files under `config` and imported files over it.
    ///
    /// The inherited tree is the base, so the current file wins; each import
    /// is merged on top of what has been assembled so far.
    fn process_imports(&self, mut config: Value, base: Option<&Path>, chain: &mut Vec<PathBuf>) -> DiResult<Value> {
        let (inherit, imports) = match &mut config {
            Value::Map(map) => (map.shift_remove(INHERIT_KEY), map.shift_remove(IMPORTS_KEY)),
            _ => (None, None),
        };

        if let Some(inherit) = inherit.filter(|value| !value.is_blank()) {
            let file = inherit
                .as_str()
                .map_err(|_| DiError::Load(format!("'{}' must name a single file", INHERIT_KEY)))?;
            let path = locate(file, base, self.config_paths)?;
            let inherited = self.load_nested(&path, chain)?;
            debug!(file, "inheriting config file");
            config = merge_recursive(inherited, config);
        }

        match imports {
            None | Some(Value::Null) => {}
            Some(Value::List(files)) => {
                for file in &files {
                    let file = file
                        .as_str()
                        .map_err(|_| DiError::Load(format!("Every entry of '{}' must be a file name", IMPORTS_KEY)))?;
                    let path = locate(file, base, self.config_paths)?;
                    let imported = self.load_nested(&path, chain)?;
                    debug!(file, "imported config file");
                    config = merge_recursive(config, imported);
                }
            }
            Some(other) => {
                return Err(DiError::Load(format!(
                    "'{}' must be a sequence of file names, found {}",
                    IMPORTS_KEY,
                    other.type_name()
                )))
            }
        }

        Ok(config)
    }
}
