//! Container builder: queues configuration sources and turns them into a
//! [`Container`].
//!
//! Files are located and loaded when the container is created, not when
//! they are added, except that [`add_config_file`](ContainerBuilder::add_config_file)
//! checks up front that the file can be found. Sources are processed in the
//! order they were added, so later files override earlier ones key by key.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::classes::ClassRegistry;
use crate::config::BuilderConfig;
use crate::container::Container;
use crate::loader::{default_loaders, Loader};
use crate::observer::{BuildObserver, Observers};
use crate::value::Value;
use crate::{DiError, DiResult};

mod imports;
mod services;

use imports::{locate, ImportProcessor};
use services::DefinitionProcessor;

enum ConfigSource {
    File { path: PathBuf, alias: String },
    Tree { tree: Value, alias: String },
}

/// Builds containers from configuration files and trees.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::{ClassRegistry, ContainerBuilder, Value};
/// use serde_json::json;
///
/// struct Pool {
///     size: i64,
/// }
///
/// let mut classes = ClassRegistry::new();
/// classes
///     .register::<Pool>("Pool")
///     .constructor(|args| Ok(Pool { size: args.i64(0)? }));
///
/// let mut builder = ContainerBuilder::new(classes);
/// builder
///     .add_config_tree(Value::from(json!({"parameters": {"size": 4}})))
///     .add_aliased_config_tree("db", Value::from(json!({
///         "parameters": {"size": 8},
///         "services": {"pool": {"class": "Pool", "arguments": ["%size%"]}}
///     })));
///
/// let container = builder.create_container().unwrap();
/// assert_eq!(container.get_as::<Pool>("db.pool").unwrap().size, 8);
/// assert_eq!(container.parameter("size"), Some(&Value::from(4)));
/// ```
pub struct ContainerBuilder {
    classes: Arc<ClassRegistry>,
    loaders: Vec<Box<dyn Loader>>,
    config_paths: Vec<PathBuf>,
    sources: Vec<ConfigSource>,
    observers: Observers,
}

impl ContainerBuilder {
    /// Creates a builder with the default loaders and no search paths.
    pub fn new(classes: ClassRegistry) -> Self {
        Self {
            classes: Arc::new(classes),
            loaders: default_loaders(),
            config_paths: Vec::new(),
            sources: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Creates a builder with the search paths and files listed in `config`.
    pub fn from_config(config: BuilderConfig, classes: ClassRegistry) -> DiResult<Self> {
        let mut builder = Self::new(classes);
        for path in &config.config_paths {
            builder.add_config_path(path)?;
        }
        for file in &config.files {
            builder.add_aliased_config_file(&file.alias, &file.path)?;
        }
        Ok(builder)
    }

    /// Adds a directory to search for relative file names.
    pub fn add_config_path(&mut self, path: impl AsRef<Path>) -> DiResult<&mut Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(DiError::Load(format!(
                "The config path '{}' is not a valid directory",
                path.display()
            )));
        }
        self.config_paths.push(path.to_path_buf());
        Ok(self)
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Registers a loader; it is asked after the ones already registered.
    pub fn add_loader(&mut self, loader: Box<dyn Loader>) -> &mut Self {
        self.loaders.push(loader);
        self
    }

    /// Removes every loader named `name`.
    pub fn remove_loader(&mut self, name: &str) -> &mut Self {
        self.loaders.retain(|loader| loader.name() != name);
        self
    }

    /// Removes every loader that supports `file`.
    pub fn remove_loader_by_file(&mut self, file: impl AsRef<Path>) -> &mut Self {
        let file = file.as_ref();
        self.loaders.retain(|loader| !loader.supports(file));
        self
    }

    pub fn loader_names(&self) -> Vec<&str> {
        self.loaders.iter().map(|loader| loader.name()).collect()
    }

    /// Queues a file for the root scope.
    pub fn add_config_file(&mut self, file: impl AsRef<Path>) -> DiResult<&mut Self> {
        self.add_aliased_config_file("", file)
    }

    /// Queues a file whose keys are all prefixed with `alias`.
    pub fn add_aliased_config_file(&mut self, alias: &str, file: impl AsRef<Path>) -> DiResult<&mut Self> {
        let file = file.as_ref();
        let name = file
            .to_str()
            .ok_or_else(|| DiError::Load(format!("The file name '{}' is not valid UTF-8", file.display())))?;
        let path = locate(name, None, &self.config_paths)?;
        debug!(file = %path.display(), alias, "queued config file");
        self.sources.push(ConfigSource::File {
            path,
            alias: alias.to_string(),
        });
        Ok(self)
    }

    /// Queues an already parsed tree for the root scope.
    pub fn add_config_tree(&mut self, tree: Value) -> &mut Self {
        self.add_aliased_config_tree("", tree)
    }

    /// Queues an already parsed tree whose keys are prefixed with `alias`.
    pub fn add_aliased_config_tree(&mut self, alias: &str, tree: Value) -> &mut Self {
        self.sources.push(ConfigSource::Tree {
            tree,
            alias: alias.to_string(),
        });
        self
    }

    /// Adds an observer to every container this builder creates.
    pub fn add_observer(&mut self, observer: Arc<dyn BuildObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Loads every queued source and returns the container.
    ///
    /// Each source is merged with its `inherit`/`imports` files, then its
    /// parameters are registered before its services. Any error aborts the
    /// whole build.
    pub fn create_container(&self) -> DiResult<Container> {
        info!(sources = self.sources.len(), "building container");

        let imports = ImportProcessor::new(&self.loaders, &self.config_paths);
        let mut definitions = DefinitionProcessor::new(&self.classes);

        for source in &self.sources {
            let (tree, alias) = match source {
                ConfigSource::File { path, alias } => (imports.load_root(path)?, alias),
                ConfigSource::Tree { tree, alias } => (imports.expand_tree(tree.clone())?, alias),
            };
            definitions.process_parameters(&tree, alias)?;
            definitions.process_services(&tree, alias)?;
            definitions.process_extensions(&tree, alias)?;
        }

        let registry = definitions.finish()?;
        info!(keys = registry.len(), "container ready");
        Ok(Container::new(registry, self.classes.clone(), self.observers.clone()))
    }
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("classes", &self.classes.len())
            .field("loaders", &self.loader_names())
            .field("config_paths", &self.config_paths)
            .field("sources", &self.sources.len())
            .finish()
    }
}
