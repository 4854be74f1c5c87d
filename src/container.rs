//! The built container: lazy get-or-build over a finished registry.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::argument::Instance;
use crate::classes::{ClassDescriptor, ClassRegistry};
use crate::factory::ServiceFactory;
use crate::internal::with_construction_guard;
use crate::key::tag_key;
use crate::observer::Observers;
use crate::registration::{Entry, Registry, ServiceRegistration};
use crate::resolver::ReferenceResolver;
use crate::value::Value;
use crate::{DiError, DiResult};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

struct ContainerInner {
    id: u64,
    registry: Registry,
    classes: Arc<ClassRegistry>,
    observers: Observers,
}

/// A built container.
///
/// Parameters are held as loaded; services are built on first access and
/// cached for the container's lifetime, so every consumer of a key shares
/// one instance. Cloning is cheap and clones share the same cache.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::{ClassRegistry, ContainerBuilder, Value};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// let mut classes = ClassRegistry::new();
/// classes
///     .register::<Greeter>("Greeter")
///     .constructor(|args| Ok(Greeter { greeting: args.string(0)? }));
///
/// let mut builder = ContainerBuilder::new(classes);
/// builder.add_config_tree(Value::from(json!({
///     "parameters": {"name": "world"},
///     "services": {
///         "greeter": {"class": "Greeter", "arguments": ["hello %name%"]}
///     }
/// })));
/// let container = builder.create_container().unwrap();
///
/// let greeter = container.get_as::<Greeter>("greeter").unwrap();
/// assert_eq!(greeter.greeting, "hello world");
/// assert!(Arc::ptr_eq(&greeter, &container.get_as::<Greeter>("greeter").unwrap()));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    pub(crate) fn new(registry: Registry, classes: Arc<ClassRegistry>, observers: Observers) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
                registry,
                classes,
                observers,
            }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.inner.classes
    }

    /// True when `key` is registered, whatever it holds.
    pub fn has(&self, key: &str) -> bool {
        self.inner.registry.exists(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.registry.keys()
    }

    /// True once the service under `key` has been built.
    pub fn is_built(&self, key: &str) -> bool {
        match self.inner.registry.get(key) {
            Some(Entry::Service(registration)) => registration.is_built(),
            Some(Entry::Alias(target)) => self.is_built(target),
            _ => false,
        }
    }

    /// Returns the service under `key`, building it on first access.
    ///
    /// A failed build leaves the key unbuilt; the next access retries.
    pub fn get(&self, key: &str) -> DiResult<Instance> {
        match self.inner.registry.get(key) {
            Some(Entry::Service(registration)) => self.build(key, registration),
            Some(Entry::Alias(target)) => with_construction_guard(self.inner.id, key, || {
                if !self.has(target) {
                    return Err(DiError::Reference(format!(
                        "'{}' is an alias of '{}', which doesn't exist",
                        key, target
                    )));
                }
                self.get(target)
            }),
            Some(Entry::Stub) => Err(DiError::Stub(key.to_string())),
            Some(other) => Err(DiError::Reference(format!(
                "'{}' is a {}, not a service",
                key,
                other.describe()
            ))),
            None => Err(DiError::Reference(format!("The service '{}' doesn't exist", key))),
        }
    }

    /// Returns the service under `key` downcast to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> DiResult<Arc<T>> {
        self.get(key)?.downcast::<T>().map_err(|_| {
            DiError::TypeMismatch(format!("service '{}' is not a {}", key, type_name::<T>()))
        })
    }

    /// Raw parameter value, placeholders unexpanded.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.inner.registry.parameter(key)
    }

    /// Parameter value with every placeholder expanded.
    pub fn resolve_parameter(&self, key: &str) -> DiResult<Value> {
        let value = self.inner.registry.require_parameter(key)?.clone();
        ReferenceResolver::new().resolve_parameter(value, &self.inner.registry, "")
    }

    /// Built services of the collection for `tag`, in declaration order.
    ///
    /// `tag` may be given with or without the leading `#`.
    pub fn tagged(&self, tag: &str) -> DiResult<Vec<Instance>> {
        match self.inner.registry.get(&tag_key(tag)) {
            None => Ok(Vec::new()),
            Some(Entry::Tags(collection)) => collection.services().iter().map(|key| self.get(key)).collect(),
            Some(_) => Err(DiError::Reference(format!(
                "Could not resolve the tag collection for '{}'. The collection was invalid",
                tag
            ))),
        }
    }

    /// Class descriptor of the service under `key`, following aliases.
    pub(crate) fn class_of(&self, key: &str) -> DiResult<&ClassDescriptor> {
        match self.inner.registry.get(key) {
            Some(Entry::Service(registration)) => self.inner.classes.require(&registration.request.class),
            Some(Entry::Alias(target)) => self.class_of(target),
            Some(Entry::Stub) => Err(DiError::Stub(key.to_string())),
            _ => Err(DiError::Reference(format!("The service '{}' doesn't exist", key))),
        }
    }

    fn build(&self, key: &str, registration: &ServiceRegistration) -> DiResult<Instance> {
        if let Some(instance) = registration.instance.get() {
            return Ok(instance.clone());
        }

        with_construction_guard(self.inner.id, key, || {
            let observers = &self.inner.observers;
            observers.constructing(key);
            let start = Instant::now();

            match ServiceFactory::new(self).create_service(&registration.request) {
                Ok(instance) => {
                    // Another thread may have finished first; keep its instance.
                    let stored = registration.instance.get_or_init(|| instance).clone();
                    observers.constructed(key, start.elapsed());
                    Ok(stored)
                }
                Err(err) => {
                    observers.construction_failed(key, &err);
                    Err(err)
                }
            }
        })
    }

    /// Human-readable dump of every key and what it holds.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();

        let mut out = String::new();
        for key in keys {
            let line = match self.inner.registry.get(key) {
                Some(Entry::Parameter(value)) => format!("{key} = {value}"),
                Some(Entry::Service(registration)) => format!(
                    "{key} -> {} ({})",
                    registration.request.class,
                    if registration.is_built() { "built" } else { "lazy" }
                ),
                Some(Entry::Alias(target)) => format!("{key} -> @{target}"),
                Some(Entry::Stub) => format!("{key} (stub)"),
                Some(Entry::Tags(collection)) => format!("{key} = [{}]", collection.services().join(", ")),
                None => continue,
            };
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("keys", &self.inner.registry.len())
            .field("observers", &self.inner.observers.has_observers())
            .finish()
    }
}
