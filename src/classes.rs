//! Class table: the named constructors that service definitions refer to.
//!
//! A service definition names its `class` as a string. Instead of looking
//! that name up reflectively, every constructible type is registered here
//! up front under the name the configuration uses, together with the
//! constructor, static factories, factory methods and setters the
//! configuration may call.

use std::any::{type_name, Any};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use crate::argument::{AnyBox, Arguments};
use crate::{DiError, DiResult};

type Constructor = Box<dyn Fn(&Arguments) -> DiResult<AnyBox> + Send + Sync>;
type FactoryMethod = Box<dyn Fn(&(dyn Any + Send + Sync), &Arguments) -> DiResult<AnyBox> + Send + Sync>;
type Setter = Box<dyn Fn(&mut (dyn Any + Send + Sync), &Arguments) -> DiResult<()> + Send + Sync>;

/// Everything the container may do with one registered class.
pub struct ClassDescriptor {
    name: String,
    type_name: &'static str,
    constructor: Option<Constructor>,
    static_methods: HashMap<String, Constructor>,
    methods: HashMap<String, FactoryMethod>,
    setters: HashMap<String, Setter>,
}

impl ClassDescriptor {
    fn new<T: 'static>(name: String) -> Self {
        Self {
            name,
            type_name: type_name::<T>(),
            constructor: None,
            static_methods: HashMap::new(),
            methods: HashMap::new(),
            setters: HashMap::new(),
        }
    }

    /// Name the configuration uses for this class.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type backing the class.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn has_static_method(&self, method: &str) -> bool {
        self.static_methods.contains_key(method)
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    pub fn has_setter(&self, method: &str) -> bool {
        self.setters.contains_key(method)
    }

    pub(crate) fn construct(&self, args: &Arguments) -> DiResult<AnyBox> {
        let ctor = self.constructor.as_ref().ok_or_else(|| {
            DiError::Definition(format!("The class '{}' has no registered constructor", self.name))
        })?;
        ctor(args)
    }

    pub(crate) fn call_static(&self, method: &str, args: &Arguments) -> DiResult<AnyBox> {
        let factory = self.static_methods.get(method).ok_or_else(|| self.missing(method))?;
        factory(args)
    }

    pub(crate) fn call_method(&self, instance: &(dyn Any + Send + Sync), method: &str, args: &Arguments) -> DiResult<AnyBox> {
        let factory = self.methods.get(method).ok_or_else(|| self.missing(method))?;
        factory(instance, args)
    }

    pub(crate) fn call_setter(&self, instance: &mut (dyn Any + Send + Sync), method: &str, args: &Arguments) -> DiResult<()> {
        let setter = self.setters.get(method).ok_or_else(|| self.missing(method))?;
        setter(instance, args)
    }

    fn missing(&self, method: &str) -> DiError {
        DiError::Definition(format!("The method '{}' does not exist on the class '{}'", method, self.name))
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("constructible", &self.is_constructible())
            .field("static_methods", &self.static_methods.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of constructible classes, keyed by configuration name.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::ClassRegistry;
///
/// struct Mailer {
///     host: String,
///     retries: i64,
/// }
///
/// let mut classes = ClassRegistry::new();
/// classes
///     .register::<Mailer>("App.Mailer")
///     .constructor(|args| Ok(Mailer { host: args.string(0)?, retries: 0 }))
///     .setter("setRetries", |mailer, args| {
///         mailer.retries = args.i64(0)?;
///         Ok(())
///     });
///
/// let mailer = classes.get("App.Mailer").unwrap();
/// assert!(mailer.is_constructible());
/// assert!(mailer.has_setter("setRetries"));
/// ```
#[derive(Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `name`, replacing any earlier class of that name.
    pub fn register<T: Any + Send + Sync>(&mut self, name: impl Into<String>) -> ClassBuilder<'_, T> {
        let name = name.into();
        let fresh = ClassDescriptor::new::<T>(name.clone());
        let descriptor = match self.classes.entry(name) {
            Entry::Occupied(mut slot) => {
                slot.insert(fresh);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(fresh),
        };
        ClassBuilder {
            descriptor,
            _marker: PhantomData,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    /// Looks up `name`, failing with a definition error naming it.
    pub(crate) fn require(&self, name: &str) -> DiResult<&ClassDescriptor> {
        self.get(name)
            .ok_or_else(|| DiError::Definition(format!("The service class '{}' does not exist", name)))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.classes.iter()).finish()
    }
}

/// Fluent registration of one class's callable surface.
pub struct ClassBuilder<'a, T> {
    descriptor: &'a mut ClassDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Any + Send + Sync> ClassBuilder<'a, T> {
    /// Direct construction: used when the definition has no factory.
    pub fn constructor<F>(self, ctor: F) -> Self
    where
        F: Fn(&Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        self.descriptor.constructor = Some(Box::new(move |args| Ok(Box::new(ctor(args)?) as AnyBox)));
        self
    }

    /// Static factory, referenced by `factoryClass` + `factoryMethod`.
    pub fn static_factory<R, F>(self, method: impl Into<String>, factory: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&Arguments) -> DiResult<R> + Send + Sync + 'static,
    {
        self.descriptor
            .static_methods
            .insert(method.into(), Box::new(move |args| Ok(Box::new(factory(args)?) as AnyBox)));
        self
    }

    /// Factory method on a built instance, referenced by `factoryService` +
    /// `factoryMethod`.
    pub fn factory_method<R, F>(self, method: impl Into<String>, factory: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&T, &Arguments) -> DiResult<R> + Send + Sync + 'static,
    {
        let method = method.into();
        let label = format!("{}::{}", self.descriptor.name, method);
        self.descriptor.methods.insert(
            method,
            Box::new(move |instance, args| {
                let this = instance
                    .downcast_ref::<T>()
                    .ok_or_else(|| DiError::TypeMismatch(format!("{} expects {}", label, type_name::<T>())))?;
                Ok(Box::new(factory(this, args)?) as AnyBox)
            }),
        );
        self
    }

    /// Setter injection, referenced by an entry of `calls`.
    pub fn setter<F>(self, method: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut T, &Arguments) -> DiResult<()> + Send + Sync + 'static,
    {
        let method = method.into();
        let label = format!("{}::{}", self.descriptor.name, method);
        self.descriptor.setters.insert(
            method,
            Box::new(move |instance, args| {
                let this = instance
                    .downcast_mut::<T>()
                    .ok_or_else(|| DiError::TypeMismatch(format!("{} expects {}", label, type_name::<T>())))?;
                setter(this, args)
            }),
        );
        self
    }
}
