//! Registry of parameters, lazily built services and tag collections.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;

use crate::argument::Instance;
use crate::factory::ConstructionRequest;
use crate::value::Value;
use crate::{DiError, DiResult};

/// Ordered group of service keys registered under one tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCollection {
    services: Vec<String>,
}

impl TagCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key` unless it is already a member.
    pub fn add_service(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.services.contains(&key) {
            self.services.push(key);
        }
    }

    /// Member keys in declaration order.
    pub fn services(&self) -> &[String] {
        &self.services
    }
}

/// A lazily built service: its construction request and, once built, the
/// shared instance.
pub struct ServiceRegistration {
    pub(crate) request: ConstructionRequest,
    pub(crate) instance: OnceCell<Instance>,
}

impl ServiceRegistration {
    pub(crate) fn new(request: ConstructionRequest) -> Self {
        Self {
            request,
            instance: OnceCell::new(),
        }
    }

    pub fn request(&self) -> &ConstructionRequest {
        &self.request
    }

    pub fn is_built(&self) -> bool {
        self.instance.get().is_some()
    }
}

/// What a registry key holds.
pub enum Entry {
    Parameter(Value),
    Service(ServiceRegistration),
    /// Another name for the target service key
    Alias(String),
    /// Placeholder that fails on access
    Stub,
    Tags(TagCollection),
}

impl Entry {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Entry::Parameter(_) => "parameter",
            Entry::Service(_) => "service",
            Entry::Alias(_) => "service alias",
            Entry::Stub => "stub service",
            Entry::Tags(_) => "tag collection",
        }
    }
}

/// Key-value store behind a container.
///
/// Written while definitions load; afterwards only the per-service
/// instance cells change, each at most once.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an eagerly held parameter value, replacing any earlier entry.
    pub fn set_parameter(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), Entry::Parameter(value));
    }

    /// Stores a lazily built service, replacing any earlier entry.
    pub(crate) fn set_service(&mut self, key: impl Into<String>, request: ConstructionRequest) {
        self.entries
            .insert(key.into(), Entry::Service(ServiceRegistration::new(request)));
    }

    pub(crate) fn set_alias(&mut self, key: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(key.into(), Entry::Alias(target.into()));
    }

    pub(crate) fn set_stub(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), Entry::Stub);
    }

    /// Appends `service` to the collection stored under `tag_key`.
    pub(crate) fn add_tag(&mut self, tag_key: &str, service: &str) -> DiResult<()> {
        let entry = self
            .entries
            .entry(tag_key.to_string())
            .or_insert_with(|| Entry::Tags(TagCollection::new()));
        match entry {
            Entry::Tags(collection) => {
                collection.add_service(service);
                Ok(())
            }
            other => Err(DiError::Definition(format!(
                "Cannot tag '{}' with '{}': that key already holds a {}",
                service,
                tag_key,
                other.describe()
            ))),
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    /// Raw (unresolved) value of a parameter key.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        match self.entries.get(key) {
            Some(Entry::Parameter(value)) => Some(value),
            _ => None,
        }
    }

    /// Parameter lookup that explains why a key is unusable.
    pub(crate) fn require_parameter(&self, key: &str) -> DiResult<&Value> {
        match self.entries.get(key) {
            Some(Entry::Parameter(value)) => Ok(value),
            Some(other) => Err(DiError::Reference(format!(
                "Tried to inject the parameter '{}', but that key holds a {}",
                key,
                other.describe()
            ))),
            None => Err(DiError::Reference(format!(
                "Tried to inject the parameter '{}' in an argument list, but it doesn't exist",
                key
            ))),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort_unstable();
        f.debug_map()
            .entries(keys.into_iter().map(|key| (key, self.entries[key].describe())))
            .finish()
    }
}
