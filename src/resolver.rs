//! Reference resolution for `@service`, `%parameter%` and `#tag` strings.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::trace;

use crate::argument::{Argument, Injected};
use crate::container::Container;
use crate::key::{alias_key, first_placeholder, is_tag_reference, placeholder_sigils, service_name};
use crate::registration::{Entry, Registry};
use crate::value::Value;
use crate::{DiError, DiResult};

/// Upper bound on substitution rounds for one string.
pub const MAX_SUBSTITUTIONS: usize = 100;

/// Parameter names already substituted while resolving one string.
///
/// Seeing a name twice means the parameters refer to each other.
#[derive(Debug, Default, Clone)]
pub struct ReplacementGuard {
    replaced: HashSet<String>,
}

impl ReplacementGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.replaced.contains(name)
    }

    pub fn record(&mut self, name: impl Into<String>) {
        self.replaced.insert(name.into());
    }
}

/// Turns reference strings into the values or services they name.
///
/// Stateless: every call works against the registry or container it is
/// handed, so one resolver serves both the build phase and lazy
/// construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceResolver;

impl ReferenceResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves `@name` to the built service `alias.name`.
    ///
    /// Any other string comes back unchanged as a value.
    pub fn resolve_service(&self, arg: &str, container: &Container, alias: &str) -> DiResult<Injected> {
        let Some(name) = service_name(arg) else {
            return Ok(Injected::Value(Value::String(arg.to_string())));
        };
        let key = alias_key(name, alias);
        if !container.has(&key) {
            return Err(DiError::Reference(format!(
                "Tried to inject the service '{}', but it doesn't exist",
                key
            )));
        }
        trace!(service = %key, "injecting service");
        container.get(&key).map(Injected::Service)
    }

    /// Substitutes `%name%` placeholders in every string of `value`.
    ///
    /// A placeholder spanning the whole string is replaced by the parameter
    /// value itself, keeping its type; otherwise the parameter's string form
    /// is spliced in. Names are looked up as `alias.name` first and fall
    /// back to the bare name once the aliased one has been used.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_syringe::{ReferenceResolver, Registry, Value};
    ///
    /// let mut registry = Registry::new();
    /// registry.set_parameter("host", Value::from("db.local"));
    /// registry.set_parameter("port", Value::from(5432));
    ///
    /// let resolver = ReferenceResolver::new();
    /// let dsn = resolver.resolve_parameter(Value::from("pg://%host%:%port%"), &registry, "").unwrap();
    /// assert_eq!(dsn, Value::from("pg://db.local:5432"));
    ///
    /// let port = resolver.resolve_parameter(Value::from("%port%"), &registry, "").unwrap();
    /// assert_eq!(port, Value::from(5432));
    /// ```
    pub fn resolve_parameter(&self, value: Value, registry: &Registry, alias: &str) -> DiResult<Value> {
        match value {
            Value::String(text) => {
                let mut guard = ReplacementGuard::new();
                self.resolve_text(&text, registry, alias, &mut guard)
            }
            Value::List(items) => items
                .into_iter()
                .map(|item| self.resolve_parameter(item, registry, alias))
                .collect::<DiResult<Vec<_>>>()
                .map(Value::List),
            Value::Map(map) => map
                .into_iter()
                .map(|(key, item)| Ok((key, self.resolve_parameter(item, registry, alias)?)))
                .collect::<DiResult<IndexMap<_, _>>>()
                .map(Value::Map),
            scalar => Ok(scalar),
        }
    }

    pub(crate) fn resolve_text(
        &self,
        text: &str,
        registry: &Registry,
        alias: &str,
        guard: &mut ReplacementGuard,
    ) -> DiResult<Value> {
        let mut current = Value::String(text.to_string());
        let mut rounds = 0;

        loop {
            if matches!(current, Value::List(_) | Value::Map(_)) {
                return self.resolve_nested(current, registry, alias, guard);
            }
            let text = match &current {
                Value::String(text) if placeholder_sigils(text) > 1 => text,
                _ => return Ok(current),
            };
            let Some((range, param)) = first_placeholder(text) else {
                return Ok(current);
            };
            if rounds == MAX_SUBSTITUTIONS {
                return Err(DiError::ResolutionLimit(text.clone()));
            }
            rounds += 1;

            let mut name = alias_key(param, alias);
            if guard.contains(&name) {
                if guard.contains(param) {
                    return Err(DiError::CircularReference(param.to_string()));
                }
                name = param.to_string();
            }

            let value = registry.require_parameter(&name)?;
            let replaced = if range.len() == text.len() {
                value.clone()
            } else {
                Value::String(text.replace(&text[range], &value.to_string()))
            };
            trace!(parameter = %name, "substituted parameter");

            guard.record(name);
            current = replaced;
        }
    }

    /// Resolves the strings inside a whole-value substitution. Each string
    /// starts from the names already substituted on the way in.
    fn resolve_nested(&self, value: Value, registry: &Registry, alias: &str, guard: &ReplacementGuard) -> DiResult<Value> {
        match value {
            Value::String(text) => self.resolve_text(&text, registry, alias, &mut guard.clone()),
            Value::List(items) => items
                .into_iter()
                .map(|item| self.resolve_nested(item, registry, alias, guard))
                .collect::<DiResult<Vec<_>>>()
                .map(Value::List),
            Value::Map(map) => map
                .into_iter()
                .map(|(key, item)| Ok((key, self.resolve_nested(item, registry, alias, guard)?)))
                .collect::<DiResult<IndexMap<_, _>>>()
                .map(Value::Map),
            scalar => Ok(scalar),
        }
    }

    /// Expands `#tag` to the list of services in that collection.
    ///
    /// An unknown tag yields an empty list. Non-tag values pass through.
    pub fn resolve_tag(&self, value: Value, container: &Container) -> DiResult<Injected> {
        let tag = match value {
            Value::String(tag) if is_tag_reference(&tag) => tag,
            other => return Ok(Injected::Value(other)),
        };

        match container.registry().get(&tag) {
            None => Ok(Injected::List(Vec::new())),
            Some(Entry::Tags(collection)) => collection
                .services()
                .iter()
                .map(|key| container.get(key).map(Injected::Service))
                .collect::<DiResult<Vec<_>>>()
                .map(Injected::List),
            Some(_) => Err(DiError::Reference(format!(
                "Could not resolve the tag collection for '{}'. The collection was invalid",
                tag
            ))),
        }
    }

    /// Resolves one definition argument, recursing into sequences and
    /// mappings.
    ///
    /// Strings go through service, then parameter, then tag resolution.
    pub fn resolve_argument(&self, arg: &Argument, container: &Container, alias: &str) -> DiResult<Injected> {
        match arg {
            Argument::Scalar(value) => Ok(Injected::Value(value.clone())),
            Argument::Text(text) => match self.resolve_service(text, container, alias)? {
                Injected::Value(value) => {
                    let value = self.resolve_parameter(value, container.registry(), alias)?;
                    self.resolve_tag(value, container)
                }
                service => Ok(service),
            },
            Argument::List(items) => items
                .iter()
                .map(|item| self.resolve_argument(item, container, alias))
                .collect::<DiResult<Vec<_>>>()
                .map(Injected::List),
            Argument::Map(map) => map
                .iter()
                .map(|(key, item)| Ok((key.clone(), self.resolve_argument(item, container, alias)?)))
                .collect::<DiResult<IndexMap<_, _>>>()
                .map(Injected::Map),
        }
    }
}
