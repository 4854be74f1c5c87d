//! Registers the `parameters`, `services` and `extensions` sections of a
//! merged tree.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::classes::ClassRegistry;
use crate::definition::{parse_calls, Extension, FactoryRef, MethodCall, ServiceDefinition};
use crate::factory::ConstructionRequest;
use crate::key::{abstract_key, alias_key, service_name, tag_key};
use crate::merge::merge_recursive;
use crate::registration::{Entry, Registry};
use crate::resolver::ReferenceResolver;
use crate::value::{Map, Value};
use crate::{DiError, DiResult};

const ABSTRACT_FIELD: &str = "abstract";

/// Accumulates definitions from every queued tree into one registry.
pub(crate) struct DefinitionProcessor<'a> {
    classes: &'a ClassRegistry,
    resolver: ReferenceResolver,
    registry: Registry,
    abstracts: HashMap<String, Value>,
    extensions: Vec<(String, Extension)>,
}

impl<'a> DefinitionProcessor<'a> {
    pub(crate) fn new(classes: &'a ClassRegistry) -> Self {
        Self {
            classes,
            resolver: ReferenceResolver::new(),
            registry: Registry::new(),
            abstracts: HashMap::new(),
            extensions: Vec::new(),
        }
    }

    /// Stores every parameter under its aliased key, unresolved.
    pub(crate) fn process_parameters(&mut self, config: &Value, alias: &str) -> DiResult<()> {
        let Some(parameters) = section(config, "parameters")? else {
            return Ok(());
        };
        for (key, value) in parameters {
            let key = alias_key(key, alias);
            trace!(parameter = %key, "registered parameter");
            self.registry.set_parameter(key, value.clone());
        }
        Ok(())
    }

    /// Registers the services of one tree: abstract templates first, then
    /// every concrete definition.
    pub(crate) fn process_services(&mut self, config: &Value, alias: &str) -> DiResult<()> {
        let Some(services) = section(config, "services")? else {
            return Ok(());
        };

        let mut concrete = Vec::with_capacity(services.len());
        for (key, definition) in services {
            if definition.get(ABSTRACT_FIELD).is_some_and(|flag| !flag.is_blank()) {
                let mut template = definition.clone();
                if let Some(fields) = template.as_map_mut() {
                    fields.shift_remove(ABSTRACT_FIELD);
                }
                trace!(service = %key, "stored abstract definition");
                self.abstracts.insert(abstract_key(key, alias), template);
            } else {
                concrete.push((key, definition));
            }
        }

        for (key, definition) in concrete {
            self.register_service(&alias_key(key, alias), definition, alias)?;
        }
        Ok(())
    }

    /// Queues setter calls for already-defined services.
    pub(crate) fn process_extensions(&mut self, config: &Value, alias: &str) -> DiResult<()> {
        let Some(extensions) = section(config, "extensions")? else {
            return Ok(());
        };
        for (key, calls) in extensions {
            let key = alias_key(service_name(key).unwrap_or(key), alias);
            let calls = parse_calls(Some(calls), &key)?;
            self.extensions.push((
                key,
                Extension {
                    alias: alias.to_string(),
                    calls,
                },
            ));
        }
        Ok(())
    }

    /// Attaches queued extensions and hands over the finished registry.
    pub(crate) fn finish(mut self) -> DiResult<Registry> {
        for (key, extension) in std::mem::take(&mut self.extensions) {
            let Some(Entry::Service(registration)) = self.registry.get_mut(&key) else {
                return Err(DiError::Definition(format!(
                    "Cannot extend '{}': no service of that name is defined",
                    key
                )));
            };
            let class = self.classes.require(&registration.request.class)?;
            validate_calls(class.name(), &key, &extension.calls, |method| class.has_setter(method))?;
            debug!(service = %key, calls = extension.calls.len(), "applied extension");
            registration.request.extensions.push(extension);
        }
        Ok(self.registry)
    }

    fn register_service(&mut self, key: &str, definition: &Value, alias: &str) -> DiResult<()> {
        if definition.as_map().is_none() {
            return Err(DiError::Definition(format!(
                "A service definition must be an associative array ('{}')",
                key
            )));
        }

        let merged;
        let definition = match definition.get("extends").filter(|target| !target.is_blank()) {
            Some(target) => {
                let target = target.as_str().map_err(|_| {
                    DiError::Definition(format!("The 'extends' field of '{}' must be a service name", key))
                })?;
                let target = service_name(target).unwrap_or(target);
                let template = self.abstracts.get(&abstract_key(target, alias)).ok_or_else(|| {
                    DiError::Definition(format!(
                        "The service definition for '{}' extends '{}' but there is no abstract definition of that name",
                        key,
                        alias_key(target, alias)
                    ))
                })?;
                merged = merge_recursive(template.clone(), definition.clone());
                &merged
            }
            None => definition,
        };

        let definition = ServiceDefinition::from_tree(key, definition, alias)?;

        if let Some(target) = &definition.alias_of {
            let target = alias_key(service_name(target).unwrap_or(target), alias);
            debug!(service = %key, target = %target, "registered service alias");
            self.registry.set_alias(key, target);
            return self.add_tags(key, &definition.tags);
        }

        if definition.stub {
            debug!(service = %key, "registered stub service");
            self.registry.set_stub(key);
            return self.add_tags(key, &definition.tags);
        }

        let (request, tags) = self.construction_request(definition)?;
        debug!(service = %key, class = %request.class, "registered service");
        self.registry.set_service(key, request);
        self.add_tags(key, &tags)
    }

    /// Validates a concrete definition and captures what construction needs.
    fn construction_request(&self, definition: ServiceDefinition) -> DiResult<(ConstructionRequest, Vec<String>)> {
        let key = definition.key.as_str();
        let raw_class = definition.class.as_deref().ok_or_else(|| {
            DiError::Definition(format!("The service definition for '{}' does not have a class", key))
        })?;

        let class_name = self.resolve_class_name(raw_class, key, &definition.alias)?;
        let class = self.classes.require(&class_name)?;
        let factory = self.factory_ref(&definition)?;

        if factory == FactoryRef::Direct && !class.is_constructible() {
            return Err(DiError::Definition(format!(
                "The service class '{}' for '{}' has no registered constructor",
                class_name, key
            )));
        }
        validate_calls(&class_name, key, &definition.calls, |method| class.has_setter(method))?;

        Ok((
            ConstructionRequest {
                key: definition.key.clone(),
                class: class_name,
                factory,
                arguments: definition.arguments,
                calls: definition.calls,
                extensions: Vec::new(),
                alias: definition.alias,
            },
            definition.tags,
        ))
    }

    /// Works out which factory shape the definition uses.
    fn factory_ref(&self, definition: &ServiceDefinition) -> DiResult<FactoryRef> {
        let key = definition.key.as_str();
        match (
            definition.factory_class.as_deref(),
            definition.factory_service.as_deref(),
            definition.factory_method.as_deref(),
        ) {
            (None, None, None) => Ok(FactoryRef::Direct),
            (None, None, Some(_)) => Err(DiError::Definition(format!(
                "The definition for '{}' has a factory method but no factory class or service",
                key
            ))),
            (Some(_), _, None) => Err(DiError::Definition(format!(
                "A factory class was specified for '{}', but no method was set",
                key
            ))),
            (None, Some(_), None) => Err(DiError::Definition(format!(
                "A factory service was specified for '{}', but no method was set",
                key
            ))),
            (Some(_), Some(_), Some(_)) => Err(DiError::Definition(format!(
                "The definition for '{}' cannot have both a factory class and a factory service",
                key
            ))),
            (Some(factory_class), None, Some(method)) => {
                let factory_class = self.resolve_class_name(factory_class, key, &definition.alias)?;
                if !self.classes.require(&factory_class)?.has_static_method(method) {
                    return Err(DiError::Definition(format!(
                        "Invalid factory definition for '{}'. The method '{}' does not exist on the class '{}'",
                        key, method, factory_class
                    )));
                }
                Ok(FactoryRef::Static {
                    class: factory_class,
                    method: method.to_string(),
                })
            }
            (None, Some(service), Some(method)) => Ok(FactoryRef::Service {
                key: alias_key(service_name(service).unwrap_or(service), &definition.alias),
                method: method.to_string(),
            }),
        }
    }

    /// Expands parameter placeholders in a class name against what has been
    /// registered so far.
    fn resolve_class_name(&self, raw: &str, key: &str, alias: &str) -> DiResult<String> {
        match self
            .resolver
            .resolve_parameter(Value::String(raw.to_string()), &self.registry, alias)?
        {
            Value::String(name) if !name.is_empty() => Ok(name),
            other => Err(DiError::Definition(format!(
                "The class of '{}' resolved to {} '{}', not a class name",
                key,
                other.type_name(),
                other
            ))),
        }
    }

    fn add_tags(&mut self, key: &str, tags: &[String]) -> DiResult<()> {
        for tag in tags {
            let tag = tag_key(tag);
            trace!(service = %key, tag = %tag, "tagged service");
            self.registry.add_tag(&tag, key)?;
        }
        Ok(())
    }
}

/// A section must be a mapping; absent and empty sections are skipped.
fn section<'v>(config: &'v Value, name: &str) -> DiResult<Option<&'v Map>> {
    match config.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Map(map)) => Ok(Some(map)),
        Some(Value::List(items)) if items.is_empty() => Ok(None),
        Some(other) => Err(DiError::Definition(format!(
            "The '{}' configuration must be an associative array, found {}",
            name,
            other.type_name()
        ))),
    }
}

fn validate_calls(class: &str, key: &str, calls: &[MethodCall], has_setter: impl Fn(&str) -> bool) -> DiResult<()> {
    match calls.iter().find(|call| !has_setter(&call.method)) {
        Some(call) => Err(DiError::Definition(format!(
            "The method '{}' does not exist on the class '{}' (called by '{}')",
            call.method, class, key
        ))),
        None => Ok(()),
    }
}
