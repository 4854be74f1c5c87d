//! Lazy construction of service instances.

use tracing::trace;

use crate::argument::{Argument, Arguments, Instance};
use crate::container::Container;
use crate::definition::{Extension, FactoryRef, MethodCall};
use crate::resolver::ReferenceResolver;
use crate::{DiError, DiResult};

/// Everything needed to build one service, captured at build time.
///
/// Arguments stay unresolved until the service is first requested.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionRequest {
    /// Fully aliased service key
    pub key: String,
    /// Resolved class name
    pub class: String,
    pub factory: FactoryRef,
    pub arguments: Vec<Argument>,
    pub calls: Vec<MethodCall>,
    /// Setter calls added by `extensions` sections, in load order
    pub extensions: Vec<Extension>,
    /// Alias scope of the definition
    pub alias: String,
}

/// Builds instances from construction requests against one container.
pub(crate) struct ServiceFactory<'a> {
    container: &'a Container,
    resolver: ReferenceResolver,
}

impl<'a> ServiceFactory<'a> {
    pub(crate) fn new(container: &'a Container) -> Self {
        Self {
            container,
            resolver: ReferenceResolver::new(),
        }
    }

    /// Resolves every argument, instantiates, then applies setter calls.
    ///
    /// All arguments (constructor and setters alike) are resolved before the
    /// instance exists, so dependencies are built depth first.
    pub(crate) fn create_service(&self, request: &ConstructionRequest) -> DiResult<Instance> {
        trace!(service = %request.key, class = %request.class, "resolving arguments");
        let arguments = self.resolve_arguments(&request.arguments, &request.alias)?;

        let mut calls = Vec::with_capacity(request.calls.len());
        for call in &request.calls {
            calls.push((call.method.as_str(), self.resolve_arguments(&call.arguments, &request.alias)?));
        }
        for extension in &request.extensions {
            for call in &extension.calls {
                calls.push((call.method.as_str(), self.resolve_arguments(&call.arguments, &extension.alias)?));
            }
        }

        let classes = self.container.classes();
        let class = classes.require(&request.class)?;
        let mut instance = match &request.factory {
            FactoryRef::Direct => class.construct(&arguments),
            FactoryRef::Static { class: factory_class, method } => {
                classes.require(factory_class)?.call_static(method, &arguments)
            }
            FactoryRef::Service { key, method } => {
                if !self.container.has(key) {
                    return Err(DiError::Reference(format!(
                        "The factory service '{}' for '{}' doesn't exist",
                        key, request.key
                    )));
                }
                let factory = self.container.get(key)?;
                let factory_class = self.container.class_of(key)?;
                factory_class.call_method(factory.as_ref(), method, &arguments)
            }
        }
        .map_err(|err| with_service_context(&request.key, err))?;

        for (method, arguments) in &calls {
            trace!(service = %request.key, method, "calling setter");
            class
                .call_setter(instance.as_mut(), method, arguments)
                .map_err(|err| with_service_context(&request.key, err))?;
        }

        Ok(Instance::from(instance))
    }

    fn resolve_arguments(&self, arguments: &[Argument], alias: &str) -> DiResult<Arguments> {
        arguments
            .iter()
            .map(|arg| self.resolver.resolve_argument(arg, self.container, alias))
            .collect::<DiResult<Vec<_>>>()
            .map(Arguments::new)
    }
}

/// Attaches the service key to errors raised by user callables.
fn with_service_context(service: &str, err: DiError) -> DiError {
    match err {
        DiError::InvalidArgument { .. } | DiError::TypeMismatch(_) => DiError::construction(service, err.to_string()),
        other => other,
    }
}
