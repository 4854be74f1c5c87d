//! # ferrous-syringe
//!
//! Configuration-driven dependency injection: services and parameters are
//! declared in YAML or JSON files, cross-referenced by string, and built
//! lazily on first access.
//!
//! ## Features
//!
//! - **References**: `@service`, `%parameter%` (spliced or whole-value) and `#tag`
//! - **File composition**: `inherit` and `imports` with recursive merging and cycle detection
//! - **Templates**: `abstract` definitions reused through `extends`
//! - **Factories**: constructors, static factories and factory services
//! - **Setter injection**: `calls`, plus `extensions` contributed by other files
//! - **Aliased scopes**: load a file under a namespace prefix
//! - **Lazy singletons**: every service is built once, on demand, with cycle detection
//!
//! ## Quick Start
//!
//! Constructible types are registered in a [`ClassRegistry`] under the name
//! the configuration refers to:
//!
//! ```rust
//! use ferrous_syringe::{ClassRegistry, ContainerBuilder, Value};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct Transport {
//!     host: String,
//! }
//!
//! struct Mailer {
//!     transport: Arc<Transport>,
//!     sender: String,
//! }
//!
//! let mut classes = ClassRegistry::new();
//! classes
//!     .register::<Transport>("Transport")
//!     .constructor(|args| Ok(Transport { host: args.string(0)? }));
//! classes
//!     .register::<Mailer>("Mailer")
//!     .constructor(|args| {
//!         Ok(Mailer { transport: args.service(0)?, sender: String::new() })
//!     })
//!     .setter("setSender", |mailer, args| {
//!         mailer.sender = args.string(0)?;
//!         Ok(())
//!     });
//!
//! let mut builder = ContainerBuilder::new(classes);
//! builder.add_config_tree(Value::from(json!({
//!     "parameters": {
//!         "mail.host": "smtp.example.com",
//!         "mail.sender": "noreply@%mail.domain%",
//!         "mail.domain": "example.com"
//!     },
//!     "services": {
//!         "transport": {"class": "Transport", "arguments": ["%mail.host%"]},
//!         "mailer": {
//!             "class": "Mailer",
//!             "arguments": ["@transport"],
//!             "calls": [{"method": "setSender", "arguments": ["%mail.sender%"]}]
//!         }
//!     }
//! })));
//!
//! let container = builder.create_container().unwrap();
//! let mailer = container.get_as::<Mailer>("mailer").unwrap();
//! assert_eq!(mailer.transport.host, "smtp.example.com");
//! assert_eq!(mailer.sender, "noreply@example.com");
//! ```
//!
//! ## Tags
//!
//! ```rust
//! use ferrous_syringe::{ClassRegistry, ContainerBuilder, Value};
//! use serde_json::json;
//!
//! struct Listener(&'static str);
//! struct Dispatcher(usize);
//!
//! let mut classes = ClassRegistry::new();
//! classes.register::<Listener>("Listener").constructor(|_| Ok(Listener("on")));
//! classes
//!     .register::<Dispatcher>("Dispatcher")
//!     .constructor(|args| Ok(Dispatcher(args.services::<Listener>(0)?.len())));
//!
//! let mut builder = ContainerBuilder::new(classes);
//! builder.add_config_tree(Value::from(json!({
//!     "services": {
//!         "audit": {"class": "Listener", "tags": ["events"]},
//!         "metrics": {"class": "Listener", "tags": ["events"]},
//!         "dispatcher": {"class": "Dispatcher", "arguments": ["#events"]}
//!     }
//! })));
//!
//! let container = builder.create_container().unwrap();
//! assert_eq!(container.get_as::<Dispatcher>("dispatcher").unwrap().0, 2);
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`DiError`]; [`DiError::kind`] groups them into load,
//! definition, reference, construction-cycle and construction errors. A
//! failed build returns no container. A failed service access leaves the
//! service unbuilt.

pub mod argument;
pub mod builder;
pub mod classes;
pub mod config;
pub mod container;
pub mod definition;
pub mod error;
pub mod factory;
pub mod key;
pub mod loader;
pub mod merge;
pub mod observer;
pub mod registration;
pub mod resolver;
pub mod value;

mod internal;

pub use argument::{AnyBox, Argument, Arguments, Injected, Instance};
pub use builder::ContainerBuilder;
pub use classes::{ClassBuilder, ClassDescriptor, ClassRegistry};
pub use config::{BuilderConfig, FileEntry, PATH_ENV_VAR};
pub use container::Container;
pub use definition::{Extension, FactoryRef, MethodCall, ServiceDefinition};
pub use error::{DiError, DiResult, ErrorKind};
pub use factory::ConstructionRequest;
pub use key::{alias_key, is_tag_reference, service_name, tag_key, PARAMETER_CHAR, SERVICE_CHAR, TAG_CHAR};
pub use loader::{default_loaders, JsonLoader, Loader};
#[cfg(feature = "yaml")]
pub use loader::YamlLoader;
pub use merge::merge_recursive;
pub use observer::{BuildObserver, TracingObserver};
pub use registration::{Entry, Registry, ServiceRegistration, TagCollection};
pub use resolver::{ReferenceResolver, ReplacementGuard, MAX_SUBSTITUTIONS};
pub use value::{Map, Value};
