#![allow(dead_code)]

use ferrous_syringe::{ClassRegistry, Container, ContainerBuilder, DiResult, Value};
use std::sync::Arc;

#[derive(Debug)]
pub struct Transport {
    pub host: String,
    pub port: i64,
}

pub struct TransportFactory {
    pub prefix: String,
}

pub struct Mailer {
    pub transport: Arc<Transport>,
    pub sender: String,
    pub headers: Vec<String>,
}

pub struct Listener {
    pub name: String,
}

pub struct Dispatcher {
    pub listeners: Vec<Arc<Listener>>,
}

/// Records its arguments, and anything pushed through setters.
#[derive(Debug)]
pub struct Echo {
    pub args: Vec<Value>,
    pub pushed: Vec<Value>,
}

pub struct Node {
    pub next: Option<Arc<Node>>,
}

pub fn classes() -> ClassRegistry {
    let mut classes = ClassRegistry::new();
    classes
        .register::<Transport>("Transport")
        .constructor(|args| Ok(Transport { host: args.string(0)?, port: args.i64(1)? }))
        .setter("setPort", |transport, args| {
            transport.port = args.i64(0)?;
            Ok(())
        });
    classes
        .register::<TransportFactory>("TransportFactory")
        .constructor(|args| Ok(TransportFactory { prefix: args.string(0)? }))
        .static_factory("localhost", |args| Ok(Transport { host: "localhost".into(), port: args.i64(0)? }))
        .factory_method("create", |factory: &TransportFactory, args| {
            Ok(Transport { host: format!("{}{}", factory.prefix, args.str(0)?), port: 25 })
        });
    classes
        .register::<Mailer>("Mailer")
        .constructor(|args| {
            Ok(Mailer { transport: args.service(0)?, sender: args.string(1)?, headers: Vec::new() })
        })
        .setter("addHeader", |mailer, args| {
            mailer.headers.push(args.string(0)?);
            Ok(())
        });
    classes
        .register::<Listener>("Listener")
        .constructor(|args| Ok(Listener { name: args.string(0)? }));
    classes
        .register::<Dispatcher>("Dispatcher")
        .constructor(|args| Ok(Dispatcher { listeners: args.services(0)? }));
    classes
        .register::<Echo>("Echo")
        .constructor(|args| {
            let values = (0..args.len()).map(|i| args.value(i)).collect::<DiResult<Vec<_>>>()?;
            Ok(Echo { args: values, pushed: Vec::new() })
        })
        .setter("push", |echo, args| {
            echo.pushed.push(args.value(0)?);
            Ok(())
        });
    classes
        .register::<Node>("Node")
        .constructor(|args| {
            let next = if args.is_empty() { None } else { Some(args.service(0)?) };
            Ok(Node { next })
        });
    classes
}

pub fn build(tree: serde_json::Value) -> DiResult<Container> {
    let mut builder = ContainerBuilder::new(classes());
    builder.add_config_tree(Value::from(tree));
    builder.create_container()
}

#[cfg(feature = "yaml")]
pub fn build_yaml(yaml: &str) -> DiResult<Container> {
    let tree: Value = serde_yaml::from_str(yaml).expect("fixture YAML parses");
    let mut builder = ContainerBuilder::new(classes());
    builder.add_config_tree(tree);
    builder.create_container()
}

pub fn echo_args(container: &Container, key: &str) -> Vec<Value> {
    container.get_as::<Echo>(key).expect("echo service builds").args.clone()
}
