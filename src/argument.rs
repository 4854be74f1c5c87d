//! Constructor and setter arguments, before and after resolution.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;
use crate::{DiError, DiResult};

/// A built service instance, shared by every consumer of its key.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// An instance still owned by its constructor, before setter injection.
pub type AnyBox = Box<dyn Any + Send + Sync>;

/// Argument as written in a service definition.
///
/// Strings are kept apart from the other scalars because only strings can
/// carry `@service`, `%parameter%` or `#tag` references.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Null, boolean or number, injected verbatim
    Scalar(Value),
    /// String that may hold a reference
    Text(String),
    List(Vec<Argument>),
    Map(IndexMap<String, Argument>),
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Argument::Text(s),
            Value::List(items) => Argument::List(items.into_iter().map(Argument::from).collect()),
            Value::Map(map) => Argument::Map(map.into_iter().map(|(k, v)| (k, Argument::from(v))).collect()),
            scalar => Argument::Scalar(scalar),
        }
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

/// Argument after every reference has been resolved.
#[derive(Clone)]
pub enum Injected {
    /// Literal or parameter value
    Value(Value),
    /// Built service
    Service(Instance),
    List(Vec<Injected>),
    Map(IndexMap<String, Injected>),
}

impl Injected {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Injected::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&Instance> {
        match self {
            Injected::Service(instance) => Some(instance),
            _ => None,
        }
    }

    /// Converts back into a plain [`Value`]; `None` when a service is nested
    /// anywhere inside.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Injected::Value(value) => Some(value.clone()),
            Injected::Service(_) => None,
            Injected::List(items) => items.iter().map(Injected::to_value).collect::<Option<Vec<_>>>().map(Value::List),
            Injected::Map(map) => map
                .iter()
                .map(|(k, v)| v.to_value().map(|v| (k.clone(), v)))
                .collect::<Option<IndexMap<_, _>>>()
                .map(Value::Map),
        }
    }

    /// Downcasts a service argument to its concrete type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.as_service().and_then(|instance| instance.clone().downcast::<T>().ok())
    }

    fn kind(&self) -> &'static str {
        match self {
            Injected::Value(value) => value.type_name(),
            Injected::Service(_) => "service",
            Injected::List(_) => "sequence",
            Injected::Map(_) => "mapping",
        }
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Injected::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Injected::Service(_) => f.write_str("Service(..)"),
            Injected::List(items) => f.debug_list().entries(items).finish(),
            Injected::Map(map) => f.debug_map().entries(map).finish(),
        }
    }
}

impl From<Value> for Injected {
    fn from(value: Value) -> Self {
        Injected::Value(value)
    }
}

/// Positional arguments handed to constructors, factories and setters.
///
/// The typed accessors fail with [`DiError::InvalidArgument`] when the
/// argument is missing or has another shape, so constructor closures can
/// use `?` throughout.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::{Arguments, Injected, Value};
///
/// let args = Arguments::new(vec![Injected::from(Value::from("smtp")), Injected::from(Value::from(25))]);
/// assert_eq!(args.str(0).unwrap(), "smtp");
/// assert_eq!(args.i64(1).unwrap(), 25);
/// assert!(args.str(2).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    items: Vec<Injected>,
}

impl Arguments {
    pub fn new(items: Vec<Injected>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Injected> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Injected> {
        self.items.iter()
    }

    pub fn into_inner(self) -> Vec<Injected> {
        self.items
    }

    fn require(&self, index: usize) -> DiResult<&Injected> {
        self.items.get(index).ok_or_else(|| DiError::InvalidArgument {
            index,
            reason: format!("only {} argument(s) were given", self.items.len()),
        })
    }

    fn mismatch(index: usize, expected: &str, found: &Injected) -> DiError {
        DiError::InvalidArgument {
            index,
            reason: format!("expected {}, found {}", expected, found.kind()),
        }
    }

    /// Argument as a plain value (sequences of values are accepted).
    pub fn value(&self, index: usize) -> DiResult<Value> {
        let arg = self.require(index)?;
        arg.to_value().ok_or_else(|| Self::mismatch(index, "a value", arg))
    }

    pub fn str(&self, index: usize) -> DiResult<&str> {
        match self.require(index)? {
            Injected::Value(Value::String(s)) => Ok(s),
            other => Err(Self::mismatch(index, "a string", other)),
        }
    }

    pub fn string(&self, index: usize) -> DiResult<String> {
        self.str(index).map(str::to_string)
    }

    pub fn i64(&self, index: usize) -> DiResult<i64> {
        match self.require(index)? {
            Injected::Value(Value::Integer(i)) => Ok(*i),
            other => Err(Self::mismatch(index, "an integer", other)),
        }
    }

    pub fn f64(&self, index: usize) -> DiResult<f64> {
        match self.require(index)? {
            Injected::Value(Value::Float(x)) => Ok(*x),
            Injected::Value(Value::Integer(i)) => Ok(*i as f64),
            other => Err(Self::mismatch(index, "a number", other)),
        }
    }

    pub fn bool(&self, index: usize) -> DiResult<bool> {
        match self.require(index)? {
            Injected::Value(Value::Bool(b)) => Ok(*b),
            other => Err(Self::mismatch(index, "a boolean", other)),
        }
    }

    /// Argument as a service of type `T`.
    pub fn service<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        let arg = self.require(index)?;
        arg.downcast::<T>()
            .ok_or_else(|| Self::mismatch(index, type_name::<T>(), arg))
    }

    /// Argument as a sequence of services of type `T`, e.g. a `#tag`.
    pub fn services<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Vec<Arc<T>>> {
        match self.require(index)? {
            Injected::List(items) => items
                .iter()
                .map(|item| {
                    item.downcast::<T>()
                        .ok_or_else(|| Self::mismatch(index, type_name::<T>(), item))
                })
                .collect(),
            other => Err(Self::mismatch(index, "a sequence of services", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Transport;

    #[test]
    fn argument_from_value_keeps_strings_apart() {
        let arg = Argument::from(Value::from(json!(["@mailer", 3, {"k": "%p%"}])));
        assert_eq!(
            arg,
            Argument::List(vec![
                Argument::Text("@mailer".into()),
                Argument::Scalar(Value::Integer(3)),
                Argument::Map([("k".to_string(), Argument::Text("%p%".into()))].into_iter().collect()),
            ])
        );
    }

    #[test]
    fn typed_accessors() {
        let transport: Instance = Arc::new(Transport);
        let args = Arguments::new(vec![
            Injected::Value(Value::from(2.5)),
            Injected::Value(Value::from(true)),
            Injected::Service(transport.clone()),
            Injected::List(vec![Injected::Service(transport)]),
            Injected::List(vec![Injected::Value(Value::from(1)), Injected::Value(Value::from(2))]),
        ]);

        assert_eq!(args.f64(0).unwrap(), 2.5);
        assert!(args.bool(1).unwrap());
        assert!(args.service::<Transport>(2).is_ok());
        assert_eq!(args.services::<Transport>(3).unwrap().len(), 1);
        assert_eq!(args.value(4).unwrap(), Value::from(json!([1, 2])));

        assert!(matches!(args.i64(0), Err(DiError::InvalidArgument { index: 0, .. })));
        assert!(args.service::<String>(2).is_err());
        assert!(args.value(2).is_err());
        assert!(matches!(args.str(9), Err(DiError::InvalidArgument { index: 9, .. })));
    }
}
