//! Service definitions as read from a configuration tree.

use crate::argument::Argument;
use crate::value::Value;
use crate::{DiError, DiResult};

/// How a service instance is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryRef {
    /// The class's own constructor
    Direct,
    /// A static factory registered on another class
    Static { class: String, method: String },
    /// A factory method on another (lazily built) service
    Service { key: String, method: String },
}

/// One setter-injection call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Vec<Argument>,
}

/// Setter calls contributed by an `extensions` section, resolved under the
/// alias of the file that declared them.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub alias: String,
    pub calls: Vec<MethodCall>,
}

/// A service entry of the `services` section, after `extends` expansion.
///
/// String fields are raw: `class` and `factoryClass` may still contain
/// parameter placeholders, and no argument has been resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceDefinition {
    /// Fully aliased key
    pub key: String,
    pub class: Option<String>,
    pub factory_class: Option<String>,
    pub factory_service: Option<String>,
    pub factory_method: Option<String>,
    pub arguments: Vec<Argument>,
    pub calls: Vec<MethodCall>,
    pub alias_of: Option<String>,
    pub stub: bool,
    pub tags: Vec<String>,
    /// Alias scope the definition was loaded under
    pub alias: String,
}

impl ServiceDefinition {
    /// Reads a definition tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_syringe::{ServiceDefinition, Value};
    /// use serde_json::json;
    ///
    /// let tree = Value::from(json!({
    ///     "class": "App.Mailer",
    ///     "arguments": ["@transport", "%mailer.from%"],
    ///     "calls": [{"method": "setLogger", "arguments": ["@logger"]}],
    ///     "tags": ["notifier"]
    /// }));
    ///
    /// let definition = ServiceDefinition::from_tree("mailer", &tree, "").unwrap();
    /// assert_eq!(definition.class.as_deref(), Some("App.Mailer"));
    /// assert_eq!(definition.arguments.len(), 2);
    /// assert_eq!(definition.calls[0].method, "setLogger");
    /// assert_eq!(definition.tags, vec!["notifier".to_string()]);
    /// ```
    pub fn from_tree(key: &str, tree: &Value, alias: &str) -> DiResult<Self> {
        if tree.as_map().is_none() {
            return Err(DiError::Definition(format!(
                "A service definition must be an associative array ('{}')",
                key
            )));
        }

        Ok(Self {
            key: key.to_string(),
            class: text_field(tree, "class", key)?,
            factory_class: text_field(tree, "factoryClass", key)?,
            factory_service: text_field(tree, "factoryService", key)?,
            factory_method: text_field(tree, "factoryMethod", key)?,
            arguments: parse_arguments(tree.get("arguments"), key)?,
            calls: parse_calls(tree.get("calls"), key)?,
            alias_of: text_field(tree, "aliasOf", key)?,
            stub: flag(tree, "stub"),
            tags: parse_tags(tree.get("tags"), key)?,
            alias: alias.to_string(),
        })
    }
}

fn flag(tree: &Value, field: &str) -> bool {
    tree.get(field).is_some_and(|value| !value.is_blank())
}

/// Optional string field; blank values count as absent.
fn text_field(tree: &Value, field: &str, key: &str) -> DiResult<Option<String>> {
    match tree.get(field) {
        None => Ok(None),
        Some(value) if value.is_blank() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DiError::Definition(format!(
            "The field '{}' of '{}' must be a string, found {}",
            field,
            key,
            other.type_name()
        ))),
    }
}

/// Argument list; absent or blank means no arguments.
pub(crate) fn parse_arguments(value: Option<&Value>, key: &str) -> DiResult<Vec<Argument>> {
    match value {
        None => Ok(Vec::new()),
        Some(value) if value.is_blank() => Ok(Vec::new()),
        Some(Value::List(items)) => Ok(items.iter().cloned().map(Argument::from).collect()),
        Some(other) => Err(DiError::Definition(format!(
            "The arguments of '{}' must be a sequence, found {}",
            key,
            other.type_name()
        ))),
    }
}

/// Setter calls: a sequence of `{method, arguments}` mappings.
pub(crate) fn parse_calls(value: Option<&Value>, key: &str) -> DiResult<Vec<MethodCall>> {
    let items = match value {
        None => return Ok(Vec::new()),
        Some(value) if value.is_blank() => return Ok(Vec::new()),
        Some(Value::List(items)) => items,
        Some(other) => {
            return Err(DiError::Definition(format!(
                "The calls of '{}' must be a sequence, found {}",
                key,
                other.type_name()
            )))
        }
    };

    items
        .iter()
        .map(|call| {
            let method = match call.get("method") {
                Some(Value::String(method)) if !method.is_empty() => method.clone(),
                _ => {
                    return Err(DiError::Definition(format!(
                        "Every call of '{}' needs a non-empty 'method'",
                        key
                    )))
                }
            };
            Ok(MethodCall {
                method,
                arguments: parse_arguments(call.get("arguments"), key)?,
            })
        })
        .collect()
}

fn parse_tags(value: Option<&Value>, key: &str) -> DiResult<Vec<String>> {
    match value {
        None => Ok(Vec::new()),
        Some(value) if value.is_blank() => Ok(Vec::new()),
        Some(Value::String(tag)) => Ok(vec![tag.clone()]),
        Some(Value::List(items)) => items
            .iter()
            .map(|tag| {
                tag.as_str().map(str::to_string).map_err(|_| {
                    DiError::Definition(format!("The tags of '{}' must be strings", key))
                })
            })
            .collect(),
        Some(other) => Err(DiError::Definition(format!(
            "The tags of '{}' must be a sequence, found {}",
            key,
            other.type_name()
        ))),
    }
}
