//! Configuration tree values.
//!
//! A loader turns one file into a [`Value::Map`]; parameters keep whatever
//! shape they were declared with. Map order is the declaration order of the
//! source document.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{DiError, DiResult};

/// Ordered string-keyed mapping used for configuration trees.
pub type Map = IndexMap<String, Value>;

/// A configuration value: scalar, sequence or mapping.
///
/// # Examples
///
/// ```rust
/// use ferrous_syringe::Value;
///
/// let port = Value::from(8080);
/// assert_eq!(port.as_i64().unwrap(), 8080);
/// assert_eq!(port.to_string(), "8080");
///
/// let hosts = Value::from(vec![Value::from("a"), Value::from("b")]);
/// assert_eq!(hosts.to_string(), r#"["a","b"]"#);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Try to view as string
    pub fn as_str(&self) -> DiResult<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(DiError::TypeMismatch(format!("expected a string, found {}", other.type_name()))),
        }
    }

    /// Try to convert to integer
    pub fn as_i64(&self) -> DiResult<i64> {
        match self {
            Value::Integer(i) => Ok(*i),
            other => Err(DiError::TypeMismatch(format!("expected an integer, found {}", other.type_name()))),
        }
    }

    /// Try to convert to float; integers widen
    pub fn as_f64(&self) -> DiResult<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            other => Err(DiError::TypeMismatch(format!("expected a number, found {}", other.type_name()))),
        }
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(DiError::TypeMismatch(format!("expected a boolean, found {}", other.type_name()))),
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// True for null, `false`, `0`, `0.0`, `""`, `"0"` and empty collections.
    ///
    /// Definition fields such as `class`, `extends` or `factoryMethod` count
    /// as absent when blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Integer(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty() || s == "0",
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }
}

/// String form used when a parameter is spliced into surrounding text.
///
/// Scalars render bare; sequences and mappings render as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::List(_) | Value::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(fields) => {
                Value::Map(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_conversions() {
        let string_val = Value::from("hello");
        let int_val = Value::from(42);
        let bool_val = Value::from(true);

        assert_eq!(string_val.as_str().unwrap(), "hello");
        assert_eq!(int_val.as_i64().unwrap(), 42);
        assert_eq!(int_val.as_f64().unwrap(), 42.0);
        assert!(bool_val.as_bool().unwrap());

        assert!(string_val.as_i64().is_err());
        assert!(int_val.as_str().is_err());
    }

    #[test]
    fn test_blank_values() {
        for blank in [json!(null), json!(false), json!(0), json!(""), json!("0"), json!([]), json!({})] {
            assert!(Value::from(blank.clone()).is_blank(), "{blank} should be blank");
        }
        for filled in [json!(true), json!(1), json!("x"), json!([0]), json!({"a": null})] {
            assert!(!Value::from(filled.clone()).is_blank(), "{filled} should not be blank");
        }
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::from(json!([1, 2, 3])).to_string(), "[1,2,3]");
        assert_eq!(Value::from(json!({"a": "b"})).to_string(), r#"{"a":"b"}"#);
    }

    #[test]
    fn test_json_conversion_maps_objects() {
        let value = Value::from(json!({"zeta": 1, "alpha": {"beta": 2}}));
        assert_eq!(value.as_map().unwrap().len(), 2);
        assert_eq!(value.get("zeta"), Some(&Value::Integer(1)));
        assert_eq!(value.get("alpha").and_then(|a| a.get("beta")), Some(&Value::Integer(2)));
        assert_eq!(Value::from(json!(u64::MAX)).type_name(), "float");
    }

    #[test]
    fn test_json_conversion_keeps_key_order() {
        let value = Value::from(json!({"zeta": 1, "alpha": 2, "mid": {"z": 3, "a": 4}}));
        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        let nested: Vec<&str> = value.get("mid").unwrap().as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(nested, ["z", "a"]);
    }

    #[test]
    fn test_deserialize_untagged() {
        let value: Value = serde_json::from_str(r#"{"a": [1, 2.5, "x", true, null]}"#).unwrap();
        assert_eq!(
            value.get("a").unwrap().as_list().unwrap(),
            &vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Bool(true),
                Value::Null
            ]
        );
    }
}
