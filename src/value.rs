//! Bolt values carried in parameters, records and metadata.

use std::collections::BTreeMap;

use crate::bookmark::Bookmark;

/// Key/value metadata attached to requests and responses.
pub type Metadata = BTreeMap<String, Value>;

/// A Bolt value.
///
/// Structural types (nodes, relationships, paths, temporal values) are
/// encoded by the execution engine; this crate only needs the core types to
/// build protocol metadata and pass parameters and records through.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Metadata),
}

impl Value {
    /// Returns true if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer if this is an `Integer`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the boolean if this is a `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the elements if this is a `List`.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
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

impl From<&Bookmark> for Value {
    fn from(value: &Bookmark) -> Self {
        Value::String(value.as_str().to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Metadata> for Value {
    fn from(value: Metadata) -> Self {
        Value::Map(value)
    }
}

/// Build a `Metadata` map from `key => value` pairs.
///
/// ```
/// let meta = zero_bolt::metadata! { "has_more" => true };
/// assert_eq!(meta["has_more"], zero_bolt::Value::Boolean(true));
/// ```
#[macro_export]
macro_rules! metadata {
    () => { $crate::value::Metadata::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::Metadata::new();
        $(map.insert(::std::string::String::from($key), $crate::value::Value::from($value));)+
        map
    }};
}
