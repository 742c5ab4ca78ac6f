//! Value: the closed set of natively round-tripped shapes.
//!
//! Anything a caller writes through ledgerkv is a [`Value`]. The set is
//! closed on purpose: each variant has an explicit, tagged wire encoding
//! (see [`crate::codec`]) so a read recovers the exact type without
//! guessing. Arbitrary application objects go through [`Value::opaque`],
//! which is one-way by design: decode hands back the string, never an
//! attempt at reconstruction.

use std::collections::BTreeMap;
use std::fmt;

/// A native value, as stored and retrieved.
///
/// Integer and float are distinct variants and stay distinct across a
/// round trip; `Value::Int(3)` never comes back as `Value::Float(3.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Str(String),
    /// Explicit null.
    Null,
    /// Ordered list of values.
    List(Vec<Value>),
    /// Mapping from string keys to values, ordered by key.
    Map(BTreeMap<String, Value>),
    /// Lossy textual fallback for anything outside the closed set.
    ///
    /// Round trips as the string it holds, nothing more.
    Opaque(String),
}

impl Value {
    /// Stringify an arbitrary displayable object into the lossy fallback.
    pub fn opaque(v: impl fmt::Display) -> Self {
        Value::Opaque(v.to_string())
    }

    /// Get the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the float, if this is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the bool, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the string, if this is one. Opaque values also answer here.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Opaque(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list, if this is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the map, if this is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Check for null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(entries: BTreeMap<String, T>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
