//! Bringing data from the embedding program into the runtime.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::Value;

/// A datum as the host program sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Seq(Vec<HostValue>),
    Tuple(Vec<HostValue>),
    Map(Vec<(HostValue, HostValue)>),
    Set(Vec<HostValue>),
    /// Something the runtime has no counterpart for, described by its type name.
    Opaque(String),
}

impl Runtime {
    /// Convert a host datum into a runtime value. Texts are interned;
    /// sequences become lists and tuples stay tuples.
    pub fn value_from_host(&self, value: HostValue) -> Result<Value> {
        Ok(match value {
            HostValue::Null => Value::None,
            HostValue::Bool(b) => Value::Bool(b),
            HostValue::Int(i) => Value::Int(i),
            HostValue::Float(f) => Value::Double(f),
            HostValue::Text(s) => Value::String(self.intern(&s)),
            HostValue::Seq(items) => Value::list(
                items
                    .into_iter()
                    .map(|v| self.value_from_host(v))
                    .collect::<Result<Vec<_>>>()?,
            ),
            HostValue::Tuple(items) => Value::tuple(
                items
                    .into_iter()
                    .map(|v| self.value_from_host(v))
                    .collect::<Result<Vec<_>>>()?,
            ),
            HostValue::Map(entries) => Value::dict(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((self.value_from_host(k)?, self.value_from_host(v)?)))
                    .collect::<Result<Vec<_>>>()?,
            )?,
            HostValue::Set(items) => Value::set(
                items
                    .into_iter()
                    .map(|v| self.value_from_host(v))
                    .collect::<Result<Vec<_>>>()?,
            )?,
            HostValue::Opaque(type_name) => {
                return Err(RuntimeError::type_error(format!(
                    "unsupported host value of type '{}'",
                    type_name
                )))
            }
        })
    }
}

impl From<()> for HostValue {
    fn from(_: ()) -> Self {
        HostValue::Null
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i64> for HostValue {
    fn from(i: i64) -> Self {
        HostValue::Int(i)
    }
}

impl From<i32> for HostValue {
    fn from(i: i32) -> Self {
        HostValue::Int(i.into())
    }
}

impl From<f64> for HostValue {
    fn from(f: f64) -> Self {
        HostValue::Float(f)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Text(s.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Text(s)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(HostValue::Null, Into::into)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(v: Vec<T>) -> Self {
        HostValue::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for HostValue
where
    K: Into<HostValue>,
    V: Into<HostValue>,
{
    fn from(map: HashMap<K, V, S>) -> Self {
        HostValue::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<T: Into<HostValue>, S> From<HashSet<T, S>> for HostValue {
    fn from(set: HashSet<T, S>) -> Self {
        HostValue::Set(set.into_iter().map(Into::into).collect())
    }
}
