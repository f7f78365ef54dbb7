mod display;
mod iter;
mod key;

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use fnv::{FnvHashMap, FnvHashSet};
use smy_util::by_ptr::AsCmpPtr;
use smy_util::string::Str;

use crate::call::{Builtin, Func, Method};
use crate::class::{Class, Object};
use crate::error::{Result, RuntimeError};

pub use display::Repr;
pub use iter::{Iterable, ValueIter};
pub use key::Key;

pub type DictMap = FnvHashMap<Key, Value>;
pub type SetMap = FnvHashSet<Key>;

/// Every datum the language can produce.
///
/// `None` and the two `Bool`s carry no identity of their own, which makes them
/// singletons for free. Aggregates and everything callable live behind an `Rc`
/// and compare by identity; see the [`PartialEq`] impl.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(Str),
    Tuple(Rc<[Value]>),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<DictMap>>),
    Set(Rc<RefCell<SetMap>>),
    Class(Rc<Class>),
    Object(Rc<Object>),
    Func(Rc<Func>),
    Method(Rc<Method>),
    Builtin(Rc<Builtin>),
}

#[cfg(target_pointer_width = "64")]
static_assertions::const_assert!(std::mem::size_of::<Value>() <= 24);

impl Value {
    pub fn string(s: impl Into<Str>) -> Value {
        Value::String(s.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    /// Build a dict, failing if any key is unhashable.
    pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Result<Value> {
        let map = entries
            .into_iter()
            .map(|(k, v)| Ok((Key::new(k)?, v)))
            .collect::<Result<DictMap>>()?;
        Ok(Value::Dict(Rc::new(RefCell::new(map))))
    }

    /// Build a set, failing if any member is unhashable.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Result<Value> {
        let set = items.into_iter().map(Key::new).collect::<Result<SetMap>>()?;
        Ok(Value::Set(Rc::new(RefCell::new(set))))
    }

    /// The name of this value's type, as used in diagnostics.
    pub fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "float",
            Value::String(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::Class(_) => "type",
            Value::Object(obj) => return Cow::Owned(obj.class().name().to_string()),
            Value::Func(_) => "function",
            Value::Method(_) => "method",
            Value::Builtin(_) => "builtin_function_or_method",
        })
    }

    /// Truthiness.
    ///
    /// The only falsy values are:
    ///
    /// - `None`
    /// - `False`
    /// - `0` and `0.0`
    /// - empty strings, tuples, lists, dicts and sets
    pub fn bool_value(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::List(l) => !l.borrow().is_empty(),
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::Set(s) => !s.borrow().is_empty(),
            Value::Class(_)
            | Value::Object(_)
            | Value::Func(_)
            | Value::Method(_)
            | Value::Builtin(_) => true,
        }
    }

    /// Element count of a container, or character count of a string.
    pub fn length(&self) -> Result<usize> {
        match self {
            Value::String(s) => Ok(s.char_len()),
            Value::Tuple(t) => Ok(t.len()),
            Value::List(l) => Ok(l.borrow().len()),
            Value::Dict(d) => Ok(d.borrow().len()),
            Value::Set(s) => Ok(s.borrow().len()),
            _ => Err(RuntimeError::type_error(format!(
                "object of type '{}' has no len()",
                self.type_name()
            ))),
        }
    }

    /// A restartable view over the elements of a tuple or list, or the
    /// `(key, value)` pairs of a dict.
    pub fn iterable(&self) -> Result<Iterable> {
        Iterable::new(self).ok_or_else(|| {
            RuntimeError::not_iterable(format!("'{}' object is not iterable", self.type_name()))
        })
    }

    /// The address behind a reference variant, `None` for plain data.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::None | Value::Bool(_) | Value::Int(_) | Value::Double(_) => None,
            Value::String(s) => Some(s.addr()),
            Value::Tuple(t) => Some(t.addr()),
            Value::List(l) => Some(l.addr()),
            Value::Dict(d) => Some(d.addr()),
            Value::Set(s) => Some(s.addr()),
            Value::Class(c) => Some(c.addr()),
            Value::Object(o) => Some(o.addr()),
            Value::Func(f) => Some(f.addr()),
            Value::Method(m) => Some(m.addr()),
            Value::Builtin(b) => Some(b.addr()),
        }
    }

    /// Returns `true` if the value is [`None`].
    ///
    /// [`None`]: Value::None
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        if let Self::Int(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&Str> {
        if let Self::String(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_class(&self) -> Option<&Rc<Class>> {
        if let Self::Class(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_object(&self) -> Option<&Rc<Object>> {
        if let Self::Object(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Returns `true` if the value can be invoked with [`Value::call`].
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Self::Func(_) | Self::Builtin(_) | Self::Method(_) | Self::Class(_)
        )
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,

            // aggregates and callables are equal only to themselves
            (Value::Tuple(a), Value::Tuple(b)) => AsCmpPtr::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => AsCmpPtr::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => AsCmpPtr::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => AsCmpPtr::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => AsCmpPtr::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => AsCmpPtr::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => AsCmpPtr::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => AsCmpPtr::ptr_eq(a, b),
            // bound methods are created per access; compare what they bind
            (Value::Method(a), Value::Method(b)) => a.same_binding(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<Str> for Value {
    fn from(s: Str) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<Rc<Class>> for Value {
    fn from(c: Rc<Class>) -> Self {
        Value::Class(c)
    }
}

impl From<Rc<Object>> for Value {
    fn from(o: Rc<Object>) -> Self {
        Value::Object(o)
    }
}

impl From<Rc<Func>> for Value {
    fn from(f: Rc<Func>) -> Self {
        Value::Func(f)
    }
}

impl From<Rc<Builtin>> for Value {
    fn from(b: Rc<Builtin>) -> Self {
        Value::Builtin(b)
    }
}
