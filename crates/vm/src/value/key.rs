use std::hash::{Hash, Hasher};

use smy_util::by_ptr::AsCmpPtr;
use smy_util::string::Str;

use crate::error::{Result, RuntimeError};

use super::Value;

/// A [`Value`] admitted as a dict key or set member.
///
/// Lists, dicts and sets are mutable and never hashed; [`Key::new`] rejects
/// them. Everything else hashes the same way [`Value`]'s equality compares:
/// scalars and strings by payload, the rest by identity.
#[derive(Clone)]
pub struct Key(Value);

impl Key {
    pub fn new(value: Value) -> Result<Key> {
        match value {
            Value::List(_) | Value::Dict(_) | Value::Set(_) => Err(RuntimeError::type_error(
                format!("unhashable type: '{}'", value.type_name()),
            )),
            value => Ok(Key(value)),
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Str> for Key {
    fn from(s: Str) -> Self {
        Key(Value::String(s))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::None => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            // 0.0 == -0.0, so both must land on the same hash
            Value::Double(d) if *d == 0.0 => 0u64.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::Tuple(t) => t.ptr_hash(state),
            Value::Class(c) => c.ptr_hash(state),
            Value::Object(o) => o.ptr_hash(state),
            Value::Func(f) => f.ptr_hash(state),
            Value::Builtin(b) => b.ptr_hash(state),
            Value::Method(m) => {
                m.receiver().ptr_hash(state);
                m.func().ptr_hash(state);
            }
            Value::List(_) | Value::Dict(_) | Value::Set(_) => {
                unreachable!("Key::new rejects mutable containers")
            }
        }
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}
