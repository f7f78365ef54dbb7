//! Single-inheritance classes and their instances.

#[cfg(test)]
mod test;

use std::cell::RefCell;
use std::rc::Rc;

use smy_util::string::Str;

use crate::call::{with_receiver, Method};
use crate::error::{Result, RuntimeError};
use crate::frame::Names;
use crate::value::Value;

const CLASS: &str = "__class__";
const DICT: &str = "__dict__";
const NAME: &str = "__name__";
const SUPERCLASS: &str = "__superclass__";
const INIT: &str = "__init__";

/// Names resolved specially and never read from or written to an attribute map.
pub const RESERVED_ATTRS: [&str; 4] = [CLASS, DICT, NAME, SUPERCLASS];

fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRS.contains(&name)
}

/// A class: a name, an optional superclass, and its own attribute mapping.
///
/// The superclass is fixed at creation and must already exist, so the chain
/// of superclasses can never loop.
#[derive(Debug)]
pub struct Class {
    name: Str,
    superclass: Option<Rc<Class>>,
    attrs: RefCell<Names>,
}

impl Class {
    pub fn new(name: Str, superclass: Option<Rc<Class>>) -> Rc<Class> {
        Rc::new(Class {
            name,
            superclass,
            attrs: RefCell::new(Names::default()),
        })
    }

    /// A class with the attributes of a finished class body. Fails like
    /// [`Class::set_attr`] if `attrs` binds a reserved name.
    pub fn with_attrs(
        name: Str,
        superclass: Option<Rc<Class>>,
        attrs: Names,
    ) -> Result<Rc<Class>> {
        if let Some(reserved) = attrs.keys().find(|k| is_reserved(k)) {
            return Err(readonly(reserved, "type"));
        }
        Ok(Rc::new(Class {
            name,
            superclass,
            attrs: RefCell::new(attrs),
        }))
    }

    pub fn name(&self) -> &Str {
        &self.name
    }

    pub fn superclass(&self) -> Option<&Rc<Class>> {
        self.superclass.as_ref()
    }

    /// This class, then its superclass, up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |c| c.superclass.as_deref())
    }

    /// Returns `true` if `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.ancestors().any(|c| std::ptr::eq(c, other))
    }

    /// Find `name` in the nearest class of the chain that defines it.
    pub fn find_attr(&self, name: &str) -> Option<Value> {
        self.ancestors()
            .find_map(|c| c.attrs.borrow().get(name).cloned())
    }

    /// A copy of this class's own attributes.
    pub fn attrs(&self) -> Names {
        self.attrs.borrow().clone()
    }

    pub(crate) fn own_attrs(&self) -> &RefCell<Names> {
        &self.attrs
    }

    pub fn get_attr(self: &Rc<Self>, name: &str) -> Result<Value> {
        match name {
            NAME => Ok(Value::String(self.name.clone())),
            SUPERCLASS => Ok(self
                .superclass
                .clone()
                .map_or(Value::None, Value::Class)),
            DICT => names_to_dict(&self.attrs.borrow()),
            CLASS => Err(class_no_attr(&self.name, name)),
            _ => self
                .find_attr(name)
                .ok_or_else(|| class_no_attr(&self.name, name)),
        }
    }

    /// Define or replace an attribute on this class. Every instance and
    /// subclass sees the change at once.
    pub fn set_attr(&self, name: Str, value: Value) -> Result<()> {
        if is_reserved(&name) {
            return Err(readonly(&name, "type"));
        }
        self.attrs.borrow_mut().insert(name, value);
        Ok(())
    }

    /// Remove an attribute this class defines itself, returning its value.
    pub fn del_attr(&self, name: &str) -> Result<Value> {
        if is_reserved(name) {
            return Err(readonly(name, "type"));
        }
        self.attrs
            .borrow_mut()
            .remove(name)
            .ok_or_else(|| class_no_attr(&self.name, name))
    }

    /// Create an instance and run `__init__` on it if the class chain defines
    /// one as a function. The instance is returned either way.
    pub fn instantiate(self: &Rc<Self>, args: Vec<Value>) -> Result<Value> {
        let object = Rc::new(Object::new(self.clone()));
        tracing::debug!(class = %self.name, "construct object");
        if let Some(Value::Func(init)) = self.find_attr(INIT) {
            init.call(with_receiver(&object, args))?;
        }
        Ok(Value::Object(object))
    }
}

/// An instance: its class plus its own attribute mapping.
pub struct Object {
    class: Rc<Class>,
    attrs: RefCell<Names>,
}

impl Object {
    pub fn new(class: Rc<Class>) -> Object {
        Object {
            class,
            attrs: RefCell::new(Names::default()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// A copy of this instance's own attributes.
    pub fn attrs(&self) -> Names {
        self.attrs.borrow().clone()
    }

    pub(crate) fn own_attrs(&self) -> &RefCell<Names> {
        &self.attrs
    }

    /// Resolve an attribute: reserved names, then the instance's own mapping,
    /// then the class chain. Functions found on the class come back bound to
    /// this instance.
    pub fn get_attr(self: &Rc<Self>, name: &str) -> Result<Value> {
        match name {
            CLASS => return Ok(Value::Class(self.class.clone())),
            DICT => return names_to_dict(&self.attrs.borrow()),
            _ => {}
        }
        if let Some(value) = self.attrs.borrow().get(name) {
            return Ok(value.clone());
        }
        match self.class.find_attr(name) {
            Some(Value::Func(func)) => Ok(Value::Method(Rc::new(Method::new(self.clone(), func)))),
            Some(value) => Ok(value),
            None => Err(object_no_attr(&self.class.name, name)),
        }
    }

    /// Always writes to the instance's own mapping; the class is untouched.
    pub fn set_attr(&self, name: Str, value: Value) -> Result<()> {
        if is_reserved(&name) {
            return Err(readonly(&name, &self.class.name));
        }
        self.attrs.borrow_mut().insert(name, value);
        Ok(())
    }

    pub fn del_attr(&self, name: &str) -> Result<Value> {
        if is_reserved(name) {
            return Err(readonly(name, &self.class.name));
        }
        self.attrs
            .borrow_mut()
            .remove(name)
            .ok_or_else(|| object_no_attr(&self.class.name, name))
    }
}

impl Value {
    pub fn get_attr(&self, name: &str) -> Result<Value> {
        match (self, name) {
            (Value::Object(o), _) => o.get_attr(name),
            (Value::Class(c), _) => c.get_attr(name),
            (Value::Func(f), NAME) => Ok(Value::String(f.name().clone())),
            (Value::Builtin(b), NAME) => Ok(Value::String(b.name().clone())),
            (Value::Method(m), NAME) => Ok(Value::String(m.func().name().clone())),
            (Value::Method(m), "__self__") => Ok(Value::Object(m.receiver().clone())),
            (Value::Method(m), "__func__") => Ok(Value::Func(m.func().clone())),
            _ => Err(self.no_attr(name)),
        }
    }

    pub fn set_attr(&self, name: Str, value: Value) -> Result<()> {
        match self {
            Value::Object(o) => o.set_attr(name, value),
            Value::Class(c) => c.set_attr(name, value),
            _ => Err(self.no_attr(&name)),
        }
    }

    /// Remove an attribute, returning the value it held.
    pub fn del_attr(&self, name: &str) -> Result<Value> {
        match self {
            Value::Object(o) => o.del_attr(name),
            Value::Class(c) => c.del_attr(name),
            _ => Err(self.no_attr(name)),
        }
    }

    fn no_attr(&self, name: &str) -> RuntimeError {
        RuntimeError::attribute_error(format!(
            "'{}' object has no attribute '{}'",
            self.type_name(),
            name
        ))
    }
}

fn class_no_attr(class: &str, name: &str) -> RuntimeError {
    RuntimeError::attribute_error(format!(
        "type object '{}' has no attribute '{}'",
        class, name
    ))
}

fn object_no_attr(class: &str, name: &str) -> RuntimeError {
    RuntimeError::attribute_error(format!("'{}' object has no attribute '{}'", class, name))
}

fn readonly(name: &str, owner: &str) -> RuntimeError {
    RuntimeError::attribute_error(format!(
        "attribute '{}' of '{}' objects is not writable",
        name, owner
    ))
}

fn names_to_dict(names: &Names) -> Result<Value> {
    Value::dict(
        names
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone())),
    )
}
