//! The four call forms, unified behind [`Value::call`].


use std::rc::Rc;

use itertools::Itertools;
use smy_util::string::Str;

use crate::class::{Class, Object};
use crate::error::{Result, RuntimeError};
use crate::eval::{Expr, Suite};
use crate::frame::Frame;
use crate::value::Value;

impl Value {
    /// Invoke this value with `args`. `frame` is the calling frame; only
    /// builtins see it.
    pub fn call(&self, frame: &Frame, args: Vec<Value>) -> Result<Value> {
        match self {
            Value::Builtin(b) => b.call(frame, args),
            Value::Func(f) => f.call(args),
            Value::Method(m) => m.call(args),
            Value::Class(c) => Class::instantiate(c, args),
            _ => Err(RuntimeError::not_callable(format!(
                "'{}' object is not callable",
                self.type_name()
            ))),
        }
    }
}

/// A user-defined function: a closure over the frame it was defined in.
pub struct Func {
    name: Str,
    params: Vec<Str>,
    /// Default-value expressions for the trailing `defaults.len()` parameters.
    defaults: Vec<Rc<dyn Expr>>,
    body: Rc<dyn Suite>,
    defining: Frame,
}

impl Func {
    /// Create a function defined in `defining`.
    ///
    /// `defaults` belong to the last `defaults.len()` parameters, so there
    /// cannot be more defaults than parameters.
    pub fn new(
        defining: &Frame,
        name: Str,
        params: Vec<Str>,
        defaults: Vec<Rc<dyn Expr>>,
        body: Rc<dyn Suite>,
    ) -> Result<Func> {
        if defaults.len() > params.len() {
            return Err(RuntimeError::type_error(format!(
                "{}() has {} default values for {} parameters",
                name,
                defaults.len(),
                params.len()
            )));
        }
        defining.mark_captured();
        Ok(Func {
            name,
            params,
            defaults,
            body,
            defining: defining.clone(),
        })
    }

    pub fn name(&self) -> &Str {
        &self.name
    }

    pub fn params(&self) -> &[Str] {
        &self.params
    }

    pub fn defining_frame(&self) -> &Frame {
        &self.defining
    }

    /// Run the body in a new frame parented at the defining frame. The frame
    /// is released on return unless something created in it escaped.
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        tracing::trace!(func = %self.name, argc = args.len(), "call function");
        let frame = Frame::child(&self.defining);
        let result = self
            .bind(&frame, args)
            .and_then(|()| self.body.evaluate_as_func(&frame));
        frame.release();
        result
    }

    fn required(&self) -> usize {
        self.params.len() - self.defaults.len()
    }

    /// Bind positional arguments, filling missing trailing parameters from
    /// their defaults. Defaults are evaluated now, in the defining frame.
    fn bind(&self, frame: &Frame, args: Vec<Value>) -> Result<()> {
        if args.len() > self.params.len() {
            return Err(RuntimeError::type_error(format!(
                "{}() takes {} positional argument{} but {} {} given",
                self.name,
                self.params.len(),
                if self.params.len() == 1 { "" } else { "s" },
                args.len(),
                if args.len() == 1 { "was" } else { "were" }
            )));
        }
        if args.len() < self.required() {
            let missing = &self.params[args.len()..self.required()];
            return Err(RuntimeError::type_error(format!(
                "{}() missing {} required positional argument{}: {}",
                self.name,
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
                missing.iter().map(|p| format!("'{}'", p)).join(", ")
            )));
        }

        let given = args.len();
        for (param, arg) in self.params.iter().zip(args) {
            frame.define(param.clone(), arg);
        }
        for (i, param) in self.params.iter().enumerate().skip(given) {
            tracing::trace!(func = %self.name, %param, "evaluate default");
            let default = &self.defaults[i - self.required()];
            frame.define(param.clone(), default.evaluate(&self.defining)?);
        }
        Ok(())
    }
}

/// A function bound to a receiver object.
pub struct Method {
    receiver: Rc<Object>,
    func: Rc<Func>,
}

impl Method {
    pub fn new(receiver: Rc<Object>, func: Rc<Func>) -> Method {
        Method { receiver, func }
    }

    pub fn receiver(&self) -> &Rc<Object> {
        &self.receiver
    }

    pub fn func(&self) -> &Rc<Func> {
        &self.func
    }

    /// Whether both methods bind the same function to the same receiver.
    pub fn same_binding(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.receiver, &other.receiver) && Rc::ptr_eq(&self.func, &other.func)
    }

    /// Call the function with the receiver prepended to `args`.
    pub fn call(&self, args: Vec<Value>) -> Result<Value> {
        self.func.call(with_receiver(&self.receiver, args))
    }
}

pub(crate) fn with_receiver(receiver: &Rc<Object>, args: Vec<Value>) -> Vec<Value> {
    let mut full = Vec::with_capacity(args.len() + 1);
    full.push(Value::Object(receiver.clone()));
    full.extend(args);
    full
}

/// A natively implemented function, registered once under a fixed name.
pub struct Builtin {
    name: Str,
    native: Box<dyn Fn(&Frame, Vec<Value>) -> Result<Value>>,
}

impl Builtin {
    pub fn new(name: Str, native: impl Fn(&Frame, Vec<Value>) -> Result<Value> + 'static) -> Self {
        Self::from_boxed(name, Box::new(native))
    }

    pub(crate) fn from_boxed(
        name: Str,
        native: Box<dyn Fn(&Frame, Vec<Value>) -> Result<Value>>,
    ) -> Self {
        Builtin { name, native }
    }

    pub fn name(&self) -> &Str {
        &self.name
    }

    /// The native implementation checks its own arguments.
    pub fn call(&self, frame: &Frame, args: Vec<Value>) -> Result<Value> {
        tracing::trace!(builtin = %self.name, argc = args.len(), "call builtin");
        (self.native)(frame, args)
    }
}
