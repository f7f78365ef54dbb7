//! The standard builtin functions.

#[cfg(test)]
mod test;

use itertools::Itertools;

use crate::collection;
use crate::error::{ErrorKind, Result, RuntimeError};
use crate::frame::Frame;
use crate::value::Value;

pub(crate) type StdFn = fn(&Frame, Vec<Value>) -> Result<Value>;

pub(crate) const STANDARD: &[(&str, StdFn)] = &[
    ("len", len),
    ("print", print),
    ("repr", repr),
    ("str", string),
    ("list", list),
    ("tuple", tuple),
    ("set", set),
    ("isinstance", isinstance),
    ("getattr", getattr),
    ("setattr", setattr),
    ("hasattr", hasattr),
    ("delattr", delattr),
    ("delitem", delitem),
];

/// Unpack exactly `N` arguments.
fn exact<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N]> {
    let given = args.len();
    <[Value; N]>::try_from(args).map_err(|_| {
        RuntimeError::type_error(format!(
            "{}() takes exactly {} argument{} ({} given)",
            name,
            N,
            if N == 1 { "" } else { "s" },
            given
        ))
    })
}

fn attr_name(func: &str, value: &Value) -> Result<smy_util::string::Str> {
    value.as_str().cloned().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "{}(): attribute name must be string, not '{}'",
            func,
            value.type_name()
        ))
    })
}

fn len(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let [value] = exact("len", args)?;
    Ok(Value::Int(value.length()? as i64))
}

fn print(_: &Frame, args: Vec<Value>) -> Result<Value> {
    println!("{}", args.iter().join(" "));
    Ok(Value::None)
}

fn repr(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let [value] = exact("repr", args)?;
    Ok(Value::string(value.repr()))
}

fn string(_: &Frame, args: Vec<Value>) -> Result<Value> {
    match <[Value; 1]>::try_from(args) {
        Ok([value @ Value::String(_)]) => Ok(value),
        Ok([value]) => Ok(Value::string(value.to_string())),
        Err(args) if args.is_empty() => Ok(Value::string("")),
        Err(args) => Err(RuntimeError::type_error(format!(
            "str() takes at most 1 argument ({} given)",
            args.len()
        ))),
    }
}

fn elements(func: &str, args: Vec<Value>) -> Result<Vec<Value>> {
    match <[Value; 1]>::try_from(args) {
        Ok([value]) => Ok(value.iterable()?.iter().collect()),
        Err(args) if args.is_empty() => Ok(vec![]),
        Err(args) => Err(RuntimeError::type_error(format!(
            "{}() takes at most 1 argument ({} given)",
            func,
            args.len()
        ))),
    }
}

fn list(_: &Frame, args: Vec<Value>) -> Result<Value> {
    Ok(Value::list(elements("list", args)?))
}

fn tuple(_: &Frame, args: Vec<Value>) -> Result<Value> {
    Ok(Value::tuple(elements("tuple", args)?))
}

fn set(_: &Frame, args: Vec<Value>) -> Result<Value> {
    Value::set(elements("set", args)?)
}

fn isinstance(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let [value, class] = exact("isinstance", args)?;
    let class = class.as_class().ok_or_else(|| {
        RuntimeError::type_error("isinstance() arg 2 must be a class")
    })?;
    let is = value
        .as_object()
        .map_or(false, |o| o.class().is_subclass_of(class));
    Ok(Value::Bool(is))
}

fn getattr(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let (value, name, default) = match <[Value; 3]>::try_from(args) {
        Ok([value, name, default]) => (value, name, Some(default)),
        Err(args) => {
            let [value, name] = exact("getattr", args)?;
            (value, name, None)
        }
    };
    let name = attr_name("getattr", &name)?;
    match (value.get_attr(&name), default) {
        (Err(err), Some(default)) if err.is(ErrorKind::AttributeError) => Ok(default),
        (res, _) => res,
    }
}

fn setattr(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let [target, name, value] = exact("setattr", args)?;
    let name = attr_name("setattr", &name)?;
    target.set_attr(name, value)?;
    Ok(Value::None)
}

fn hasattr(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let [value, name] = exact("hasattr", args)?;
    let name = attr_name("hasattr", &name)?;
    match value.get_attr(&name) {
        Ok(_) => Ok(Value::Bool(true)),
        Err(err) if err.is(ErrorKind::AttributeError) => Ok(Value::Bool(false)),
        Err(err) => Err(err),
    }
}

fn delattr(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let [target, name] = exact("delattr", args)?;
    let name = attr_name("delattr", &name)?;
    target.del_attr(&name)?;
    Ok(Value::None)
}

fn delitem(_: &Frame, args: Vec<Value>) -> Result<Value> {
    let [container, index] = exact("delitem", args)?;
    collection::delete(&container, &index)
}
