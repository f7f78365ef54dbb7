use std::rc::Rc;

use expect_test::expect;
use pretty_assertions::assert_eq;
use test_env_log::test;

use crate::class::Class;
use crate::error::{ErrorKind, Result};
use crate::frame::Frame;
use crate::runtime::Runtime;
use crate::test::ints;
use crate::value::Value;

/// Look up and call builtin `name` from a fresh top-level frame.
fn call(name: &str, args: Vec<Value>) -> Result<Value> {
    let rt = Runtime::new();
    let frame = rt.top_frame();
    frame.lookup(name)?.call(&frame, args)
}

#[test]
fn test_standard_table() {
    let rt = Runtime::new();
    let names = rt
        .builtin_names()
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let expected =
        expect![["delattr delitem getattr hasattr isinstance len list print repr set setattr str tuple"]];
    expected.assert_eq(&names);
}

#[test]
fn test_without_std_builtins() {
    let rt = Runtime::builder()
        .std_builtins(false)
        .builtin("one", |_: &Frame, _| Ok(Value::Int(1)))
        .build();
    assert_eq!(rt.builtin_names().len(), 1);
    let frame = rt.top_frame();
    assert_eq!(frame.lookup("len").unwrap_err().kind(), ErrorKind::NameError);
    let one = frame.lookup("one").unwrap();
    assert_eq!(one.call(&frame, vec![]).unwrap(), Value::Int(1));
}

#[test]
fn test_registration_overrides_standard() {
    let rt = Runtime::builder()
        .builtin("len", |_: &Frame, _| Ok(Value::Int(-1)))
        .build();
    let frame = rt.top_frame();
    let len = frame.lookup("len").unwrap();
    assert_eq!(len.call(&frame, vec![ints(&[1])]).unwrap(), Value::Int(-1));
}

#[test]
fn test_len() {
    assert_eq!(call("len", vec![Value::from("abc")]).unwrap(), Value::Int(3));
    assert_eq!(call("len", vec![ints(&[])]).unwrap(), Value::Int(0));
    let err = call("len", vec![]).unwrap_err();
    expect![["TypeError: len() takes exactly 1 argument (0 given)"]].assert_eq(&err.to_string());
    let err = call("len", vec![Value::None]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn test_repr_and_str() {
    let r = call("repr", vec![Value::from("a")]).unwrap();
    assert_eq!(r, Value::from("'a'"));
    let s = call("str", vec![Value::from("a")]).unwrap();
    assert_eq!(s, Value::from("a"));
    let s = call("str", vec![Value::list([Value::from("a")])]).unwrap();
    assert_eq!(s, Value::from("['a']"));
    assert_eq!(call("str", vec![]).unwrap(), Value::from(""));
    assert!(call("str", vec![Value::None, Value::None]).is_err());
    assert_eq!(call("print", vec![Value::Int(1), Value::from("x")]).unwrap(), Value::None);
}

#[test]
fn test_conversions() {
    let t = call("tuple", vec![ints(&[1, 2])]).unwrap();
    expect![["(1, 2)"]].assert_eq(&t.repr());
    let l = call("list", vec![t]).unwrap();
    expect![["[1, 2]"]].assert_eq(&l.repr());
    let s = call("set", vec![ints(&[3, 3])]).unwrap();
    expect![["{3}"]].assert_eq(&s.repr());
    expect![["set()"]].assert_eq(&call("set", vec![]).unwrap().repr());

    let err = call("list", vec![Value::Int(1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotIterableError);
    let err = call("set", vec![Value::list([ints(&[])])]).unwrap_err();
    assert_eq!(err.message(), "unhashable type: 'list'");
}

#[test]
fn test_isinstance() {
    let a = Class::new("A".into(), None);
    let b = Class::new("B".into(), Some(a.clone()));
    let rt = Runtime::new();
    let frame = rt.top_frame();
    let obj = Value::Class(b.clone()).call(&frame, vec![]).unwrap();

    let check = |v: &Value, c: &Rc<Class>| {
        call("isinstance", vec![v.clone(), Value::Class(c.clone())]).unwrap()
    };
    assert_eq!(check(&obj, &a), Value::Bool(true));
    assert_eq!(check(&obj, &b), Value::Bool(true));
    let plain = Value::Class(a.clone()).call(&frame, vec![]).unwrap();
    assert_eq!(check(&plain, &b), Value::Bool(false));
    assert_eq!(check(&Value::Int(1), &a), Value::Bool(false));

    let err = call("isinstance", vec![obj, Value::Int(1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn test_attribute_builtins() {
    let a = Class::new("A".into(), None);
    let rt = Runtime::new();
    let frame = rt.top_frame();
    let obj = Value::Class(a).call(&frame, vec![]).unwrap();
    let name = Value::from("x");

    assert_eq!(
        call("hasattr", vec![obj.clone(), name.clone()]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        call("getattr", vec![obj.clone(), name.clone(), Value::Int(0)]).unwrap(),
        Value::Int(0)
    );
    let err = call("getattr", vec![obj.clone(), name.clone()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AttributeError);

    call("setattr", vec![obj.clone(), name.clone(), Value::Int(5)]).unwrap();
    assert_eq!(
        call("getattr", vec![obj.clone(), name.clone()]).unwrap(),
        Value::Int(5)
    );
    assert_eq!(
        call("hasattr", vec![obj.clone(), name.clone()]).unwrap(),
        Value::Bool(true)
    );

    call("delattr", vec![obj.clone(), name.clone()]).unwrap();
    assert_eq!(
        call("hasattr", vec![obj.clone(), name]).unwrap(),
        Value::Bool(false)
    );

    let err = call("getattr", vec![obj, Value::Int(1)]).unwrap_err();
    expect![["TypeError: getattr(): attribute name must be string, not 'int'"]]
        .assert_eq(&err.to_string());
}

#[test]
fn test_delitem() {
    let list = ints(&[10, 20, 30, 40]);
    let slice = Value::tuple([Value::Int(1), Value::Int(3), Value::None]);
    assert_eq!(call("delitem", vec![list.clone(), slice]).unwrap(), Value::None);
    expect![["[10, 40]"]].assert_eq(&list.repr());

    let err = call("delitem", vec![Value::tuple([]), Value::Int(0)]).unwrap_err();
    expect![["TypeError: unsupported item deletion"]].assert_eq(&err.to_string());
}
