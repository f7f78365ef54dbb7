use std::rc::Rc;

use expect_test::expect;
use pretty_assertions::assert_eq;
use test_env_log::test;

use super::{Class, RESERVED_ATTRS};
use crate::error::ErrorKind;
use crate::frame::Names;
use crate::runtime::Runtime;
use crate::test::{def, store_params};
use crate::value::Value;

fn class(name: &str, superclass: Option<&Rc<Class>>) -> Rc<Class> {
    Class::new(name.into(), superclass.cloned())
}

#[test]
fn test_attribute_resolution_order() {
    let base = class("Base", None);
    let derived = class("Derived", Some(&base));
    base.set_attr("a".into(), Value::Int(1)).unwrap();
    base.set_attr("b".into(), Value::Int(1)).unwrap();
    derived.set_attr("b".into(), Value::Int(2)).unwrap();

    let obj = Value::Object(Rc::new(super::Object::new(derived.clone())));
    assert_eq!(obj.get_attr("a").unwrap(), Value::Int(1));
    assert_eq!(obj.get_attr("b").unwrap(), Value::Int(2));

    obj.set_attr("b".into(), Value::Int(3)).unwrap();
    assert_eq!(obj.get_attr("b").unwrap(), Value::Int(3));
    // instance assignment never writes through to the class
    assert_eq!(derived.find_attr("b"), Some(Value::Int(2)));
}

#[test]
fn test_class_mutation_is_shared() {
    let base = class("Base", None);
    let derived = class("Derived", Some(&base));
    let obj = Value::Object(Rc::new(super::Object::new(derived)));
    assert!(obj.get_attr("late").is_err());

    base.set_attr("late".into(), Value::Int(7)).unwrap();
    assert_eq!(obj.get_attr("late").unwrap(), Value::Int(7));
}

#[test]
fn test_missing_attribute() {
    let a = class("A", None);
    let obj = Value::Object(Rc::new(super::Object::new(a.clone())));

    let err = obj.get_attr("nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AttributeError);
    expect![["'A' object has no attribute 'nope'"]].assert_eq(err.message());

    let err = Value::Class(a).get_attr("nope").unwrap_err();
    expect![["type object 'A' has no attribute 'nope'"]].assert_eq(err.message());

    let err = Value::Int(1).get_attr("real").unwrap_err();
    expect![["'int' object has no attribute 'real'"]].assert_eq(err.message());
}

#[test]
fn test_class_pseudo_attributes() {
    let base = class("Base", None);
    let derived = class("Derived", Some(&base));
    derived.set_attr("x".into(), Value::Int(1)).unwrap();
    let derived = Value::Class(derived);

    assert_eq!(derived.get_attr("__name__").unwrap(), Value::from("Derived"));
    assert_eq!(
        derived.get_attr("__superclass__").unwrap(),
        Value::Class(base.clone())
    );
    assert_eq!(
        Value::Class(base).get_attr("__superclass__").unwrap(),
        Value::None
    );
    expect![["{'x': 1}"]].assert_eq(&derived.get_attr("__dict__").unwrap().repr());
}

#[test]
fn test_object_pseudo_attributes() {
    let a = class("A", None);
    let obj = Value::Object(Rc::new(super::Object::new(a.clone())));
    obj.set_attr("y".into(), Value::Int(2)).unwrap();

    assert_eq!(obj.get_attr("__class__").unwrap(), Value::Class(a));
    let dict = obj.get_attr("__dict__").unwrap();
    expect![["{'y': 2}"]].assert_eq(&dict.repr());
    // a snapshot, not a live view
    obj.set_attr("z".into(), Value::Int(3)).unwrap();
    assert_eq!(dict.length().unwrap(), 1);
}

#[test]
fn test_reserved_names_are_read_only() {
    let a = class("A", None);
    let obj = Value::Object(Rc::new(super::Object::new(a.clone())));
    for name in RESERVED_ATTRS {
        let err = obj.set_attr(name.into(), Value::None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttributeError);
        let err = Value::Class(a.clone())
            .set_attr(name.into(), Value::None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttributeError);
    }
    let err = obj.set_attr("__class__".into(), Value::None).unwrap_err();
    expect![["attribute '__class__' of 'A' objects is not writable"]].assert_eq(err.message());
}

#[test]
fn test_del_attr() {
    let a = class("A", None);
    a.set_attr("m".into(), Value::Int(1)).unwrap();
    let obj = Value::Object(Rc::new(super::Object::new(a.clone())));
    obj.set_attr("m".into(), Value::Int(2)).unwrap();

    assert_eq!(obj.del_attr("m").unwrap(), Value::Int(2));
    // the class attribute shows through again
    assert_eq!(obj.get_attr("m").unwrap(), Value::Int(1));
    assert!(obj.del_attr("m").is_err());

    assert_eq!(Value::Class(a.clone()).del_attr("m").unwrap(), Value::Int(1));
    assert!(obj.get_attr("m").is_err());
}

#[test]
fn test_instantiate_without_init_ignores_arguments() {
    let rt = Runtime::new();
    let top = rt.top_frame();
    let a = class("A", None);
    let obj = Value::Class(a.clone()).call(&top, vec![Value::Int(1)]).unwrap();
    assert_eq!(obj.type_name(), "A");
    assert_eq!(obj.as_object().unwrap().attrs().len(), 0);
}

#[test]
fn test_inherited_init() {
    let rt = Runtime::new();
    let top = rt.top_frame();
    let base = class("Base", None);
    let init = def(&top, "__init__", &["self", "x", "y"], vec![], |f| {
        store_params(f, &["x", "y"])
    });
    base.set_attr("__init__".into(), init).unwrap();
    let derived = class("Derived", Some(&base));

    let obj = Value::Class(derived.clone())
        .call(&top, vec![Value::Int(1), Value::Int(2)])
        .unwrap();
    assert_eq!(obj.get_attr("y").unwrap(), Value::Int(2));
    assert_eq!(obj.get_attr("__class__").unwrap(), Value::Class(derived));

    let err = Value::Class(base).call(&top, vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn test_bound_methods() {
    let rt = Runtime::new();
    let top = rt.top_frame();
    let a = class("A", None);
    let m = def(&top, "m", &["self", "n"], vec![], |f| {
        let x = f.lookup("self")?.get_attr("x")?.as_int().unwrap_or_default();
        let n = f.lookup("n")?.as_int().unwrap_or_default();
        Ok(Value::Int(x + n))
    });
    a.set_attr("m".into(), m).unwrap();
    let obj = Value::Class(a).call(&top, vec![]).unwrap();
    obj.set_attr("x".into(), Value::Int(7)).unwrap();

    let first = obj.get_attr("m").unwrap();
    let second = obj.get_attr("m").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get_attr("__name__").unwrap(), Value::from("m"));
    assert_eq!(first.call(&top, vec![Value::Int(1)]).unwrap(), Value::Int(8));

    let other = obj.as_object().unwrap().class().get_attr("__name__").unwrap();
    assert_eq!(other, Value::from("A"));
}

#[test]
fn test_subclass_relation() {
    let a = class("A", None);
    let b = class("B", Some(&a));
    let c = class("C", Some(&b));
    assert!(c.is_subclass_of(&a));
    assert!(c.is_subclass_of(&c));
    assert!(!a.is_subclass_of(&b));
    assert_eq!(
        c.ancestors().map(|c| c.name().to_string()).collect::<Vec<_>>(),
        ["C", "B", "A"]
    );
}

#[test]
fn test_with_attrs() {
    let mut attrs = Names::default();
    attrs.insert("x".into(), Value::Int(1));
    let a = Class::with_attrs("A".into(), None, attrs.clone()).unwrap();
    assert_eq!(Value::Class(a.clone()).get_attr("x").unwrap(), Value::Int(1));
    expect![["{'x': 1}"]].assert_eq(&Value::Class(a).get_attr("__dict__").unwrap().repr());

    for name in RESERVED_ATTRS {
        let mut attrs = attrs.clone();
        attrs.insert(name.into(), Value::from("B"));
        let err = Class::with_attrs("A".into(), None, attrs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttributeError);
        assert_eq!(
            err.message(),
            format!("attribute '{}' of 'type' objects is not writable", name)
        );
    }
}
