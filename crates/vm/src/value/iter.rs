use std::cell::RefCell;
use std::rc::Rc;

use super::{DictMap, Key, Value};

/// A finite, restartable sequence of values.
///
/// Creating an `Iterable` does no work; every call to [`Iterable::iter`]
/// starts a fresh pass over the container as it is at that moment.
#[derive(Clone)]
pub struct Iterable(Source);

#[derive(Clone)]
enum Source {
    Tuple(Rc<[Value]>),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<DictMap>>),
}

impl Iterable {
    pub(super) fn new(value: &Value) -> Option<Iterable> {
        let source = match value {
            Value::Tuple(t) => Source::Tuple(t.clone()),
            Value::List(l) => Source::List(l.clone()),
            Value::Dict(d) => Source::Dict(d.clone()),
            _ => return None,
        };
        Some(Iterable(source))
    }

    pub fn iter(&self) -> ValueIter {
        let inner = match &self.0 {
            Source::Tuple(t) => Inner::Tuple(t.clone(), 0),
            Source::List(l) => Inner::List(l.clone(), 0),
            Source::Dict(d) => {
                let entries = d
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Vec<_>>();
                Inner::Entries(entries.into_iter())
            }
        };
        ValueIter(inner)
    }
}

impl<'a> IntoIterator for &'a Iterable {
    type Item = Value;
    type IntoIter = ValueIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over an [`Iterable`].
pub struct ValueIter(Inner);

enum Inner {
    Tuple(Rc<[Value]>, usize),
    /// Lists are read by position on every step, so the list may be mutated
    /// between steps without invalidating the iterator.
    List(Rc<RefCell<Vec<Value>>>, usize),
    /// Dict entries are captured when the pass begins; each pair becomes a
    /// two-element tuple only when it is reached.
    Entries(std::vec::IntoIter<(Key, Value)>),
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            Inner::Tuple(t, pos) => {
                let item = t.get(*pos)?.clone();
                *pos += 1;
                Some(item)
            }
            Inner::List(l, pos) => {
                let item = l.borrow().get(*pos)?.clone();
                *pos += 1;
                Some(item)
            }
            Inner::Entries(entries) => {
                let (k, v) = entries.next()?;
                Some(Value::tuple([k.into_value(), v]))
            }
        }
    }
}
