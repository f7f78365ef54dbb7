//! Item access on sequences and mappings: `x[i]`, `x[i] = v` and `del x[i]`.
//!
//! A slice is written as a three-element tuple `(start, end, step)` whose
//! members are each an integer or `None`.


use std::rc::Rc;

use crate::error::{Result, RuntimeError};
use crate::value::{Key, Value};

impl Value {
    pub fn get_item(&self, index: &Value) -> Result<Value> {
        match self {
            Value::Dict(d) => {
                let key = Key::new(index.clone())?;
                Ok(d.borrow().get(&key).cloned().unwrap_or(Value::None))
            }
            Value::String(s) => match Index::of(index, self)? {
                Index::At(i) => {
                    let pos = position(i, s.char_len())?;
                    let c = s.chars().nth(pos).ok_or_else(out_of_range)?;
                    Ok(Value::string(c.to_string()))
                }
                Index::Slice(slice) => {
                    let chars = s.chars().collect::<Vec<_>>();
                    let picked = slice
                        .positions(chars.len())?
                        .into_iter()
                        .map(|i| chars[i])
                        .collect::<String>();
                    Ok(Value::string(picked))
                }
            },
            Value::Tuple(t) => match Index::of(index, self)? {
                Index::At(i) => Ok(t[position(i, t.len())?].clone()),
                Index::Slice(slice) => Ok(Value::tuple(
                    slice.positions(t.len())?.into_iter().map(|i| t[i].clone()),
                )),
            },
            Value::List(l) => {
                let l = l.borrow();
                match Index::of(index, self)? {
                    Index::At(i) => Ok(l[position(i, l.len())?].clone()),
                    Index::Slice(slice) => Ok(Value::list(
                        slice.positions(l.len())?.into_iter().map(|i| l[i].clone()),
                    )),
                }
            }
            _ => Err(RuntimeError::type_error(format!(
                "'{}' object is not subscriptable",
                self.type_name()
            ))),
        }
    }

    pub fn set_item(&self, index: &Value, value: Value) -> Result<()> {
        match self {
            Value::Dict(d) => {
                let key = Key::new(index.clone())?;
                d.borrow_mut().insert(key, value);
                Ok(())
            }
            Value::List(l) => match Index::of(index, self)? {
                Index::At(i) => {
                    let mut l = l.borrow_mut();
                    let pos = position(i, l.len())
                        .map_err(|_| RuntimeError::index_error("list assignment index out of range"))?;
                    l[pos] = value;
                    Ok(())
                }
                Index::Slice(_) => Err(RuntimeError::type_error(
                    "slice assignment is not supported",
                )),
            },
            _ => Err(RuntimeError::type_error(format!(
                "'{}' object does not support item assignment",
                self.type_name()
            ))),
        }
    }

    /// Remove `index` from this container. See [`delete`].
    pub fn delete_item(&self, index: &Value) -> Result<Value> {
        match self {
            Value::List(l) => match Index::of(index, self)? {
                Index::At(i) => {
                    let mut l = l.borrow_mut();
                    let len = l.len() as i64;
                    let pos = if i < 0 { i + len } else { i };
                    if pos < 0 || pos >= len {
                        return Err(RuntimeError::index_error("list assignment index out of range"));
                    }
                    Ok(l.remove(pos as usize))
                }
                Index::Slice(slice) => {
                    let mut l = l.borrow_mut();
                    let len = l.len() as i64;
                    let start = normalize(slice.start.unwrap_or(0), len);
                    let end = normalize(slice.end.unwrap_or(len), len);
                    if start >= end {
                        return Ok(Value::None);
                    }
                    let start = start.clamp(0, len) as usize;
                    let end = end.clamp(0, len) as usize;
                    tracing::trace!(start, end, "delete list range");
                    l.drain(start..end);
                    Ok(Value::None)
                }
            },
            Value::Dict(d) => {
                let key = Key::new(index.clone())?;
                let removed = d.borrow_mut().remove(&key);
                removed.ok_or_else(|| RuntimeError::key_error(index.repr()))
            }
            _ => Err(RuntimeError::type_error("unsupported item deletion")),
        }
    }
}

/// `del container[index]`.
///
/// - A list with an integer index loses that element, which is returned.
/// - A list with a slice `(start, end, _)` loses the range `[start, end)`.
///   Missing bounds default to the whole list, a negative bound is moved
///   forward by the length once, and `start >= end` removes nothing. The
///   step is ignored.
/// - A dict loses the entry for `index`; its value is returned.
///
/// Anything else, tuples included, fails with a `TypeError`.
pub fn delete(container: &Value, index: &Value) -> Result<Value> {
    container.delete_item(index)
}

enum Index {
    At(i64),
    Slice(Slice),
}

impl Index {
    fn of(index: &Value, container: &Value) -> Result<Index> {
        match index {
            Value::Int(i) => Ok(Index::At(*i)),
            Value::Bool(b) => Ok(Index::At(*b as i64)),
            Value::Tuple(t) if t.len() == 3 => Slice::from_parts(t).map(Index::Slice),
            _ => Err(RuntimeError::type_error(format!(
                "{} indices must be integers or slices, not {}",
                container.type_name(),
                index.type_name()
            ))),
        }
    }
}

struct Slice {
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
}

impl Slice {
    fn from_parts(parts: &Rc<[Value]>) -> Result<Slice> {
        let bound = |v: &Value| match v {
            Value::None => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            _ => Err(RuntimeError::type_error(
                "slice indices must be integers or None",
            )),
        };
        Ok(Slice {
            start: bound(&parts[0])?,
            end: bound(&parts[1])?,
            step: bound(&parts[2])?,
        })
    }

    /// Positions selected from a sequence of `len` items, in order.
    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(RuntimeError::value_error("slice step cannot be zero"));
        }
        let len = len as i64;
        let resolve = |bound: Option<i64>, default: i64, lo: i64, hi: i64| match bound {
            None => default,
            Some(i) => normalize(i, len).clamp(lo, hi),
        };

        let mut picked = vec![];
        if step > 0 {
            let start = resolve(self.start, 0, 0, len);
            let end = resolve(self.end, len, 0, len);
            let mut i = start;
            while i < end {
                picked.push(i as usize);
                i = match i.checked_add(step) {
                    Some(next) => next,
                    None => break,
                };
            }
        } else {
            let start = resolve(self.start, len - 1, -1, len - 1);
            let end = resolve(self.end, -1, -1, len - 1);
            let mut i = start;
            while i > end {
                picked.push(i as usize);
                i = match i.checked_add(step) {
                    Some(next) => next,
                    None => break,
                };
            }
        }
        Ok(picked)
    }
}

fn normalize(i: i64, len: i64) -> i64 {
    if i < 0 {
        i + len
    } else {
        i
    }
}

fn position(i: i64, len: usize) -> Result<usize> {
    let pos = normalize(i, len as i64);
    if pos < 0 || pos >= len as i64 {
        return Err(out_of_range());
    }
    Ok(pos as usize)
}

fn out_of_range() -> RuntimeError {
    RuntimeError::index_error("index out of range")
}
