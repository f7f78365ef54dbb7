use std::fmt::{self, Display, Formatter, Write};

use smy_util::by_ptr::AsCmpPtr;

use super::{Key, Value};

/// Formats a value in its canonical printed form, with strings quoted.
///
/// `Display` on [`Value`] differs only at the top level: a bare string is
/// written without quotes. Elements inside containers always use this form.
pub struct Repr<'a>(pub &'a Value);

impl Display for Repr<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Printer::default().repr(self.0, f)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => Repr(other).fmt(f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Repr(self).fmt(f)
    }
}

impl Value {
    pub fn repr(&self) -> String {
        Repr(self).to_string()
    }
}

#[derive(Default)]
struct Printer {
    /// Containers currently being printed, to cut self-referencing cycles.
    active: Vec<usize>,
}

impl Printer {
    fn repr(&mut self, value: &Value, f: &mut Formatter<'_>) -> fmt::Result {
        match value {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write_double(*d, f),
            Value::String(s) => write_quoted(s, f),
            Value::Tuple(t) if t.len() == 1 => {
                f.write_char('(')?;
                self.repr(&t[0], f)?;
                f.write_str(",)")
            }
            Value::Tuple(t) => self.seq("(", t.iter(), ")", f),
            Value::List(l) => self.nested(value, "[...]", f, |p, f| {
                p.seq("[", l.borrow().iter(), "]", f)
            }),
            Value::Dict(d) => self.nested(value, "{...}", f, |p, f| {
                f.write_char('{')?;
                for (i, (k, v)) in d.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    p.repr(k.value(), f)?;
                    f.write_str(": ")?;
                    p.repr(v, f)?;
                }
                f.write_char('}')
            }),
            Value::Set(s) => {
                let s = s.borrow();
                if s.is_empty() {
                    f.write_str("set()")
                } else {
                    self.seq("{", s.iter().map(Key::value), "}", f)
                }
            }
            Value::Class(c) => write!(f, "<class '{}'>", c.name()),
            Value::Object(o) => write!(f, "<{} object {:#x}>", o.class().name(), o.addr()),
            Value::Func(func) => write!(f, "<function {}>", func.name()),
            Value::Method(m) => write!(
                f,
                "<bound method {}.{} of <{} object {:#x}>>",
                m.receiver().class().name(),
                m.func().name(),
                m.receiver().class().name(),
                m.receiver().addr()
            ),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
        }
    }

    fn seq<'v>(
        &mut self,
        open: &str,
        items: impl Iterator<Item = &'v Value>,
        close: &str,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(open)?;
        for (i, item) in items.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.repr(item, f)?;
        }
        f.write_str(close)
    }

    fn nested(
        &mut self,
        value: &Value,
        placeholder: &str,
        f: &mut Formatter<'_>,
        body: impl FnOnce(&mut Self, &mut Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        let id = value.identity().unwrap_or_default();
        if self.active.contains(&id) {
            return f.write_str(placeholder);
        }
        self.active.push(id);
        let res = body(self, f);
        self.active.pop();
        res
    }
}

fn write_double(d: f64, f: &mut Formatter<'_>) -> fmt::Result {
    if d.is_nan() {
        f.write_str("nan")
    } else if d.is_infinite() {
        f.write_str(if d > 0.0 { "inf" } else { "-inf" })
    } else if d.abs() >= 1e16 {
        let s = format!("{:e}", d);
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{}e+{}", mantissa, exp),
            _ => f.write_str(&s),
        }
    } else if d.fract() == 0.0 {
        write!(f, "{:.1}", d)
    } else {
        write!(f, "{}", d)
    }
}

/// Quote a string the way the language prints it: single quotes, unless the
/// text holds a single quote and no double quote.
fn write_quoted(s: &str, f: &mut Formatter<'_>) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => {
                f.write_char('\\')?;
                f.write_char(c)?;
            }
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}
