use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// The category a runtime failure is tagged with.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ErrorKind {
    /// Wrong variant for an operation, or wrong arity.
    TypeError,
    /// Missing attribute on a class or object.
    AttributeError,
    /// Unresolved identifier.
    NameError,
    /// Sequence position out of range.
    IndexError,
    /// Missing dictionary key.
    KeyError,
    /// Right variant, unusable value (e.g. a zero slice step).
    ValueError,
    NotCallableError,
    NotIterableError,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::TypeError => "TypeError",
            ErrorKind::AttributeError => "AttributeError",
            ErrorKind::NameError => "NameError",
            ErrorKind::IndexError => "IndexError",
            ErrorKind::KeyError => "KeyError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::NotCallableError => "NotCallableError",
            ErrorKind::NotIterableError => "NotIterableError",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A category-tagged runtime failure.
///
/// Failures are not recovered inside the runtime; they abort the current call
/// chain. A statement layer may catch them by matching on [`RuntimeError::kind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RuntimeError {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

impl RuntimeError {
    pub fn new(kind: ErrorKind) -> RuntimeError {
        RuntimeError {
            kind,
            message: Cow::Borrowed(""),
        }
    }

    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if this failure is tagged with `kind`.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn type_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TypeError).with_message(message)
    }

    pub fn attribute_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::AttributeError).with_message(message)
    }

    pub fn name_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NameError).with_message(message)
    }

    pub fn index_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::IndexError).with_message(message)
    }

    pub fn key_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::KeyError).with_message(message)
    }

    pub fn value_error(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ValueError).with_message(message)
    }

    pub fn not_callable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotCallableError).with_message(message)
    }

    pub fn not_iterable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotIterableError).with_message(message)
    }
}
