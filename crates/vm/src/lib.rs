//! The runtime core of the Smy interpreter: values, frames, call dispatch and
//! the class/object model.
//!
//! Statement and expression evaluation live outside this crate and plug in
//! through [`Expr`] and [`Suite`].

pub mod builtins;
pub mod call;
pub mod class;
pub mod collection;
pub mod error;
pub mod eval;
pub mod frame;
pub mod host;
pub mod runtime;
pub mod value;


pub use error::{ErrorKind, Result, RuntimeError};
pub use eval::{evaluate_all, Expr, Suite};
pub use frame::Frame;
pub use host::HostValue;
pub use runtime::{Runtime, RuntimeBuilder};
pub use smy_util::string::Str;
pub use value::Value;
