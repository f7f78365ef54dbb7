//! The contract between the runtime and the (external) tree evaluator.
//!
//! The runtime never inspects syntax. It only asks an expression for its value
//! in a frame, or asks a statement block to run in a frame.

use crate::error::Result;
use crate::frame::Frame;
use crate::value::Value;

/// An expression node.
pub trait Expr {
    fn evaluate(&self, frame: &Frame) -> Result<Value>;
}

impl<F> Expr for F
where
    F: Fn(&Frame) -> Result<Value>,
{
    fn evaluate(&self, frame: &Frame) -> Result<Value> {
        self(frame)
    }
}

/// A statement block.
pub trait Suite {
    /// Run the block as a top-level statement sequence.
    fn evaluate(&self, frame: &Frame) -> Result<Value>;

    /// Run the block as a function body. A `return` inside the block ends the
    /// evaluation with its carried value; falling off the end yields
    /// [`Value::None`].
    fn evaluate_as_func(&self, frame: &Frame) -> Result<Value>;
}

/// Evaluate `exprs` left to right, stopping at the first failure.
///
/// Argument lists must go through this before a call is dispatched so that
/// side effects happen in source order.
pub fn evaluate_all<'a, E>(exprs: impl IntoIterator<Item = &'a E>, frame: &Frame) -> Result<Vec<Value>>
where
    E: Expr + ?Sized + 'a,
{
    exprs.into_iter().map(|expr| expr.evaluate(frame)).collect()
}
