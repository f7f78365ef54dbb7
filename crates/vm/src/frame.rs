mod reclaim;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fnv::FnvHashMap;
use smy_util::string::Str;

use crate::error::{Result, RuntimeError};
use crate::runtime::Runtime;
use crate::value::Value;

pub(crate) use reclaim::Retained;

/// A name-to-value mapping: frame locals, globals, class and instance attributes.
pub type Names = FnvHashMap<Str, Value>;

/// A lexical scope record.
///
/// The parent of a frame is the scope the running code was *written* in, never
/// the caller. A function therefore sees the names visible at its definition
/// site, and a call frame never sees its caller's locals.
///
/// Frames are cheap handles; cloning one shares the same scope. A call frame
/// is released when its call returns unless a function defined in it is still
/// reachable.
#[derive(Clone)]
pub struct Frame(Rc<FrameData>);

struct FrameData {
    parent: Option<Frame>,
    locals: Rc<RefCell<Names>>,
    runtime: Rc<Runtime>,
    /// Set once a function is defined in this frame or one it encloses.
    captured: Cell<bool>,
}

impl Frame {
    /// The frame of a top-level program: no parent, and its locals are the globals.
    pub(crate) fn top_level(runtime: Rc<Runtime>) -> Frame {
        Frame(Rc::new(FrameData {
            parent: None,
            locals: runtime.globals().clone(),
            runtime,
            captured: Cell::new(false),
        }))
    }

    /// A fresh, empty scope nested in `parent`.
    pub fn child(parent: &Frame) -> Frame {
        tracing::trace!(depth = parent.depth() + 1, "new frame");
        Frame(Rc::new(FrameData {
            parent: Some(parent.clone()),
            locals: Rc::new(RefCell::new(Names::default())),
            runtime: parent.0.runtime.clone(),
            captured: Cell::new(false),
        }))
    }

    pub fn parent(&self) -> Option<&Frame> {
        self.0.parent.as_ref()
    }

    pub fn runtime(&self) -> &Rc<Runtime> {
        &self.0.runtime
    }

    /// Whether this frame's locals are the global mapping.
    pub fn is_top_level(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Number of enclosing definition scopes.
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), |f| f.parent()).count()
    }

    /// Intern `s` in the runtime's string pool.
    pub fn intern(&self, s: &str) -> Str {
        self.0.runtime.intern(s)
    }

    /// Bind `name` in this frame's own mapping.
    pub fn define(&self, name: Str, value: Value) {
        self.0.locals.borrow_mut().insert(name, value);
    }

    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.0.locals.borrow().get(name).cloned()
    }

    pub fn remove_local(&self, name: &str) -> Option<Value> {
        self.0.locals.borrow_mut().remove(name)
    }

    /// Snapshot of this frame's own bindings.
    pub fn locals(&self) -> Names {
        self.0.locals.borrow().clone()
    }

    /// Resolve `name`: this frame, then the enclosing definition scopes, then
    /// the globals, then the builtins.
    pub fn lookup(&self, name: &str) -> Result<Value> {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if let Some(value) = current.get_local(name) {
                return Ok(value);
            }
            frame = current.parent();
        }

        let runtime = self.runtime();
        if let Some(value) = runtime.globals().borrow().get(name) {
            return Ok(value.clone());
        }
        runtime
            .builtin(name)
            .ok_or_else(|| RuntimeError::name_error(format!("name '{}' is not defined", name)))
    }

    /// Returns `true` if both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Frame) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.0.locals.borrow().keys().cloned().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("Frame")
            .field("depth", &self.depth())
            .field("locals", &names)
            .finish()
    }
}
