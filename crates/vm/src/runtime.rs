use std::cell::RefCell;
use std::rc::Rc;

use fnv::FnvHashMap;
use smy_util::string::{Interner, Str};

use crate::builtins;
use crate::call::Builtin;
use crate::error::Result;
use crate::eval::Suite;
use crate::frame::{Frame, Names, Retained};
use crate::value::Value;

/// Process-wide interpreter state: the global mapping, the builtin table and
/// the string pool. Every [`Frame`] holds a reference to it.
///
/// The builtin table is frozen once the runtime is built.
pub struct Runtime {
    globals: Rc<RefCell<Names>>,
    builtins: FnvHashMap<Str, Value>,
    interner: Interner,
    retained: Retained,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// A runtime with the standard builtins.
    pub fn new() -> Rc<Runtime> {
        Self::builder().build()
    }

    pub fn intern(&self, s: &str) -> Str {
        self.interner.intern(s)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn globals(&self) -> &Rc<RefCell<Names>> {
        &self.globals
    }

    pub fn builtin(&self, name: &str) -> Option<Value> {
        self.builtins.get(name).cloned()
    }

    /// Names of all registered builtins, sorted.
    pub fn builtin_names(&self) -> Vec<Str> {
        let mut names = self.builtins.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub(crate) fn retained(&self) -> &Retained {
        &self.retained
    }

    /// Trace again the call frames that outlived their call because a
    /// function defined in them escaped, and release those no longer
    /// reachable. Returns the number of frames released.
    pub fn collect_frames(&self) -> usize {
        self.retained.collect()
    }

    /// A new top-level frame over the globals.
    pub fn top_frame(self: &Rc<Self>) -> Frame {
        Frame::top_level(self.clone())
    }

    /// Run a top-level program. An uncaught failure aborts the program and is
    /// handed back to the driver.
    pub fn run(self: &Rc<Self>, program: &dyn Suite) -> Result<Value> {
        let frame = self.top_frame();
        program.evaluate(&frame).map_err(|err| {
            tracing::error!(kind = %err.kind(), "uncaught failure: {}", err.message());
            err
        })
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("globals", &self.globals.borrow().len())
            .field("builtins", &self.builtin_names())
            .field("interner", &self.interner)
            .finish()
    }
}

type NativeFn = Box<dyn Fn(&Frame, Vec<Value>) -> Result<Value>>;

/// Configuration for a [`Runtime`].
pub struct RuntimeBuilder {
    std_builtins: bool,
    natives: Vec<(String, NativeFn)>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        RuntimeBuilder {
            std_builtins: true,
            natives: vec![],
        }
    }

    /// Whether to register the standard builtins (`len`, `print`, ...). On by default.
    pub fn std_builtins(mut self, value: bool) -> Self {
        self.std_builtins = value;
        self
    }

    /// Register a native function. A later registration under the same name
    /// replaces an earlier one, including a standard builtin.
    pub fn builtin(
        mut self,
        name: impl Into<String>,
        native: impl Fn(&Frame, Vec<Value>) -> Result<Value> + 'static,
    ) -> Self {
        self.natives.push((name.into(), Box::new(native)));
        self
    }

    pub fn build(self) -> Rc<Runtime> {
        let interner = Interner::new();
        let mut table = FnvHashMap::default();

        let std: &[_] = if self.std_builtins {
            builtins::STANDARD
        } else {
            &[]
        };
        let std = std
            .iter()
            .map(|&(name, native)| (name.to_owned(), Box::new(native) as NativeFn));

        for (name, native) in std.chain(self.natives) {
            let name = interner.intern(&name);
            tracing::debug!(%name, "register builtin");
            let builtin = Builtin::from_boxed(name.clone(), native);
            table.insert(name, Value::Builtin(Rc::new(builtin)));
        }

        Rc::new(Runtime {
            globals: Rc::new(RefCell::new(Names::default())),
            builtins: table,
            interner,
            retained: Retained::default(),
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
