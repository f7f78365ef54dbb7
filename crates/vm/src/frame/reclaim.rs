//! Releasing call frames that only their own functions keep alive.
//!
//! A function holds its defining frame, and that frame usually holds the
//! function as a local, so reference counting alone never frees the pair.
//! When a call returns, its frame is traced instead: every allocation
//! reachable from the frame is counted, and references not explained by the
//! traced graph are treated as roots. If no root reaches the frame, the locals
//! of every unreachable frame in the graph are cleared, which breaks the
//! cycles and lets the counts drop to zero.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use fnv::{FnvHashMap, FnvHashSet};
use smy_util::by_ptr::AsCmpPtr;

use super::{Frame, FrameData};
use crate::call::{Func, Method};
use crate::class::{Class, Object};
use crate::value::Value;

#[derive(Default)]
struct Node {
    strong: usize,
    /// References held by other nodes of the graph.
    internal: usize,
    edges: Vec<usize>,
    frame: Option<Weak<FrameData>>,
}

/// Reference counts of the graph reachable from one frame, keyed by address.
///
/// Nothing here clones an `Rc`, so the counts read are the ones the rest of
/// the program holds. A cell that is mutably borrowed is not descended into;
/// whatever it holds then looks externally referenced and is kept.
struct Tracer {
    nodes: FnvHashMap<usize, Node>,
    /// Frames never traced: the top level and the ancestors of the root.
    skip: FnvHashSet<usize>,
}

impl Tracer {
    /// Returns `false` if `addr` was already visited.
    fn enter(&mut self, addr: usize, strong: usize) -> bool {
        if self.nodes.contains_key(&addr) {
            return false;
        }
        let node = Node {
            strong,
            ..Node::default()
        };
        self.nodes.insert(addr, node);
        true
    }

    fn link(&mut self, from: usize, to: Option<usize>) {
        let to = match to {
            Some(to) => to,
            None => return,
        };
        if let Some(node) = self.nodes.get_mut(&to) {
            node.internal += 1;
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.edges.push(to);
        }
    }

    fn children<'v>(&mut self, from: usize, values: impl IntoIterator<Item = &'v Value>) {
        for value in values {
            let to = self.value(value);
            self.link(from, to);
        }
    }

    fn value(&mut self, value: &Value) -> Option<usize> {
        match value {
            Value::Tuple(t) => {
                let addr = t.addr();
                if self.enter(addr, Rc::strong_count(t)) {
                    self.children(addr, t.iter());
                }
                Some(addr)
            }
            Value::List(l) => {
                let addr = l.addr();
                if self.enter(addr, Rc::strong_count(l)) {
                    if let Ok(items) = l.try_borrow() {
                        self.children(addr, items.iter());
                    }
                }
                Some(addr)
            }
            Value::Dict(d) => {
                let addr = d.addr();
                if self.enter(addr, Rc::strong_count(d)) {
                    if let Ok(map) = d.try_borrow() {
                        for (k, v) in map.iter() {
                            self.children(addr, [k.value(), v]);
                        }
                    }
                }
                Some(addr)
            }
            Value::Set(s) => {
                let addr = s.addr();
                if self.enter(addr, Rc::strong_count(s)) {
                    if let Ok(set) = s.try_borrow() {
                        self.children(addr, set.iter().map(|k| k.value()));
                    }
                }
                Some(addr)
            }
            Value::Class(c) => self.class(c),
            Value::Object(o) => self.object(o),
            Value::Func(f) => self.func(f),
            Value::Method(m) => self.method(m),
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Double(_)
            | Value::String(_)
            | Value::Builtin(_) => None,
        }
    }

    fn class(&mut self, class: &Rc<Class>) -> Option<usize> {
        let addr = class.addr();
        if self.enter(addr, Rc::strong_count(class)) {
            if let Some(superclass) = class.superclass() {
                let to = self.class(superclass);
                self.link(addr, to);
            }
            if let Ok(attrs) = class.own_attrs().try_borrow() {
                self.children(addr, attrs.values());
            }
        }
        Some(addr)
    }

    fn object(&mut self, object: &Rc<Object>) -> Option<usize> {
        let addr = object.addr();
        if self.enter(addr, Rc::strong_count(object)) {
            let to = self.class(object.class());
            self.link(addr, to);
            if let Ok(attrs) = object.own_attrs().try_borrow() {
                self.children(addr, attrs.values());
            }
        }
        Some(addr)
    }

    fn func(&mut self, func: &Rc<Func>) -> Option<usize> {
        let addr = func.addr();
        if self.enter(addr, Rc::strong_count(func)) {
            let to = self.frame(func.defining_frame());
            self.link(addr, to);
        }
        Some(addr)
    }

    fn method(&mut self, method: &Rc<Method>) -> Option<usize> {
        let addr = method.addr();
        if self.enter(addr, Rc::strong_count(method)) {
            let to = self.object(method.receiver());
            self.link(addr, to);
            let to = self.func(method.func());
            self.link(addr, to);
        }
        Some(addr)
    }

    fn frame(&mut self, frame: &Frame) -> Option<usize> {
        let addr = frame.0.addr();
        if frame.is_top_level() || self.skip.contains(&addr) {
            return None;
        }
        if self.enter(addr, Rc::strong_count(&frame.0)) {
            if let Some(node) = self.nodes.get_mut(&addr) {
                node.frame = Some(Rc::downgrade(&frame.0));
            }
            if let Some(parent) = frame.parent() {
                let to = self.frame(parent);
                self.link(addr, to);
            }
            if let Ok(locals) = frame.0.locals.try_borrow() {
                self.children(addr, locals.values());
            }
        }
        Some(addr)
    }

    /// Everything reachable from a node that is referenced from outside.
    fn live(&self) -> FnvHashSet<usize> {
        let mut live = FnvHashSet::default();
        let mut stack = self
            .nodes
            .iter()
            .filter(|(_, node)| node.strong > node.internal)
            .map(|(addr, _)| *addr)
            .collect::<Vec<_>>();
        while let Some(addr) = stack.pop() {
            if live.insert(addr) {
                if let Some(node) = self.nodes.get(&addr) {
                    stack.extend(node.edges.iter().copied());
                }
            }
        }
        live
    }
}

/// Call frames that were still reachable when their call returned.
///
/// They are traced again by [`Retained::collect`], which also runs on its own
/// once the list has doubled since the last collection.
#[derive(Default)]
pub(crate) struct Retained {
    frames: RefCell<Vec<Weak<FrameData>>>,
    limit: Cell<usize>,
}

const MIN_RETAINED: usize = 64;

impl Retained {
    fn push(&self, frame: &Frame) {
        let len = {
            let mut frames = self.frames.borrow_mut();
            frames.push(Rc::downgrade(&frame.0));
            frames.len()
        };
        if len >= self.limit.get().max(MIN_RETAINED) {
            self.collect();
        }
    }

    /// Trace every retained frame again. Returns the number of frames released.
    pub(crate) fn collect(&self) -> usize {
        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        let mut survivors = Vec::with_capacity(frames.len());
        let mut released = 0;
        for weak in frames {
            let frame = match weak.upgrade() {
                Some(data) => Frame(data),
                None => continue,
            };
            match frame.reclaim() {
                0 => survivors.push(weak),
                n => released += n,
            }
        }
        tracing::debug!(released, retained = survivors.len(), "collect frames");
        self.limit.set(survivors.len() * 2);
        self.frames.borrow_mut().extend(survivors);
        released
    }
}

impl Frame {
    /// Record that a function holds this frame, and through it every
    /// enclosing frame.
    pub(crate) fn mark_captured(&self) {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.0.captured.replace(true) {
                break;
            }
            frame = current.parent();
        }
    }

    /// Give up the handle to a frame whose call has returned.
    ///
    /// `self` must be the caller's only handle. If the frame is otherwise
    /// reachable only from its own locals, those locals are cleared, along
    /// with those of any other frame left unreachable with it. A frame that
    /// is still reachable is retained by the runtime and traced again later.
    pub(crate) fn release(self) {
        if !self.0.captured.get() || Rc::strong_count(&self.0) == 1 {
            return;
        }
        if self.reclaim() == 0 {
            self.runtime().retained().push(&self);
        }
    }

    /// Clear every frame of the graph around `self` that nothing outside the
    /// graph reaches, unless `self` is reachable. `self` is not counted as an
    /// outside reference. Returns the number of frames cleared.
    fn reclaim(&self) -> usize {
        let mut tracer = Tracer {
            nodes: FnvHashMap::default(),
            skip: std::iter::successors(self.parent(), |f| f.parent())
                .map(|f| f.0.addr())
                .collect(),
        };
        let root = match tracer.frame(self) {
            Some(root) => root,
            None => return 0,
        };
        if let Some(node) = tracer.nodes.get_mut(&root) {
            node.strong = node.strong.saturating_sub(1);
        }
        let live = tracer.live();
        if live.contains(&root) {
            tracing::trace!(nodes = tracer.nodes.len(), "call frame still reachable");
            return 0;
        }

        let garbage = tracer
            .nodes
            .into_iter()
            .filter(|(addr, _)| !live.contains(addr))
            .filter_map(|(_, node)| node.frame)
            .collect::<Vec<_>>();
        tracing::trace!(frames = garbage.len(), "release call frames");
        let mut cleared = 0;
        for frame in garbage {
            if let Some(data) = frame.upgrade() {
                let locals = match data.locals.try_borrow_mut() {
                    Ok(mut locals) => std::mem::take(&mut *locals),
                    Err(_) => continue,
                };
                drop(locals);
                cleared += 1;
            }
        }
        cleared
    }
}
