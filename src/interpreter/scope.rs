//! The lexical scope chain.
//!
//! Scopes are ordinary object variables held on an explicit stack: the
//! global root at the bottom, one call frame pushed per function
//! invocation. Name lookup walks from the innermost frame down to the
//! root. Nested functions therefore see the dynamic call-site scopes
//! above the root, not lexically captured ones.

use std::rc::Rc;

use super::link::Place;
use super::value::VarRef;

/// Stack of scope objects forming the current scope chain.
pub struct ScopeStack {
    root: VarRef,
    frames: Vec<VarRef>,
}

impl ScopeStack {
    /// Create a scope chain containing only the global root.
    pub fn new(root: VarRef) -> Self {
        ScopeStack {
            root,
            frames: Vec::new(),
        }
    }

    /// Enter a new innermost scope.
    pub fn push(&mut self, frame: VarRef) {
        self.frames.push(frame);
    }

    /// Leave the innermost scope.
    pub fn pop(&mut self) -> Option<VarRef> {
        self.frames.pop()
    }

    /// The innermost scope object.
    pub fn current(&self) -> &VarRef {
        self.frames.last().unwrap_or(&self.root)
    }

    /// Resolve a name by searching from innermost to the global root,
    /// returning a place anchored to the scope that holds it.
    pub fn resolve(&self, name: &str) -> Option<Place> {
        for frame in self.frames.iter().rev().chain(std::iter::once(&self.root)) {
            if let Some(var) = frame.borrow().find_child_var(name) {
                return Some(Place::owned(Rc::clone(frame), name, var));
            }
        }
        None
    }
}
