//! The interpreter and its embedding API.
//!
//! An [`Interpreter`] owns the global `root` object, the built-in
//! `String`/`Array`/`Object` class objects and the scope stack. Hosts
//! feed it source through [`Interpreter::execute`] and
//! [`Interpreter::evaluate`], reach into the value graph with the
//! variable accessors, and register callbacks with
//! [`Interpreter::add_native`].

mod eval;
mod json;
mod link;
mod ops;
mod scope;
mod value;

pub use json::get_js_string;
pub use link::{Place, VarLink};
pub use ops::{equals, maths_op};
pub use scope::ScopeStack;
pub use value::{
    copy_value, deep_copy, find_child_or_create_by_path, is_number, parse_double_literal,
    parse_int_literal, trace, Data, Function, FunctionKind, NativeFn, VarRef, Variable,
    PROTOTYPE_CLASS, RETURN_VAR,
};

use std::mem;
use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::lexer::{Lexer, TokenKind};

/// Cooperative bound on loop replays; a `while`/`for` loop that exceeds
/// it raises a loop error.
pub const LOOP_MAX_ITERATIONS: u32 = 8192;

/// A tree-walking script interpreter.
pub struct Interpreter {
    /// Root of the symbol table, exposed for host-side manipulation.
    pub root: VarRef,
    string_class: VarRef,
    array_class: VarRef,
    object_class: VarRef,
    pub(crate) scopes: ScopeStack,
    /// Names of places called, so errors can show where they came from.
    pub(crate) call_stack: Vec<String>,
}

impl Interpreter {
    /// Create an interpreter with a fresh root and the built-in class
    /// objects.
    pub fn new() -> Self {
        let root = Variable::object();
        let string_class = Variable::object();
        let array_class = Variable::object();
        let object_class = Variable::object();
        root.borrow_mut()
            .add_child("String", Rc::clone(&string_class));
        root.borrow_mut().add_child("Array", Rc::clone(&array_class));
        root.borrow_mut()
            .add_child("Object", Rc::clone(&object_class));
        Interpreter {
            scopes: ScopeStack::new(Rc::clone(&root)),
            root,
            string_class,
            array_class,
            object_class,
            call_stack: Vec::new(),
        }
    }

    /// Parse and execute a program.
    pub fn execute(&mut self, code: &str) -> ScriptResult<()> {
        let mut l = Lexer::new(code);
        let saved_scopes = mem::replace(&mut self.scopes, ScopeStack::new(Rc::clone(&self.root)));
        let saved_call_stack = mem::take(&mut self.call_stack);
        let mut execute = true;
        let mut result = Ok(());
        while l.tk != TokenKind::Eof {
            if let Err(e) = self.statement(&mut l, &mut execute) {
                result = Err(self.annotate_error(e, &l));
                break;
            }
        }
        self.scopes = saved_scopes;
        self.call_stack = saved_call_stack;
        result
    }

    /// Evaluate one or more `;`-separated expressions and return the last
    /// one's value. The whole input must parse: anything left over after
    /// the final expression is an error.
    pub fn evaluate_complex(&mut self, code: &str) -> ScriptResult<Place> {
        let mut l = Lexer::new(code);
        let saved_scopes = mem::replace(&mut self.scopes, ScopeStack::new(Rc::clone(&self.root)));
        let saved_call_stack = mem::take(&mut self.call_stack);
        let mut execute = true;
        let mut value: Option<Place> = None;
        let mut result = Ok(());
        loop {
            match self.base(&mut l, &mut execute) {
                Ok(v) => value = Some(v),
                Err(e) => {
                    result = Err(self.annotate_error(e, &l));
                    break;
                }
            }
            if l.tk != TokenKind::Eof {
                if let Err(e) = l.match_token(TokenKind::Char(b';')) {
                    result = Err(self.annotate_error(e, &l));
                    break;
                }
            }
            if l.tk == TokenKind::Eof {
                break;
            }
        }
        self.scopes = saved_scopes;
        self.call_stack = saved_call_stack;
        result?;
        Ok(value.unwrap_or_else(|| Place::temp(Variable::undefined())))
    }

    /// Evaluate an expression and coerce the result to a string.
    pub fn evaluate(&mut self, code: &str) -> ScriptResult<String> {
        Ok(self.evaluate_complex(code)?.var.borrow().get_string())
    }

    /// Register a host callback under a signature of the form
    /// `function [Class.[Class.]]name(param, param)`. Dotted prefixes
    /// become object children of root, created on demand.
    pub fn add_native<F>(&mut self, signature: &str, callback: F) -> ScriptResult<()>
    where
        F: Fn(&mut Interpreter, &VarRef) -> ScriptResult<()> + 'static,
    {
        let mut l = Lexer::new(signature);
        let mut base = Rc::clone(&self.root);
        l.match_token(TokenKind::Function)?;
        let mut func_name = l.tk_str.clone();
        l.match_token(TokenKind::Id)?;
        while l.tk == TokenKind::Char(b'.') {
            l.match_token(TokenKind::Char(b'.'))?;
            let existing = base.borrow().find_child_var(&func_name);
            let next = match existing {
                Some(var) => var,
                None => {
                    let class = Variable::object();
                    base.borrow_mut()
                        .add_child(func_name.clone(), Rc::clone(&class));
                    class
                }
            };
            base = next;
            func_name = l.tk_str.clone();
            l.match_token(TokenKind::Id)?;
        }
        let params = self.parse_function_arguments(&mut l)?;
        let func = Variable::function(Function {
            params,
            body: String::new(),
            kind: FunctionKind::Native(Rc::new(callback)),
        });
        base.borrow_mut().add_child(func_name, func);
        Ok(())
    }

    /// Get the variable at a dotted path, if it exists.
    pub fn get_script_variable(&self, path: &str) -> Option<VarRef> {
        let mut var = Rc::clone(&self.root);
        for part in path.split('.') {
            let next = var.borrow().find_child_var(part)?;
            var = next;
        }
        Some(var)
    }

    /// Get the coerced string value of the variable at a dotted path.
    pub fn get_variable(&self, path: &str) -> Option<String> {
        self.get_script_variable(path)
            .map(|var| var.borrow().get_string())
    }

    /// Set the variable at a dotted path from a string, respecting its
    /// current type. Returns false if the path does not resolve.
    pub fn set_variable(&mut self, path: &str, value: &str) -> bool {
        match self.get_script_variable(path) {
            Some(var) => {
                let mut v = var.borrow_mut();
                if v.is_int() {
                    v.set_int(value::parse_int_literal(value));
                } else if v.is_double() {
                    v.set_double(value::parse_double_literal(value));
                } else {
                    v.set_string(value);
                }
                true
            }
            None => false,
        }
    }

    /// Dump the whole value graph through the logging layer.
    pub fn trace(&self) {
        trace(&self.root, "", "");
    }

    /// Look a member up in an object's prototype chain, falling back to
    /// the built-in class object for the value's type.
    pub(crate) fn find_in_parent_classes(&self, object: &VarRef, name: &str) -> Option<Place> {
        let mut parent_class = object.borrow().find_child_var(PROTOTYPE_CLASS);
        while let Some(class) = parent_class {
            if let Some(var) = class.borrow().find_child_var(name) {
                return Some(Place::owned(Rc::clone(&class), name, var));
            }
            let next = class.borrow().find_child_var(PROTOTYPE_CLASS);
            parent_class = next;
        }
        if object.borrow().is_string() {
            if let Some(var) = self.string_class.borrow().find_child_var(name) {
                return Some(Place::owned(Rc::clone(&self.string_class), name, var));
            }
        }
        if object.borrow().is_array() {
            if let Some(var) = self.array_class.borrow().find_child_var(name) {
                return Some(Place::owned(Rc::clone(&self.array_class), name, var));
            }
        }
        self.object_class
            .borrow()
            .find_child_var(name)
            .map(|var| Place::owned(Rc::clone(&self.object_class), name, var))
    }

    fn annotate_error(&self, error: ScriptError, l: &Lexer) -> ScriptError {
        let mut message = error.message;
        for (i, frame) in self.call_stack.iter().rev().enumerate() {
            message.push_str(&format!("\n{}: {}", i, frame));
        }
        message.push_str(&format!(" at {}", l.position(None)));
        ScriptError {
            kind: error.kind,
            message,
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
