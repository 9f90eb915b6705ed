//! Dynamic runtime values.
//!
//! A [`Variable`] is a reference-counted node in a value graph: a tagged
//! payload plus an ordered list of named child edges. Sharing is by
//! `Rc`, so lifetimes are reference counted; reference cycles (such as
//! `a.self = a`) leak, which is an accepted limitation of the model.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ScriptResult;
use crate::interpreter::Interpreter;

use super::link::VarLink;

/// Reserved child name linking an object to its parent class.
pub const PROTOTYPE_CLASS: &str = "prototype";
/// Reserved child name holding a call frame's result.
pub const RETURN_VAR: &str = "return";

/// Shared handle to a variable.
pub type VarRef = Rc<RefCell<Variable>>;

/// A host callback. The interpreter is passed explicitly so natives like
/// `eval` can re-enter it; the callback's captures replace the usual
/// opaque user-data pointer.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, &VarRef) -> ScriptResult<()>>;

/// How a function value executes.
#[derive(Clone)]
pub enum FunctionKind {
    /// Script function: the captured body source is re-lexed per call.
    Script,
    /// Host-implemented function.
    Native(NativeFn),
}

impl std::fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionKind::Script => write!(f, "Script"),
            FunctionKind::Native(_) => write!(f, "Native(..)"),
        }
    }
}

/// Payload of a function value.
#[derive(Clone, Debug)]
pub struct Function {
    /// Parameter names in declaration order.
    pub params: Vec<String>,
    /// Body source, brace to brace. Empty for natives.
    pub body: String,
    pub kind: FunctionKind,
}

/// Tagged payload of a variable. Exactly one variant is live at a time;
/// "numeric" means `Int`, `Double` or `Null`.
#[derive(Clone, Debug)]
pub enum Data {
    Undefined,
    Null,
    Int(i64),
    Double(f64),
    String(String),
    Function(Function),
    Object,
    Array,
}

/// A dynamic value: tagged payload plus named children.
#[derive(Debug)]
pub struct Variable {
    pub data: Data,
    children: Vec<VarLink>,
}

impl Variable {
    fn alloc(data: Data) -> VarRef {
        Rc::new(RefCell::new(Variable {
            data,
            children: Vec::new(),
        }))
    }

    /// Create an undefined value.
    pub fn undefined() -> VarRef {
        Variable::alloc(Data::Undefined)
    }

    /// Create a null value.
    pub fn null() -> VarRef {
        Variable::alloc(Data::Null)
    }

    /// Create an integer value.
    pub fn int(value: i64) -> VarRef {
        Variable::alloc(Data::Int(value))
    }

    /// Create an integer 1/0 from a boolean.
    pub fn bool(value: bool) -> VarRef {
        Variable::int(value as i64)
    }

    /// Create a double value.
    pub fn double(value: f64) -> VarRef {
        Variable::alloc(Data::Double(value))
    }

    /// Create a string value.
    pub fn string(value: impl Into<String>) -> VarRef {
        Variable::alloc(Data::String(value.into()))
    }

    /// Create an empty object.
    pub fn object() -> VarRef {
        Variable::alloc(Data::Object)
    }

    /// Create an empty array.
    pub fn array() -> VarRef {
        Variable::alloc(Data::Array)
    }

    /// Create a function value.
    pub fn function(func: Function) -> VarRef {
        Variable::alloc(Data::Function(func))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.data, Data::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, Data::Null)
    }

    pub fn is_int(&self) -> bool {
        matches!(self.data, Data::Int(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self.data, Data::Double(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, Data::Int(_) | Data::Double(_) | Data::Null)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.data, Data::String(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.data, Data::Function(_))
    }

    pub fn is_native(&self) -> bool {
        matches!(
            self.data,
            Data::Function(Function {
                kind: FunctionKind::Native(_),
                ..
            })
        )
    }

    pub fn is_object(&self) -> bool {
        matches!(self.data, Data::Object)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.data, Data::Array)
    }

    /// A basic value has no children; basics are passed by value at call
    /// sites, everything else by reference.
    pub fn is_basic(&self) -> bool {
        self.children.is_empty()
    }

    /// Integer coercion. Strings parse like `strtol` with base detection
    /// (`0x` hex, leading `0` octal); doubles truncate.
    pub fn get_int(&self) -> i64 {
        match &self.data {
            Data::Int(v) => *v,
            Data::Double(v) => *v as i64,
            Data::String(s) => parse_int_literal(s),
            _ => 0,
        }
    }

    pub fn get_bool(&self) -> bool {
        self.get_int() != 0
    }

    /// Double coercion. Strings parse like `strtod`.
    pub fn get_double(&self) -> f64 {
        match &self.data {
            Data::Double(v) => *v,
            Data::Int(v) => *v as f64,
            Data::String(s) => parse_double_literal(s),
            _ => 0.0,
        }
    }

    /// String coercion. Numbers format on demand; a function renders as
    /// its body source.
    pub fn get_string(&self) -> String {
        match &self.data {
            Data::Int(v) => v.to_string(),
            Data::Double(v) => format!("{:.6}", v),
            Data::Null => "null".to_string(),
            Data::Undefined => "undefined".to_string(),
            Data::String(s) => s.clone(),
            Data::Function(f) => f.body.clone(),
            Data::Object | Data::Array => String::new(),
        }
    }

    pub fn set_int(&mut self, value: i64) {
        self.data = Data::Int(value);
    }

    pub fn set_double(&mut self, value: f64) {
        self.data = Data::Double(value);
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        self.data = Data::String(value.into());
    }

    pub fn set_undefined(&mut self) {
        self.data = Data::Undefined;
        self.children.clear();
    }

    pub fn set_array(&mut self) {
        self.data = Data::Array;
        self.children.clear();
    }

    /// The ordered child edges.
    pub fn children(&self) -> &[VarLink] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<VarLink> {
        &mut self.children
    }

    /// Number of children.
    pub fn get_children(&self) -> usize {
        self.children.len()
    }

    /// First child with the given name, if any.
    pub fn find_child(&self, name: &str) -> Option<&VarLink> {
        self.children.iter().find(|link| link.name == name)
    }

    /// Shared handle to the first child with the given name.
    pub fn find_child_var(&self, name: &str) -> Option<VarRef> {
        self.find_child(name).map(|link| Rc::clone(&link.var))
    }

    /// Find a child, creating an undefined one when missing.
    pub fn find_child_or_create(&mut self, name: &str) -> VarRef {
        if let Some(link) = self.find_child(name) {
            return Rc::clone(&link.var);
        }
        let var = Variable::undefined();
        self.add_child(name, Rc::clone(&var));
        var
    }

    /// Append a child edge. An undefined parent silently becomes an
    /// object.
    pub fn add_child(&mut self, name: impl Into<String>, child: VarRef) {
        if self.is_undefined() {
            self.data = Data::Object;
        }
        self.children.push(VarLink::new(name, child));
    }

    /// Add a child, re-targeting any existing edge with the same name.
    pub fn add_child_no_dup(&mut self, name: impl Into<String>, child: VarRef) {
        let name = name.into();
        match self.children.iter_mut().find(|link| link.name == name) {
            Some(link) => link.var = child,
            None => self.add_child(name, child),
        }
    }

    /// Remove the first child edge with the given name.
    pub fn remove_link(&mut self, name: &str) {
        if let Some(idx) = self.children.iter().position(|link| link.name == name) {
            self.children.remove(idx);
        }
    }

    pub fn remove_all_children(&mut self) {
        self.children.clear();
    }

    /// The value at an array index; a missing index reads as null.
    pub fn get_array_index(&self, idx: i64) -> VarRef {
        match self.find_child_var(&idx.to_string()) {
            Some(var) => var,
            None => Variable::null(),
        }
    }

    /// Set the value at an array index; storing undefined removes the
    /// slot.
    pub fn set_array_index(&mut self, idx: i64, value: VarRef) {
        let name = idx.to_string();
        let undefined = value.borrow().is_undefined();
        match self.children.iter().position(|link| link.name == name) {
            Some(i) => {
                if undefined {
                    self.children.remove(i);
                } else {
                    self.children[i].var = value;
                }
            }
            None => {
                if !undefined {
                    self.add_child(name, value);
                }
            }
        }
    }

    /// One more than the highest decimal-named index, or 0.
    pub fn get_array_length(&self) -> i64 {
        if !self.is_array() {
            return 0;
        }
        let mut highest: i64 = -1;
        for link in &self.children {
            if is_number(&link.name) {
                let val = parse_int_literal(&link.name);
                if val > highest {
                    highest = val;
                }
            }
        }
        highest + 1
    }

    /// Call-frame accessor: the parameter with the given name, created
    /// undefined if the caller did not bind it.
    pub fn get_parameter(&mut self, name: &str) -> VarRef {
        self.find_child_or_create(name)
    }

    /// Call-frame accessor: the result slot, for use by natives.
    pub fn get_return_var(&mut self) -> VarRef {
        self.find_child_or_create(RETURN_VAR)
    }

    /// Set the call result without copying.
    pub fn set_return_var(&mut self, value: VarRef) {
        self.add_child_no_dup(RETURN_VAR, value);
    }

    /// Copy payload and type from another variable, without children.
    fn copy_simple_data(&mut self, other: &Variable) {
        self.data = other.data.clone();
    }

    /// Debug rendering of the type for trace dumps.
    pub fn get_flags_string(&self) -> String {
        let mut flags = String::new();
        if self.is_function() {
            flags.push_str("FUNCTION ");
        }
        if self.is_object() {
            flags.push_str("OBJECT ");
        }
        if self.is_array() {
            flags.push_str("ARRAY ");
        }
        if self.is_native() {
            flags.push_str("NATIVE ");
        }
        if self.is_double() {
            flags.push_str("DOUBLE ");
        }
        if self.is_int() {
            flags.push_str("INTEGER ");
        }
        if self.is_string() {
            flags.push_str("STRING ");
        }
        flags
    }
}

/// Structural copy. Children are cloned recursively, except that a child
/// named `prototype` is shared with the original rather than cloned.
pub fn deep_copy(var: &VarRef) -> VarRef {
    let source = var.borrow();
    let copy = Variable::alloc(source.data.clone());
    for link in source.children() {
        let child = if link.name == PROTOTYPE_CLASS {
            Rc::clone(&link.var)
        } else {
            deep_copy(&link.var)
        };
        copy.borrow_mut().add_child(link.name.clone(), child);
    }
    copy
}

/// In-place version of [`deep_copy`]: make `dest` a structural copy of
/// `src`.
pub fn copy_value(dest: &VarRef, src: &VarRef) {
    if Rc::ptr_eq(dest, src) {
        return;
    }
    let mut d = dest.borrow_mut();
    let s = src.borrow();
    d.copy_simple_data(&s);
    d.remove_all_children();
    for link in s.children() {
        let child = if link.name == PROTOTYPE_CLASS {
            Rc::clone(&link.var)
        } else {
            deep_copy(&link.var)
        };
        d.add_child(link.name.clone(), child);
    }
}

/// Navigate a dotted path, creating intermediate objects as needed.
pub fn find_child_or_create_by_path(var: &VarRef, path: &str) -> VarRef {
    match path.split_once('.') {
        None => var.borrow_mut().find_child_or_create(path),
        Some((head, rest)) => {
            let child = var.borrow_mut().find_child_or_create(head);
            if child.borrow().is_undefined() {
                child.borrow_mut().data = Data::Object;
            }
            find_child_or_create_by_path(&child, rest)
        }
    }
}

/// Recursive debug dump of a value graph through the logging layer.
pub fn trace(var: &VarRef, indent: &str, name: &str) {
    {
        let v = var.borrow();
        tracing::debug!("{}'{}' = '{}' {}", indent, name, v.get_string(), v.get_flags_string());
    }
    let child_indent = format!("{} ", indent);
    let v = var.borrow();
    for link in v.children() {
        trace(&link.var, &child_indent, &link.name);
    }
}

/// True when the string is all decimal digits.
pub fn is_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// `strtol`-style integer parse: optional sign, `0x` hex or leading-zero
/// octal base detection, stopping at the first invalid digit.
pub fn parse_int_literal(text: &str) -> i64 {
    let t = text.trim();
    let (negative, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let (radix, digits) = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (16, hex)
    } else if t.len() > 1 && t.starts_with('0') {
        (8, &t[1..])
    } else {
        (10, t)
    };
    let mut value: i64 = 0;
    for ch in digits.chars() {
        match ch.to_digit(radix) {
            Some(d) => value = value.wrapping_mul(radix as i64).wrapping_add(d as i64),
            None => break,
        }
    }
    if negative {
        -value
    } else {
        value
    }
}

/// `strtod`-style double parse: the longest valid numeric prefix, 0.0
/// when there is none.
pub fn parse_double_literal(text: &str) -> f64 {
    let t = text.trim();
    let bytes = t.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mark = end;
        end += 1;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        if end < bytes.len() && bytes[end].is_ascii_digit() {
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        } else {
            end = mark;
        }
    }
    t[..end].parse().unwrap_or(0.0)
}
