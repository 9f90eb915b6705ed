//! Ruscript - a small, embeddable JavaScript-like scripting engine
//!
//! This library provides the core components for lexing, parsing and
//! directly evaluating scripts: there is no AST and no bytecode, the
//! recursive-descent parser executes as it goes. Hosts embed an
//! [`Interpreter`], run code through it and register native callbacks
//! that scripts can call.

pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod natives;

pub use error::{ErrorKind, ScriptError, ScriptResult};
pub use interpreter::Interpreter;
