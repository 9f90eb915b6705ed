//! # Error Definitions
//!
//! This module defines the error type shared by the lexer, the evaluator
//! and the embedding API. Errors can occur:
//!
//! - While tokenizing or parsing malformed input (`Syntax`)
//! - When an operator is applied to operands that do not support it, or a
//!   non-function is called (`Type`)
//! - When `new` names an unknown class (`Name`, recoverable)
//! - When a `while`/`for` loop exceeds the iteration guard (`Loop`)
//! - When an internal invariant is broken (`Internal`)
//!
//! ## Error Reporting
//!
//! Errors that escape a top-level entry point are annotated with the call
//! stack and the source position before they reach the host:
//!
//! ```text
//! Error Got ')' expected ID
//! 0: add from (line: 3, col: 12)
//! 1: main from (line: 9, col: 1) at (line: 3, col: 14)
//! ```

use std::fmt;

/// Result alias used throughout the engine.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Classification of an engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input detected by the lexer or a parser token mismatch.
    Syntax,
    /// An operation applied to operands that do not support it.
    Type,
    /// `new` with an unknown class name. Recoverable: the expression
    /// yields `undefined` and evaluation continues.
    Name,
    /// The loop iteration guard fired.
    Loop,
    /// A broken internal invariant. Always a bug.
    Internal,
}

impl ErrorKind {
    /// Human-readable name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Name => "NameError",
            ErrorKind::Loop => "LoopError",
            ErrorKind::Internal => "InternalError",
        }
    }
}

/// An error raised while parsing or executing script code.
#[derive(Debug, Clone)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ScriptError {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>) -> Self {
        ScriptError {
            kind: ErrorKind::Syntax,
            message: message.into(),
        }
    }

    /// Create a type error.
    pub fn type_error(message: impl Into<String>) -> Self {
        ScriptError {
            kind: ErrorKind::Type,
            message: message.into(),
        }
    }

    /// Create a name error.
    pub fn name(message: impl Into<String>) -> Self {
        ScriptError {
            kind: ErrorKind::Name,
            message: message.into(),
        }
    }

    /// Create a loop-guard error.
    pub fn loop_error(message: impl Into<String>) -> Self {
        ScriptError {
            kind: ErrorKind::Loop,
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ScriptError {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error {}", self.message)
    }
}

impl std::error::Error for ScriptError {}
