//! Arithmetic and comparison dispatch over dynamic values.

use std::mem::discriminant;
use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::lexer::TokenKind;

use super::value::{VarRef, Variable};

/// Apply `op` to two values, producing a fresh result value.
///
/// Dispatch, in order: strict (type-then-value) equality; undefined
/// pairs; numeric operands as integers unless either is a double;
/// arrays/objects by identity for equality only; everything else through
/// string coercion.
pub fn maths_op(a: &VarRef, b: &VarRef, op: TokenKind) -> ScriptResult<VarRef> {
    if op == TokenKind::TypeEqual || op == TokenKind::NotTypeEqual {
        // check type first, then recurse to check data
        let mut eql = discriminant(&a.borrow().data) == discriminant(&b.borrow().data);
        if eql {
            let contents = maths_op(a, b, TokenKind::Equal)?;
            if !contents.borrow().get_bool() {
                eql = false;
            }
        }
        return Ok(if op == TokenKind::TypeEqual {
            Variable::bool(eql)
        } else {
            Variable::bool(!eql)
        });
    }

    let a_undefined = a.borrow().is_undefined();
    let b_undefined = b.borrow().is_undefined();
    if a_undefined && b_undefined {
        return Ok(match op {
            TokenKind::Equal => Variable::bool(true),
            TokenKind::NotEqual => Variable::bool(false),
            _ => Variable::undefined(),
        });
    }

    let a_numericish = a.borrow().is_numeric() || a_undefined;
    let b_numericish = b.borrow().is_numeric() || b_undefined;
    if a_numericish && b_numericish {
        if !a.borrow().is_double() && !b.borrow().is_double() {
            let da = a.borrow().get_int();
            let db = b.borrow().get_int();
            return match op {
                TokenKind::Char(b'+') => Ok(Variable::int(da.wrapping_add(db))),
                TokenKind::Char(b'-') => Ok(Variable::int(da.wrapping_sub(db))),
                TokenKind::Char(b'*') => Ok(Variable::int(da.wrapping_mul(db))),
                TokenKind::Char(b'/') => match da.checked_div(db) {
                    Some(v) => Ok(Variable::int(v)),
                    None => Err(ScriptError::type_error("Division by zero")),
                },
                TokenKind::Char(b'&') => Ok(Variable::int(da & db)),
                TokenKind::Char(b'|') => Ok(Variable::int(da | db)),
                TokenKind::Char(b'^') => Ok(Variable::int(da ^ db)),
                TokenKind::Char(b'%') => match da.checked_rem(db) {
                    Some(v) => Ok(Variable::int(v)),
                    None => Err(ScriptError::type_error("Division by zero")),
                },
                TokenKind::Equal => Ok(Variable::bool(da == db)),
                TokenKind::NotEqual => Ok(Variable::bool(da != db)),
                TokenKind::Char(b'<') => Ok(Variable::bool(da < db)),
                TokenKind::LessEqual => Ok(Variable::bool(da <= db)),
                TokenKind::Char(b'>') => Ok(Variable::bool(da > db)),
                TokenKind::GreaterEqual => Ok(Variable::bool(da >= db)),
                _ => Err(unsupported(op, "Int")),
            };
        }
        let da = a.borrow().get_double();
        let db = b.borrow().get_double();
        return match op {
            TokenKind::Char(b'+') => Ok(Variable::double(da + db)),
            TokenKind::Char(b'-') => Ok(Variable::double(da - db)),
            TokenKind::Char(b'*') => Ok(Variable::double(da * db)),
            TokenKind::Char(b'/') => Ok(Variable::double(da / db)),
            TokenKind::Equal => Ok(Variable::bool(da == db)),
            TokenKind::NotEqual => Ok(Variable::bool(da != db)),
            TokenKind::Char(b'<') => Ok(Variable::bool(da < db)),
            TokenKind::LessEqual => Ok(Variable::bool(da <= db)),
            TokenKind::Char(b'>') => Ok(Variable::bool(da > db)),
            TokenKind::GreaterEqual => Ok(Variable::bool(da >= db)),
            _ => Err(unsupported(op, "Double")),
        };
    }

    if a.borrow().is_array() {
        // just check identity
        return match op {
            TokenKind::Equal => Ok(Variable::bool(Rc::ptr_eq(a, b))),
            TokenKind::NotEqual => Ok(Variable::bool(!Rc::ptr_eq(a, b))),
            _ => Err(unsupported(op, "Array")),
        };
    }
    if a.borrow().is_object() {
        return match op {
            TokenKind::Equal => Ok(Variable::bool(Rc::ptr_eq(a, b))),
            TokenKind::NotEqual => Ok(Variable::bool(!Rc::ptr_eq(a, b))),
            _ => Err(unsupported(op, "Object")),
        };
    }

    let da = a.borrow().get_string();
    let db = b.borrow().get_string();
    match op {
        TokenKind::Char(b'+') => Ok(Variable::string(da + &db)),
        TokenKind::Equal => Ok(Variable::bool(da == db)),
        TokenKind::NotEqual => Ok(Variable::bool(da != db)),
        TokenKind::Char(b'<') => Ok(Variable::bool(da < db)),
        TokenKind::LessEqual => Ok(Variable::bool(da <= db)),
        TokenKind::Char(b'>') => Ok(Variable::bool(da > db)),
        TokenKind::GreaterEqual => Ok(Variable::bool(da >= db)),
        _ => Err(unsupported(op, "string")),
    }
}

/// Loose equality of two values.
pub fn equals(a: &VarRef, b: &VarRef) -> ScriptResult<bool> {
    Ok(maths_op(a, b, TokenKind::Equal)?.borrow().get_bool())
}

fn unsupported(op: TokenKind, datatype: &str) -> ScriptError {
    ScriptError::type_error(format!(
        "Operation {} not supported on the {} datatype",
        op.describe(),
        datatype
    ))
}
