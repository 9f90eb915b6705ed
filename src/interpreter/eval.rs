//! The fused recursive-descent parser/evaluator.
//!
//! Every production takes the current lexer and a mutable `execute`
//! gate. With the gate off the productions still consume tokens, so
//! syntax is validated and positions advance, but no values are created
//! and no scopes are touched. Inactive `if`/ternary branches,
//! short-circuited operands and skipped loop bodies all run this way.

use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::lexer::{Lexer, TokenKind};

use super::link::Place;
use super::ops::maths_op;
use super::value::{deep_copy, Function, FunctionKind, Variable, PROTOTYPE_CLASS, RETURN_VAR};
use super::{Interpreter, LOOP_MAX_ITERATIONS};

impl Interpreter {
    pub(crate) fn parse_function_arguments(&mut self, l: &mut Lexer) -> ScriptResult<Vec<String>> {
        l.match_token(TokenKind::Char(b'('))?;
        let mut params = Vec::new();
        while l.tk != TokenKind::Char(b')') {
            let name = l.tk_str.clone();
            if !params.contains(&name) {
                params.push(name);
            }
            l.match_token(TokenKind::Id)?;
            if l.tk != TokenKind::Char(b')') {
                l.match_token(TokenKind::Char(b','))?;
            }
        }
        l.match_token(TokenKind::Char(b')'))?;
        Ok(params)
    }

    fn parse_function_definition(&mut self, l: &mut Lexer) -> ScriptResult<Place> {
        l.match_token(TokenKind::Function)?;
        let mut func_name = String::new();
        // functions can be anonymous
        if l.tk == TokenKind::Id {
            func_name = l.tk_str.clone();
            l.match_token(TokenKind::Id)?;
        }
        let params = self.parse_function_arguments(l)?;
        let func_begin = l.token_start;
        let mut noexecute = false;
        self.block(l, &mut noexecute)?;
        let body = l.get_sub_string(func_begin);
        let func = Variable::function(Function {
            params,
            body,
            kind: FunctionKind::Script,
        });
        Ok(Place::named(func_name, func))
    }

    /// Handle a function call; assumes the function name has been parsed
    /// and the current token is the opening bracket. `parent` is the
    /// object that contained this method, when there was one.
    fn function_call(
        &mut self,
        l: &mut Lexer,
        execute: &mut bool,
        function: Place,
        parent: Option<&super::value::VarRef>,
    ) -> ScriptResult<Place> {
        if !*execute {
            // not executing: just parse the arguments and be done
            l.match_token(TokenKind::Char(b'('))?;
            while l.tk != TokenKind::Char(b')') {
                self.base(l, execute)?;
                if l.tk != TokenKind::Char(b')') {
                    l.match_token(TokenKind::Char(b','))?;
                }
            }
            l.match_token(TokenKind::Char(b')'))?;
            return Ok(function);
        }

        let func = match &function.var.borrow().data {
            super::value::Data::Function(f) => f.clone(),
            _ => {
                return Err(ScriptError::type_error(format!(
                    "Expecting '{}' to be a function",
                    function.name
                )))
            }
        };
        l.match_token(TokenKind::Char(b'('))?;
        // fresh call frame for this activation
        let frame = Variable::object();
        if let Some(parent) = parent {
            frame.borrow_mut().add_child_no_dup("this", Rc::clone(parent));
        }
        let mut argc = 0;
        while l.tk != TokenKind::Char(b')') {
            let value = self.base(l, execute)?;
            if *execute {
                if let Some(param) = func.params.get(argc) {
                    let bound = if value.var.borrow().is_basic() {
                        // pass by value
                        deep_copy(&value.var)
                    } else {
                        // pass by reference
                        Rc::clone(&value.var)
                    };
                    frame.borrow_mut().add_child(param.clone(), bound);
                }
            }
            argc += 1;
            if l.tk != TokenKind::Char(b')') {
                l.match_token(TokenKind::Char(b','))?;
            }
        }
        l.match_token(TokenKind::Char(b')'))?;
        frame.borrow_mut().find_child_or_create(RETURN_VAR);

        self.scopes.push(Rc::clone(&frame));
        self.call_stack
            .push(format!("{} from {}", function.name, l.position(None)));

        let result = match &func.kind {
            FunctionKind::Native(callback) => {
                let callback = Rc::clone(callback);
                callback(self, &frame)
            }
            FunctionKind::Script => {
                let mut body_lex = Lexer::new(&func.body);
                match self.block(&mut body_lex, execute) {
                    Ok(()) => {
                        // a return statement will have cleared the gate
                        *execute = true;
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
        };

        // on error the frame entries are left in place so the top-level
        // annotation can report them; the entry point restores the state
        result?;
        self.call_stack.pop();
        self.scopes.pop();

        let return_value = frame
            .borrow()
            .find_child_var(RETURN_VAR)
            .unwrap_or_else(Variable::undefined);
        Ok(Place::temp(return_value))
    }

    fn factor(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        match l.tk {
            TokenKind::Char(b'(') => {
                l.match_token(TokenKind::Char(b'('))?;
                let a = self.base(l, execute)?;
                l.match_token(TokenKind::Char(b')'))?;
                Ok(a)
            }
            TokenKind::True => {
                l.match_token(TokenKind::True)?;
                Ok(Place::temp(Variable::int(1)))
            }
            TokenKind::False => {
                l.match_token(TokenKind::False)?;
                Ok(Place::temp(Variable::int(0)))
            }
            TokenKind::Null => {
                l.match_token(TokenKind::Null)?;
                Ok(Place::temp(Variable::null()))
            }
            TokenKind::Undefined => {
                l.match_token(TokenKind::Undefined)?;
                Ok(Place::temp(Variable::undefined()))
            }
            TokenKind::Id => self.factor_identifier(l, execute),
            TokenKind::Int | TokenKind::Float => {
                let value = if l.tk == TokenKind::Int {
                    Variable::int(super::value::parse_int_literal(&l.tk_str))
                } else {
                    Variable::double(super::value::parse_double_literal(&l.tk_str))
                };
                l.advance();
                Ok(Place::temp(value))
            }
            TokenKind::Str => {
                let value = Variable::string(l.tk_str.clone());
                l.match_token(TokenKind::Str)?;
                Ok(Place::temp(value))
            }
            TokenKind::Char(b'{') => self.factor_object_literal(l, execute),
            TokenKind::Char(b'[') => self.factor_array_literal(l, execute),
            TokenKind::Function => {
                let func = self.parse_function_definition(l)?;
                if !func.name.is_empty() {
                    tracing::warn!("Functions not defined at statement-level are not meant to have a name");
                }
                Ok(func)
            }
            TokenKind::New => self.factor_new(l, execute),
            _ => {
                // nothing we can do here... just hope it's the end
                l.match_token(TokenKind::Eof)?;
                Err(ScriptError::syntax(format!(
                    "Unexpected end of input at {}",
                    l.position(None)
                )))
            }
        }
    }

    fn factor_identifier(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let name = l.tk_str.clone();
        let mut a = if *execute {
            match self.scopes.resolve(&name) {
                Some(place) => place,
                // not found: carry the name so assignment can create a
                // global binding later
                None => Place::named(name.clone(), Variable::undefined()),
            }
        } else {
            Place::temp(Variable::undefined())
        };
        l.match_token(TokenKind::Id)?;
        // the receiver when we end up executing a method call
        let mut parent: Option<super::value::VarRef> = None;
        loop {
            match l.tk {
                TokenKind::Char(b'(') => {
                    a = self.function_call(l, execute, a, parent.as_ref())?;
                }
                TokenKind::Char(b'.') => {
                    l.match_token(TokenKind::Char(b'.'))?;
                    if *execute {
                        let member = l.tk_str.clone();
                        let found = a.var.borrow().find_child_var(&member);
                        let child = match found {
                            Some(var) => Place::owned(Rc::clone(&a.var), member.clone(), var),
                            None => match self.find_in_parent_classes(&a.var, &member) {
                                Some(place) => place,
                                None => self.synthesize_member(&a, &member),
                            },
                        };
                        parent = Some(Rc::clone(&a.var));
                        a = child;
                    }
                    l.match_token(TokenKind::Id)?;
                }
                TokenKind::Char(b'[') => {
                    l.match_token(TokenKind::Char(b'['))?;
                    let index = self.base(l, execute)?;
                    l.match_token(TokenKind::Char(b']'))?;
                    if *execute {
                        let key = index.var.borrow().get_string();
                        let child = a.var.borrow_mut().find_child_or_create(&key);
                        parent = Some(Rc::clone(&a.var));
                        a = Place::owned(Rc::clone(&a.var), key, child);
                    }
                }
                _ => break,
            }
        }
        Ok(a)
    }

    /// Member lookup fell through the object, its prototype chain and the
    /// built-in classes: compute `length` on demand, or create the member
    /// so it can be assigned to.
    fn synthesize_member(&mut self, a: &Place, member: &str) -> Place {
        if a.var.borrow().is_array() && member == "length" {
            let length = a.var.borrow().get_array_length();
            return Place::temp(Variable::int(length));
        }
        if a.var.borrow().is_string() && member == "length" {
            let length = a.var.borrow().get_string().len() as i64;
            return Place::temp(Variable::int(length));
        }
        let fresh = Variable::undefined();
        a.var
            .borrow_mut()
            .add_child(member.to_string(), Rc::clone(&fresh));
        Place::owned(Rc::clone(&a.var), member.to_string(), fresh)
    }

    fn factor_object_literal(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let contents = Variable::object();
        l.match_token(TokenKind::Char(b'{'))?;
        while l.tk != TokenKind::Char(b'}') {
            let id = l.tk_str.clone();
            // only strings or IDs are allowed on the left of an initialisation
            if l.tk == TokenKind::Str {
                l.match_token(TokenKind::Str)?;
            } else {
                l.match_token(TokenKind::Id)?;
            }
            l.match_token(TokenKind::Char(b':'))?;
            let a = self.base(l, execute)?;
            if *execute {
                contents.borrow_mut().add_child_no_dup(id, Rc::clone(&a.var));
            }
            if l.tk != TokenKind::Char(b'}') {
                l.match_token(TokenKind::Char(b','))?;
            }
        }
        l.match_token(TokenKind::Char(b'}'))?;
        Ok(Place::temp(contents))
    }

    fn factor_array_literal(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let contents = Variable::array();
        l.match_token(TokenKind::Char(b'['))?;
        let mut idx = 0;
        while l.tk != TokenKind::Char(b']') {
            let a = self.base(l, execute)?;
            if *execute {
                contents
                    .borrow_mut()
                    .add_child(idx.to_string(), Rc::clone(&a.var));
            }
            if l.tk != TokenKind::Char(b']') {
                l.match_token(TokenKind::Char(b','))?;
            }
            idx += 1;
        }
        l.match_token(TokenKind::Char(b']'))?;
        Ok(Place::temp(contents))
    }

    fn factor_new(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        l.match_token(TokenKind::New)?;
        let class_name = l.tk_str.clone();
        l.match_token(TokenKind::Id)?;
        if !*execute {
            if l.tk == TokenKind::Char(b'(') {
                self.discard_arguments(l, execute)?;
            }
            return Ok(Place::temp(Variable::undefined()));
        }
        match self.scopes.resolve(&class_name) {
            Some(class) => {
                let obj = Variable::object();
                if class.var.borrow().is_function() {
                    // the constructor's return value is ignored; the
                    // fresh object is the result
                    self.function_call(l, execute, class, Some(&obj))?;
                } else {
                    obj.borrow_mut()
                        .add_child(PROTOTYPE_CLASS, Rc::clone(&class.var));
                    if l.tk == TokenKind::Char(b'(') {
                        self.discard_arguments(l, execute)?;
                    }
                }
                Ok(Place::temp(obj))
            }
            None => {
                tracing::warn!("{} is not a valid class name", class_name);
                if l.tk == TokenKind::Char(b'(') {
                    let mut noexecute = false;
                    self.discard_arguments(l, &mut noexecute)?;
                }
                Ok(Place::temp(Variable::undefined()))
            }
        }
    }

    fn discard_arguments(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        l.match_token(TokenKind::Char(b'('))?;
        while l.tk != TokenKind::Char(b')') {
            self.base(l, execute)?;
            if l.tk != TokenKind::Char(b')') {
                l.match_token(TokenKind::Char(b','))?;
            }
        }
        l.match_token(TokenKind::Char(b')'))?;
        Ok(())
    }

    fn unary(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        if l.tk == TokenKind::Char(b'!') {
            l.match_token(TokenKind::Char(b'!'))?;
            let a = self.factor(l, execute)?;
            if *execute {
                let zero = Variable::int(0);
                let res = maths_op(&a.var, &zero, TokenKind::Equal)?;
                return Ok(Place::temp(res));
            }
            Ok(a)
        } else {
            self.factor(l, execute)
        }
    }

    fn term(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let mut a = self.unary(l, execute)?;
        while matches!(
            l.tk,
            TokenKind::Char(b'*') | TokenKind::Char(b'/') | TokenKind::Char(b'%')
        ) {
            let op = l.tk;
            l.advance();
            let b = self.unary(l, execute)?;
            if *execute {
                a = Place::temp(maths_op(&a.var, &b.var, op)?);
            }
        }
        Ok(a)
    }

    fn expression(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let negate = if l.tk == TokenKind::Char(b'-') {
            l.match_token(TokenKind::Char(b'-'))?;
            true
        } else {
            false
        };
        let mut a = self.term(l, execute)?;
        if negate && *execute {
            let zero = Variable::int(0);
            a = Place::temp(maths_op(&zero, &a.var, TokenKind::Char(b'-'))?);
        }

        while matches!(
            l.tk,
            TokenKind::Char(b'+')
                | TokenKind::Char(b'-')
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        ) {
            let op = l.tk;
            l.advance();
            if op == TokenKind::PlusPlus || op == TokenKind::MinusMinus {
                if *execute {
                    let one = Variable::int(1);
                    let delta = if op == TokenKind::PlusPlus {
                        TokenKind::Char(b'+')
                    } else {
                        TokenKind::Char(b'-')
                    };
                    let res = maths_op(&a.var, &one, delta)?;
                    // in-place update; postfix yields the new value
                    a.replace_with(&res);
                    a = Place::temp(res);
                }
            } else {
                let b = self.term(l, execute)?;
                if *execute {
                    a = Place::temp(maths_op(&a.var, &b.var, op)?);
                }
            }
        }
        Ok(a)
    }

    fn shift(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let a = self.expression(l, execute)?;
        if matches!(
            l.tk,
            TokenKind::LShift | TokenKind::RShift | TokenKind::RShiftUnsigned
        ) {
            let op = l.tk;
            l.advance();
            // the right-hand side parses at assignment precedence
            let b = self.base(l, execute)?;
            if *execute {
                let amount = b.var.borrow().get_int() as u32;
                let value = a.var.borrow().get_int();
                let shifted = if op == TokenKind::LShift {
                    value.wrapping_shl(amount)
                } else if op == TokenKind::RShift {
                    value.wrapping_shr(amount)
                } else {
                    (value as u64).wrapping_shr(amount) as i64
                };
                a.var.borrow_mut().set_int(shifted);
            }
        }
        Ok(a)
    }

    fn condition(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let mut a = self.shift(l, execute)?;
        while matches!(
            l.tk,
            TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::TypeEqual
                | TokenKind::NotTypeEqual
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
                | TokenKind::Char(b'<')
                | TokenKind::Char(b'>')
        ) {
            let op = l.tk;
            l.advance();
            let b = self.shift(l, execute)?;
            if *execute {
                a = Place::temp(maths_op(&a.var, &b.var, op)?);
            }
        }
        Ok(a)
    }

    fn logic(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let mut a = self.condition(l, execute)?;
        while matches!(
            l.tk,
            TokenKind::Char(b'&')
                | TokenKind::Char(b'|')
                | TokenKind::Char(b'^')
                | TokenKind::AndAnd
                | TokenKind::OrOr
        ) {
            let tk = l.tk;
            l.advance();
            let mut noexecute = false;
            // with short-circuit ops, if the outcome is known we don't
            // execute the other operand; either way the operator itself
            // becomes a bitwise one over booleans
            let (op, short_circuit, boolean) = if tk == TokenKind::AndAnd {
                (
                    TokenKind::Char(b'&'),
                    !a.var.borrow().get_bool(),
                    true,
                )
            } else if tk == TokenKind::OrOr {
                (TokenKind::Char(b'|'), a.var.borrow().get_bool(), true)
            } else {
                (tk, false, false)
            };
            let b = self.condition(l, if short_circuit { &mut noexecute } else { &mut *execute })?;
            if *execute && !short_circuit {
                let (av, bv) = if boolean {
                    (
                        Variable::bool(a.var.borrow().get_bool()),
                        Variable::bool(b.var.borrow().get_bool()),
                    )
                } else {
                    (Rc::clone(&a.var), Rc::clone(&b.var))
                };
                a = Place::temp(maths_op(&av, &bv, op)?);
            }
        }
        Ok(a)
    }

    fn ternary(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let mut lhs = self.logic(l, execute)?;
        if l.tk == TokenKind::Char(b'?') {
            let mut noexecute = false;
            l.match_token(TokenKind::Char(b'?'))?;
            if !*execute {
                self.base(l, &mut noexecute)?;
                l.match_token(TokenKind::Char(b':'))?;
                self.base(l, &mut noexecute)?;
            } else if lhs.var.borrow().get_bool() {
                lhs = self.base(l, execute)?;
                l.match_token(TokenKind::Char(b':'))?;
                self.base(l, &mut noexecute)?;
            } else {
                self.base(l, &mut noexecute)?;
                l.match_token(TokenKind::Char(b':'))?;
                lhs = self.base(l, execute)?;
            }
        }
        Ok(lhs)
    }

    pub(crate) fn base(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<Place> {
        let mut lhs = self.ternary(l, execute)?;
        if matches!(
            l.tk,
            TokenKind::Char(b'=') | TokenKind::PlusEqual | TokenKind::MinusEqual
        ) {
            // an unowned reference means the identifier resolved nowhere:
            // assigning to it creates a global, as per JavaScript
            if *execute && !lhs.is_owned() {
                if !lhs.name.is_empty() {
                    let name = lhs.name.clone();
                    self.root
                        .borrow_mut()
                        .add_child_no_dup(name.clone(), Rc::clone(&lhs.var));
                    lhs = Place::owned(Rc::clone(&self.root), name, Rc::clone(&lhs.var));
                } else {
                    tracing::warn!("Trying to assign to an un-named type");
                }
            }
            let op = l.tk;
            l.advance();
            let rhs = self.base(l, execute)?;
            if *execute {
                if op == TokenKind::Char(b'=') {
                    lhs.replace_with(&rhs.var);
                } else if op == TokenKind::PlusEqual {
                    let res = maths_op(&lhs.var, &rhs.var, TokenKind::Char(b'+'))?;
                    lhs.replace_with(&res);
                } else {
                    let res = maths_op(&lhs.var, &rhs.var, TokenKind::Char(b'-'))?;
                    lhs.replace_with(&res);
                }
            }
        }
        Ok(lhs)
    }

    pub(crate) fn block(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        l.match_token(TokenKind::Char(b'{'))?;
        if *execute {
            while l.tk != TokenKind::Eof && l.tk != TokenKind::Char(b'}') {
                self.statement(l, execute)?;
            }
            l.match_token(TokenKind::Char(b'}'))?;
        } else {
            // fast skip of blocks
            let mut brackets = 1;
            while l.tk != TokenKind::Eof && brackets > 0 {
                if l.tk == TokenKind::Char(b'{') {
                    brackets += 1;
                }
                if l.tk == TokenKind::Char(b'}') {
                    brackets -= 1;
                }
                l.advance();
            }
        }
        Ok(())
    }

    pub(crate) fn statement(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        match l.tk {
            TokenKind::Id
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Str
            | TokenKind::Char(b'-') => {
                // a simple statement of basic arithmetic
                self.base(l, execute)?;
                l.match_token(TokenKind::Char(b';'))?;
            }
            TokenKind::Char(b'{') => self.block(l, execute)?,
            TokenKind::Char(b';') => {
                // empty statements are allowed
                l.match_token(TokenKind::Char(b';'))?;
            }
            TokenKind::Var => self.statement_var(l, execute)?,
            TokenKind::If => self.statement_if(l, execute)?,
            TokenKind::While => self.statement_while(l, execute)?,
            TokenKind::For => self.statement_for(l, execute)?,
            TokenKind::Return => self.statement_return(l, execute)?,
            TokenKind::Function => {
                let func = self.parse_function_definition(l)?;
                if *execute {
                    if func.name.is_empty() {
                        tracing::warn!("Functions defined at statement-level are meant to have a name");
                    } else {
                        self.scopes
                            .current()
                            .borrow_mut()
                            .add_child_no_dup(func.name.clone(), Rc::clone(&func.var));
                    }
                }
            }
            _ => {
                l.match_token(TokenKind::Eof)?;
            }
        }
        Ok(())
    }

    fn statement_var(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        l.match_token(TokenKind::Var)?;
        while l.tk != TokenKind::Char(b';') {
            let mut a: Option<Place> = None;
            if *execute {
                let scope = Rc::clone(self.scopes.current());
                let child = scope.borrow_mut().find_child_or_create(&l.tk_str);
                a = Some(Place::owned(scope, l.tk_str.clone(), child));
            }
            l.match_token(TokenKind::Id)?;
            // dotted names create within an existing object
            while l.tk == TokenKind::Char(b'.') {
                l.match_token(TokenKind::Char(b'.'))?;
                if let Some(prev) = &a {
                    let parent = Rc::clone(&prev.var);
                    let child = parent.borrow_mut().find_child_or_create(&l.tk_str);
                    a = Some(Place::owned(parent, l.tk_str.clone(), child));
                }
                l.match_token(TokenKind::Id)?;
            }
            if l.tk == TokenKind::Char(b'=') {
                l.match_token(TokenKind::Char(b'='))?;
                let value = self.base(l, execute)?;
                if let Some(place) = &mut a {
                    place.replace_with(&value.var);
                }
            }
            if l.tk != TokenKind::Char(b';') {
                l.match_token(TokenKind::Char(b','))?;
            }
        }
        l.match_token(TokenKind::Char(b';'))?;
        Ok(())
    }

    fn statement_if(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        l.match_token(TokenKind::If)?;
        l.match_token(TokenKind::Char(b'('))?;
        let cond = self.base(l, execute)?;
        l.match_token(TokenKind::Char(b')'))?;
        let run = *execute && cond.var.borrow().get_bool();
        let mut noexecute = false;
        self.statement(l, if run { &mut *execute } else { &mut noexecute })?;
        if l.tk == TokenKind::Else {
            l.match_token(TokenKind::Else)?;
            self.statement(l, if run { &mut noexecute } else { &mut *execute })?;
        }
        Ok(())
    }

    fn statement_while(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        // repetition pulls out the text of the condition and body and
        // replays it through sub-lexers
        l.match_token(TokenKind::While)?;
        l.match_token(TokenKind::Char(b'('))?;
        let cond_start = l.token_start;
        let cond = self.base(l, execute)?;
        let mut loop_cond = *execute && cond.var.borrow().get_bool();
        let mut while_cond = l.get_sub_lex(cond_start);
        l.match_token(TokenKind::Char(b')'))?;
        let body_start = l.token_start;
        let mut noexecute = false;
        self.statement(l, if loop_cond { &mut *execute } else { &mut noexecute })?;
        let mut while_body = l.get_sub_lex(body_start);

        let mut loop_count = LOOP_MAX_ITERATIONS;
        while loop_cond {
            if loop_count == 0 {
                return Err(ScriptError::loop_error(format!(
                    "WHILE Loop exceeded {} iterations at {}",
                    LOOP_MAX_ITERATIONS,
                    l.position(None)
                )));
            }
            loop_count -= 1;
            while_cond.reset();
            let cond = self.base(&mut while_cond, execute)?;
            loop_cond = *execute && cond.var.borrow().get_bool();
            if loop_cond {
                while_body.reset();
                self.statement(&mut while_body, execute)?;
            }
        }
        Ok(())
    }

    fn statement_for(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        l.match_token(TokenKind::For)?;
        l.match_token(TokenKind::Char(b'('))?;
        self.statement(l, execute)?; // initialisation
        let cond_start = l.token_start;
        let cond = self.base(l, execute)?; // condition
        let mut loop_cond = *execute && cond.var.borrow().get_bool();
        let mut for_cond = l.get_sub_lex(cond_start);
        l.match_token(TokenKind::Char(b';'))?;
        let iter_start = l.token_start;
        let mut noexecute = false;
        self.base(l, &mut noexecute)?; // iterator
        let mut for_iter = l.get_sub_lex(iter_start);
        l.match_token(TokenKind::Char(b')'))?;
        let body_start = l.token_start;
        self.statement(l, if loop_cond { &mut *execute } else { &mut noexecute })?;
        let mut for_body = l.get_sub_lex(body_start);
        if loop_cond {
            for_iter.reset();
            self.base(&mut for_iter, execute)?;
        }
        let mut loop_count = LOOP_MAX_ITERATIONS;
        while *execute && loop_cond {
            if loop_count == 0 {
                return Err(ScriptError::loop_error(format!(
                    "FOR Loop exceeded {} iterations at {}",
                    LOOP_MAX_ITERATIONS,
                    l.position(None)
                )));
            }
            loop_count -= 1;
            for_cond.reset();
            let cond = self.base(&mut for_cond, execute)?;
            loop_cond = cond.var.borrow().get_bool();
            if *execute && loop_cond {
                for_body.reset();
                self.statement(&mut for_body, execute)?;
            }
            if *execute && loop_cond {
                for_iter.reset();
                self.base(&mut for_iter, execute)?;
            }
        }
        Ok(())
    }

    fn statement_return(&mut self, l: &mut Lexer, execute: &mut bool) -> ScriptResult<()> {
        l.match_token(TokenKind::Return)?;
        let mut result: Option<Place> = None;
        if l.tk != TokenKind::Char(b';') {
            result = Some(self.base(l, execute)?);
        }
        if *execute {
            let frame = Rc::clone(self.scopes.current());
            let in_function = frame.borrow().find_child(RETURN_VAR).is_some();
            if in_function {
                let value = result
                    .as_ref()
                    .map(|place| Rc::clone(&place.var))
                    .unwrap_or_else(Variable::undefined);
                frame.borrow_mut().add_child_no_dup(RETURN_VAR, value);
            } else {
                tracing::warn!("RETURN statement, but not in a function");
            }
            // halt execution of the rest of the body
            *execute = false;
        }
        l.match_token(TokenKind::Char(b';'))?;
        Ok(())
    }
}
