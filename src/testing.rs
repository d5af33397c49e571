//! Syntax-tree builders and an output capture for the unit tests.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, Stmt, VarExpr};
use crate::error::LoxResult;
use crate::interpreter::Interpreter;
use crate::span::Span;
use crate::token::{Token, TokenType};
use crate::value::Value;

#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `program` on a fresh interpreter, returning the result, the
/// interpreter and everything printed.
pub fn run(program: &[Stmt]) -> (LoxResult<()>, Interpreter, String) {
    let out = SharedBuffer::default();
    let interpreter = Interpreter::with_output(Box::new(out.clone()));
    let result = interpreter.interpret(program);
    (result, interpreter, out.contents())
}

pub fn span() -> Span {
    Span::new(0, 0, 0, 0)
}

pub fn name(name: &str) -> Token {
    Token::identifier(name, span())
}

pub fn keyword(ttype: TokenType, lexeme: &str) -> Token {
    Token::new(ttype, lexeme, span())
}

pub fn string(s: &str) -> Expr {
    Expr::new_literal(Value::String(s.to_string()), span())
}

pub fn number(n: f64) -> Expr {
    Expr::new_literal(Value::Number(n), span())
}

pub fn var(variable: &str) -> Expr {
    Expr::new_var(name(variable), span())
}

pub fn this() -> Expr {
    Expr::new_this(keyword(TokenType::This, "this"), span())
}

pub fn super_(method: &str) -> Expr {
    Expr::new_super(keyword(TokenType::Super, "super"), name(method), span())
}

pub fn get(object: Expr, property: &str) -> Expr {
    Expr::new_get(object, name(property), span())
}

pub fn set(object: Expr, property: &str, value: Expr) -> Expr {
    Expr::new_set(object, name(property), value, span())
}

pub fn call(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::new_call(callee, arguments, span())
}

pub fn binary(left: Expr, ttype: TokenType, lexeme: &str, right: Expr) -> Expr {
    Expr::new_binary(left, keyword(ttype, lexeme), right, span())
}

pub fn plus(left: Expr, right: Expr) -> Expr {
    binary(left, TokenType::Plus, "+", right)
}

pub fn expr_stmt(expression: Expr) -> Stmt {
    Stmt::new_expression(expression, span())
}

pub fn print(expression: Expr) -> Stmt {
    Stmt::new_print(expression, span())
}

pub fn block(statements: Vec<Stmt>) -> Stmt {
    Stmt::new_block(statements, span())
}

pub fn var_stmt(variable: &str, initializer: Expr) -> Stmt {
    Stmt::new_var(name(variable), Some(initializer), span())
}

pub fn return_(value: Option<Expr>) -> Stmt {
    Stmt::new_return(keyword(TokenType::Return, "return"), value, span())
}

pub fn method(method: &str, params: &[&str], body: Vec<Stmt>) -> FunctionDecl {
    FunctionDecl::new(
        name(method),
        params.iter().map(|p| name(p)).collect(),
        body,
        span(),
    )
}

pub fn class(class: &str, superclass: Option<&str>, methods: Vec<FunctionDecl>) -> Stmt {
    let superclass = superclass.map(|s| VarExpr {
        name: name(s),
        span: span(),
    });
    Stmt::new_class(name(class), superclass, methods, span())
}
