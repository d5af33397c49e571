//! The bundled sample program, as the syntax tree a front end would hand
//! over for:
//!
//! ```text
//! class A {
//!     init() {
//!         this.firstName = "Kanishka";
//!         return this;
//!     }
//!     cook() {
//!         print this.firstName + " " + this.lastName + " is cooking.";
//!     }
//! }
//!
//! class B < A {
//!     init() {
//!         super.init();
//!         this.lastName = "Tiwari";
//!     }
//!     cook() {
//!         super.cook();
//!         print "Let him cook.";
//!     }
//! }
//! ```

use crate::ast::{Expr, FunctionDecl, Stmt, VarExpr};
use crate::span::Span;
use crate::token::{Token, TokenType};
use crate::value::Value;

fn at(line: usize, start: usize, end: usize) -> Span {
    Span::new(line, start, line, end)
}

fn ident(name: &str, line: usize, col: usize) -> Token {
    Token::identifier(name, at(line, col, col + name.len()))
}

fn this(line: usize, col: usize) -> Expr {
    let keyword = Token::new(TokenType::This, "this", at(line, col, col + 4));
    Expr::new_this(keyword, at(line, col, col + 4))
}

fn string(s: &str, line: usize, col: usize) -> Expr {
    // Source length includes the quotes.
    Expr::new_literal(
        Value::String(s.to_string()),
        at(line, col, col + s.len() + 2),
    )
}

/// `this.<field>`, with `this` starting at `col`.
fn this_field(field: &str, line: usize, col: usize) -> Expr {
    let name = ident(field, line, col + 5);
    let end = name.span.end.1;
    Expr::new_get(this(line, col), name, at(line, col, end))
}

fn assign_this_field(field: &str, value: Expr, line: usize) -> Stmt {
    let target = ident(field, line, 14);
    let end = value.span().end.1;
    let set = Expr::new_set(this(line, 9), target, value, at(line, 9, end));
    Stmt::new_expression(set, at(line, 9, end + 1))
}

/// `super.<method>();` at the start of a method body line.
fn super_call(method: &str, line: usize) -> Stmt {
    let keyword = Token::new(TokenType::Super, "super", at(line, 9, 14));
    let method = ident(method, line, 15);
    let end = method.span.end.1;
    let callee = Expr::new_super(keyword, method, at(line, 9, end));
    let call = Expr::new_call(callee, vec![], at(line, 9, end + 2));
    Stmt::new_expression(call, at(line, 9, end + 3))
}

fn concat(left: Expr, right: Expr, line: usize, plus_col: usize) -> Expr {
    let span = Span::new_from_range(left.span(), right.span());
    let plus = Token::new(TokenType::Plus, "+", at(line, plus_col, plus_col + 1));
    Expr::new_binary(left, plus, right, span)
}

fn class_a() -> Stmt {
    let init = FunctionDecl::new(
        ident("init", 3, 5),
        vec![],
        vec![
            assign_this_field("firstName", string("Kanishka", 4, 26), 4),
            Stmt::new_return(
                Token::new(TokenType::Return, "return", at(5, 9, 15)),
                Some(this(5, 16)),
                at(5, 9, 21),
            ),
        ],
        Span::new(3, 5, 6, 6),
    );

    // this.firstName + " " + this.lastName + " is cooking."
    let sentence = concat(
        concat(
            concat(this_field("firstName", 9, 15), string(" ", 9, 32), 9, 30),
            this_field("lastName", 9, 38),
            9,
            36,
        ),
        string(" is cooking.", 9, 54),
        9,
        52,
    );
    let cook = FunctionDecl::new(
        ident("cook", 8, 5),
        vec![],
        vec![Stmt::new_print(sentence, at(9, 9, 69))],
        Span::new(8, 5, 10, 6),
    );

    Stmt::new_class(ident("A", 1, 7), None, vec![init, cook], Span::new(1, 1, 11, 2))
}

fn class_b() -> Stmt {
    let init = FunctionDecl::new(
        ident("init", 17, 5),
        vec![],
        vec![
            super_call("init", 18),
            assign_this_field("lastName", string("Tiwari", 19, 25), 19),
        ],
        Span::new(17, 5, 20, 6),
    );
    let cook = FunctionDecl::new(
        ident("cook", 22, 5),
        vec![],
        vec![
            super_call("cook", 23),
            Stmt::new_print(string("Let him cook.", 24, 15), at(24, 9, 31)),
        ],
        Span::new(22, 5, 25, 6),
    );
    let superclass = VarExpr {
        name: ident("A", 15, 11),
        span: at(15, 11, 12),
    };

    Stmt::new_class(
        ident("B", 15, 7),
        Some(superclass),
        vec![init, cook],
        Span::new(15, 1, 26, 2),
    )
}

/// Declarations of classes `A` and `B`.
pub fn program() -> Vec<Stmt> {
    vec![class_a(), class_b()]
}

/// `<class_name>().cook();`, placed on the line after the declarations.
pub fn cook(class_name: &str) -> Stmt {
    let line = 27;
    let class = Expr::new_var(ident(class_name, line, 1), at(line, 1, 1 + class_name.len()));
    let instance_end = class_name.len() + 3;
    let instance = Expr::new_call(class, vec![], at(line, 1, instance_end));
    let method = ident("cook", line, instance_end + 1);
    let cook = Expr::new_get(instance, method, at(line, 1, instance_end + 5));
    let call = Expr::new_call(cook, vec![], at(line, 1, instance_end + 7));
    Stmt::new_expression(call, at(line, 1, instance_end + 8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, LoxError, RuntimeErrorCode};
    use crate::testing::run;

    #[test]
    fn b_cooks_with_both_names() {
        let mut program = program();
        program.push(cook("B"));

        let (result, _, output) = run(&program);

        assert!(result.is_ok(), "{:?}", result);
        assert_eq!(output, "Kanishka Tiwari is cooking.\nLet him cook.\n");
    }

    #[test]
    fn a_cook_reads_unset_last_name() {
        let mut program = program();
        program.push(cook("A"));

        let (result, _, output) = run(&program);

        let err = result.expect_err("lastName is never set on an A");
        assert_eq!(err.kind(), ErrorKind::PropertyError);
        assert_eq!(err.to_string(), "undefined property 'lastName'");
        // Points at `lastName` in A.cook, not at the call site.
        assert_eq!(err.span(), Some(at(9, 43, 51)));
        match err {
            LoxError::Runtime(e) => assert_eq!(e.code, RuntimeErrorCode::UndefinedProperty),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(output, "");
    }

    #[test]
    fn declaring_the_sample_prints_nothing() {
        let (result, interpreter, output) = run(&program());

        assert!(result.is_ok());
        assert_eq!(output, "");
        assert!(matches!(interpreter.global("A"), Some(crate::value::Value::Class(_))));
        assert!(matches!(interpreter.global("B"), Some(crate::value::Value::Class(_))));
    }
}
