//! Syntax tree consumed by the runtime.
//!
//! Nodes arrive pre-validated from a front end (or are built by hand, as the
//! bundled sample and the tests do). Every node carries the span it was
//! parsed from so runtime errors can point back at the source.

use std::rc::Rc;

use crate::error::LoxResult;
use crate::span::Span;
use crate::token::Token;
use crate::value::Value;

#[derive(Debug)]
pub enum Expr {
    Assign(AssignExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
    Get(GetExpr),
    Grouping(GroupingExpr),
    Literal(LiteralExpr),
    Set(SetExpr),
    Super(SuperExpr),
    This(ThisExpr),
    Var(VarExpr),
}

#[derive(Debug)]
pub struct AssignExpr {
    pub name: Token,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct GetExpr {
    pub object: Box<Expr>,
    pub name: Token,
    pub span: Span,
}

#[derive(Debug)]
pub struct GroupingExpr {
    pub expression: Box<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct LiteralExpr {
    pub value: Value,
    pub span: Span,
}

#[derive(Debug)]
pub struct SetExpr {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct SuperExpr {
    pub keyword: Token,
    pub method: Token,
    pub span: Span,
}

#[derive(Debug)]
pub struct ThisExpr {
    pub keyword: Token,
    pub span: Span,
}

#[derive(Debug)]
pub struct VarExpr {
    pub name: Token,
    pub span: Span,
}

impl Expr {
    pub fn new_assign(name: Token, value: Expr, span: Span) -> Self {
        Expr::Assign(AssignExpr {
            name,
            value: Box::new(value),
            span,
        })
    }
    pub fn new_binary(left: Expr, operator: Token, right: Expr, span: Span) -> Self {
        Expr::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }
    pub fn new_call(callee: Expr, arguments: Vec<Expr>, span: Span) -> Self {
        Expr::Call(CallExpr {
            callee: Box::new(callee),
            arguments,
            span,
        })
    }
    pub fn new_get(object: Expr, name: Token, span: Span) -> Self {
        Expr::Get(GetExpr {
            object: Box::new(object),
            name,
            span,
        })
    }
    pub fn new_grouping(expression: Expr, span: Span) -> Self {
        Expr::Grouping(GroupingExpr {
            expression: Box::new(expression),
            span,
        })
    }
    pub fn new_literal(value: Value, span: Span) -> Self {
        Expr::Literal(LiteralExpr { value, span })
    }
    pub fn new_set(object: Expr, name: Token, value: Expr, span: Span) -> Self {
        Expr::Set(SetExpr {
            object: Box::new(object),
            name,
            value: Box::new(value),
            span,
        })
    }
    pub fn new_super(keyword: Token, method: Token, span: Span) -> Self {
        Expr::Super(SuperExpr {
            keyword,
            method,
            span,
        })
    }
    pub fn new_this(keyword: Token, span: Span) -> Self {
        Expr::This(ThisExpr { keyword, span })
    }
    pub fn new_var(name: Token, span: Span) -> Self {
        Expr::Var(VarExpr { name, span })
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Assign(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Get(e) => e.span,
            Expr::Grouping(e) => e.span,
            Expr::Literal(e) => e.span,
            Expr::Set(e) => e.span,
            Expr::Super(e) => e.span,
            Expr::This(e) => e.span,
            Expr::Var(e) => e.span,
        }
    }

    pub fn accept<T>(&self, visitor: &dyn ExprVisitor<T>) -> LoxResult<T> {
        match self {
            Expr::Assign(e) => visitor.visit_assign_expr(e),
            Expr::Binary(e) => visitor.visit_binary_expr(e),
            Expr::Call(e) => visitor.visit_call_expr(e),
            Expr::Get(e) => visitor.visit_get_expr(e),
            Expr::Grouping(e) => visitor.visit_grouping_expr(e),
            Expr::Literal(e) => visitor.visit_literal_expr(e),
            Expr::Set(e) => visitor.visit_set_expr(e),
            Expr::Super(e) => visitor.visit_super_expr(e),
            Expr::This(e) => visitor.visit_this_expr(e),
            Expr::Var(e) => visitor.visit_var_expr(e),
        }
    }
}

pub trait ExprVisitor<T> {
    fn visit_assign_expr(&self, expr: &AssignExpr) -> LoxResult<T>;
    fn visit_binary_expr(&self, expr: &BinaryExpr) -> LoxResult<T>;
    fn visit_call_expr(&self, expr: &CallExpr) -> LoxResult<T>;
    fn visit_get_expr(&self, expr: &GetExpr) -> LoxResult<T>;
    fn visit_grouping_expr(&self, expr: &GroupingExpr) -> LoxResult<T>;
    fn visit_literal_expr(&self, expr: &LiteralExpr) -> LoxResult<T>;
    fn visit_set_expr(&self, expr: &SetExpr) -> LoxResult<T>;
    fn visit_super_expr(&self, expr: &SuperExpr) -> LoxResult<T>;
    fn visit_this_expr(&self, expr: &ThisExpr) -> LoxResult<T>;
    fn visit_var_expr(&self, expr: &VarExpr) -> LoxResult<T>;
}

/// A method declaration: parameter list plus body.
///
/// Owned by the class declaration and shared (never copied) by the class
/// definition built from it and by every method bound from that definition.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl FunctionDecl {
    pub fn new(name: Token, params: Vec<Token>, body: Vec<Stmt>, span: Span) -> Self {
        Self {
            name,
            params,
            body,
            span,
        }
    }
}

#[derive(Debug)]
pub enum Stmt {
    Block(BlockStmt),
    Class(ClassStmt),
    Expression(ExpressionStmt),
    Print(PrintStmt),
    Return(ReturnStmt),
    Var(VarStmt),
}

#[derive(Debug)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ClassStmt {
    pub name: Token,
    pub superclass: Option<VarExpr>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub struct PrintStmt {
    pub expression: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub keyword: Token,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct VarStmt {
    pub name: Token,
    pub initializer: Option<Expr>,
    pub span: Span,
}

impl Stmt {
    pub fn new_block(statements: Vec<Stmt>, span: Span) -> Self {
        Stmt::Block(BlockStmt { statements, span })
    }
    pub fn new_class(
        name: Token,
        superclass: Option<VarExpr>,
        methods: Vec<FunctionDecl>,
        span: Span,
    ) -> Self {
        Stmt::Class(ClassStmt {
            name,
            superclass,
            methods: methods.into_iter().map(Rc::new).collect(),
            span,
        })
    }
    pub fn new_expression(expression: Expr, span: Span) -> Self {
        Stmt::Expression(ExpressionStmt { expression, span })
    }
    pub fn new_print(expression: Expr, span: Span) -> Self {
        Stmt::Print(PrintStmt { expression, span })
    }
    pub fn new_return(keyword: Token, value: Option<Expr>, span: Span) -> Self {
        Stmt::Return(ReturnStmt {
            keyword,
            value,
            span,
        })
    }
    pub fn new_var(name: Token, initializer: Option<Expr>, span: Span) -> Self {
        Stmt::Var(VarStmt {
            name,
            initializer,
            span,
        })
    }

    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(s) => s.span,
            Stmt::Class(s) => s.span,
            Stmt::Expression(s) => s.span,
            Stmt::Print(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Var(s) => s.span,
        }
    }

    pub fn accept<T>(&self, visitor: &dyn StmtVisitor<T>) -> LoxResult<T> {
        match self {
            Stmt::Block(s) => visitor.visit_block_stmt(s),
            Stmt::Class(s) => visitor.visit_class_stmt(s),
            Stmt::Expression(s) => visitor.visit_expression_stmt(s),
            Stmt::Print(s) => visitor.visit_print_stmt(s),
            Stmt::Return(s) => visitor.visit_return_stmt(s),
            Stmt::Var(s) => visitor.visit_var_stmt(s),
        }
    }
}

pub trait StmtVisitor<T> {
    fn visit_block_stmt(&self, stmt: &BlockStmt) -> LoxResult<T>;
    fn visit_class_stmt(&self, stmt: &ClassStmt) -> LoxResult<T>;
    fn visit_expression_stmt(&self, stmt: &ExpressionStmt) -> LoxResult<T>;
    fn visit_print_stmt(&self, stmt: &PrintStmt) -> LoxResult<T>;
    fn visit_return_stmt(&self, stmt: &ReturnStmt) -> LoxResult<T>;
    fn visit_var_stmt(&self, stmt: &VarStmt) -> LoxResult<T>;
}
