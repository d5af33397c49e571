use std::cell::RefCell;
use std::collections::HashMap;

use crate::ast::*;
use crate::class::CONSTRUCTOR_NAME;
use crate::error::{CompileErrorCode, LoxError, LoxResult};
use crate::token::Token;

#[derive(Clone, Copy)]
enum FunctionType {
    None,
    Method,
    Initializer,
}

#[derive(Clone, Copy)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Static pass run before execution. Rejects `this`, `super` and `return`
/// where no method could ever provide them, and local declarations that
/// clash or read themselves, so those mistakes surface before any statement
/// has a side effect.
///
/// Globals are not tracked: redeclaring one is allowed and reading an
/// undefined one is left to the interpreter.
pub struct Resolver {
    /// One map per block or method body, name to "initializer finished".
    scopes: RefCell<Vec<HashMap<String, bool>>>,
    current_function: RefCell<FunctionType>,
    current_class: RefCell<ClassType>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: RefCell::new(Vec::new()),
            current_function: RefCell::new(FunctionType::None),
            current_class: RefCell::new(ClassType::None),
        }
    }
    pub fn resolve(&self, stmts: &[Stmt]) -> LoxResult<()> {
        stmts.iter().try_for_each(|s| s.accept(self))
    }
    fn begin_scope(&self) {
        self.scopes.borrow_mut().push(HashMap::new());
    }
    fn end_scope(&self) {
        self.scopes.borrow_mut().pop();
    }
    fn declare(&self, name: &Token) -> LoxResult<()> {
        if let Some(scope) = self.scopes.borrow_mut().last_mut() {
            if scope.contains_key(&name.lexeme) {
                return Err(LoxError::compile_at(name, CompileErrorCode::LocalAlreadyDefined));
            }
            scope.insert(name.lexeme.clone(), false);
        }
        Ok(())
    }
    fn define(&self, name: &Token) {
        if let Some(scope) = self.scopes.borrow_mut().last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }
    fn resolve_scoped(&self, stmts: &[Stmt]) -> LoxResult<()> {
        self.begin_scope();
        let result = self.resolve(stmts);
        self.end_scope();
        result
    }
    fn resolve_function(&self, method: &FunctionDecl, t: FunctionType) -> LoxResult<()> {
        let enclosing_function = self.current_function.replace(t);
        self.begin_scope();
        let result = method
            .params
            .iter()
            .try_for_each(|param| {
                self.declare(param)?;
                self.define(param);
                Ok(())
            })
            .and_then(|()| self.resolve(&method.body));
        self.end_scope();
        self.current_function.replace(enclosing_function);
        result
    }
}

impl ExprVisitor<()> for Resolver {
    fn visit_assign_expr(&self, expr: &AssignExpr) -> LoxResult<()> {
        expr.value.accept(self)
    }

    fn visit_binary_expr(&self, expr: &BinaryExpr) -> LoxResult<()> {
        expr.left.accept(self)?;
        expr.right.accept(self)
    }

    fn visit_call_expr(&self, expr: &CallExpr) -> LoxResult<()> {
        expr.callee.accept(self)?;
        expr.arguments.iter().try_for_each(|arg| arg.accept(self))
    }

    fn visit_get_expr(&self, expr: &GetExpr) -> LoxResult<()> {
        expr.object.accept(self)
    }

    fn visit_grouping_expr(&self, expr: &GroupingExpr) -> LoxResult<()> {
        expr.expression.accept(self)
    }

    fn visit_literal_expr(&self, _expr: &LiteralExpr) -> LoxResult<()> {
        Ok(())
    }

    fn visit_set_expr(&self, expr: &SetExpr) -> LoxResult<()> {
        expr.value.accept(self)?;
        expr.object.accept(self)
    }

    fn visit_super_expr(&self, expr: &SuperExpr) -> LoxResult<()> {
        match *self.current_class.borrow() {
            ClassType::None => Err(LoxError::compile(
                expr.keyword.span,
                CompileErrorCode::SuperOutsideClass,
            )),
            ClassType::Class => Err(LoxError::compile(
                expr.keyword.span,
                CompileErrorCode::SuperOutsideChildClass,
            )),
            ClassType::Subclass => Ok(()),
        }
    }

    fn visit_this_expr(&self, expr: &ThisExpr) -> LoxResult<()> {
        if matches!(*self.current_class.borrow(), ClassType::None) {
            return Err(LoxError::compile(
                expr.keyword.span,
                CompileErrorCode::ThisOutsideClass,
            ));
        }
        Ok(())
    }

    fn visit_var_expr(&self, expr: &VarExpr) -> LoxResult<()> {
        let declared_not_defined = self
            .scopes
            .borrow()
            .last()
            .and_then(|scope| scope.get(&expr.name.lexeme).copied())
            == Some(false);
        if declared_not_defined {
            return Err(LoxError::compile_at(
                &expr.name,
                CompileErrorCode::ReadOwnLocalBeforeInitialized,
            ));
        }
        Ok(())
    }
}

impl StmtVisitor<()> for Resolver {
    fn visit_block_stmt(&self, stmt: &BlockStmt) -> LoxResult<()> {
        self.resolve_scoped(&stmt.statements)
    }

    fn visit_class_stmt(&self, stmt: &ClassStmt) -> LoxResult<()> {
        self.declare(&stmt.name)?;
        self.define(&stmt.name);

        let mut class_type = ClassType::Class;
        if let Some(superclass) = &stmt.superclass {
            if stmt.name.lexeme == superclass.name.lexeme {
                return Err(LoxError::compile(
                    superclass.name.span,
                    CompileErrorCode::InheritFromSelf,
                ));
            }
            self.visit_var_expr(superclass)?;
            class_type = ClassType::Subclass;
        }

        let enclosing_class = self.current_class.replace(class_type);
        let result = stmt.methods.iter().try_for_each(|m| {
            let function_type = if m.name.lexeme == CONSTRUCTOR_NAME {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(m, function_type)
        });
        self.current_class.replace(enclosing_class);
        result
    }

    fn visit_expression_stmt(&self, stmt: &ExpressionStmt) -> LoxResult<()> {
        stmt.expression.accept(self)
    }

    fn visit_print_stmt(&self, stmt: &PrintStmt) -> LoxResult<()> {
        stmt.expression.accept(self)
    }

    fn visit_return_stmt(&self, stmt: &ReturnStmt) -> LoxResult<()> {
        match (*self.current_function.borrow(), &stmt.value) {
            (FunctionType::None, _) => {
                return Err(LoxError::compile(
                    stmt.keyword.span,
                    CompileErrorCode::TopLevelReturn,
                ))
            }
            // `return;` and `return this;` are the only ways out of an
            // initializer.
            (FunctionType::Initializer, Some(value)) if !matches!(value, Expr::This(_)) => {
                return Err(LoxError::compile(
                    stmt.keyword.span,
                    CompileErrorCode::InitializerReturnValue,
                ))
            }
            _ => {}
        }
        stmt.value.as_ref().map_or(Ok(()), |expr| expr.accept(self))
    }

    fn visit_var_stmt(&self, stmt: &VarStmt) -> LoxResult<()> {
        self.declare(&stmt.name)?;
        if let Some(init) = &stmt.initializer {
            init.accept(self)?;
        }
        self.define(&stmt.name);
        Ok(())
    }
}
