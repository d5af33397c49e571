use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::io::{self, Write};
use std::rc::Rc;

use crate::ast::*;
use crate::callable::LoxCallable;
use crate::class::{ClassDefinition, ClassId, ClassRegistry, Instance};
use crate::heap::{Heap, InstanceId};
use crate::environment::Environment;
use crate::error::*;
use crate::function::BoundMethod;
use crate::token::TokenType;
use crate::value::Value;

/// The method invocation currently executing: where `this` and `super` come
/// from.
#[derive(Debug, Clone, Copy)]
struct Frame {
    receiver: InstanceId,
    declaring_class: ClassId,
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: RefCell<Rc<RefCell<Environment>>>,
    classes: RefCell<ClassRegistry>,
    heap: RefCell<Heap>,
    frames: RefCell<Vec<Frame>>,
    output: RefCell<Box<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }
    /// `print` statements write to `output` instead of stdout.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        Self {
            globals: Rc::clone(&globals),
            environment: RefCell::new(globals),
            classes: RefCell::new(ClassRegistry::new()),
            heap: RefCell::new(Heap::new()),
            frames: RefCell::new(Vec::new()),
            output: RefCell::new(output),
        }
    }
    /// Runs `statements` in order. Between two of them nothing is in
    /// flight, which is when unreachable instances get collected.
    pub fn interpret(&self, statements: &[Stmt]) -> LoxResult<()> {
        for stmt in statements {
            self.execute(stmt)?;
            if self.heap.borrow().should_collect() {
                self.collect_garbage();
            }
        }
        Ok(())
    }
    pub fn execute(&self, stmt: &Stmt) -> LoxResult<()> {
        stmt.accept(self)
    }
    pub fn evaluate(&self, expr: &Expr) -> LoxResult<Value> {
        expr.accept(self)
    }
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }
    pub fn classes(&self) -> Ref<'_, ClassRegistry> {
        self.classes.borrow()
    }
    pub fn heap(&self) -> Ref<'_, Heap> {
        self.heap.borrow()
    }
    pub(crate) fn allocate(&self, instance: Instance) -> InstanceId {
        self.heap.borrow_mut().allocate(instance)
    }
    /// Frees instances no binding can reach any more. Does nothing while a
    /// method runs, since values held mid-call are not visible as roots.
    pub fn collect_garbage(&self) -> usize {
        if !self.frames.borrow().is_empty() {
            return 0;
        }
        let roots = self.roots();
        let freed = self.heap.borrow_mut().collect(&roots);
        trace!("gc", "freed {}, {} live", freed, self.heap().live());
        freed
    }
    /// Every binding of the current scope chain and of the scopes classes
    /// were declared in.
    fn roots(&self) -> Vec<Value> {
        let mut pending = vec![self.environment.borrow().clone()];
        pending.extend(self.classes().closures());

        let mut seen = HashSet::new();
        let mut roots = Vec::new();
        while let Some(env) = pending.pop() {
            if !seen.insert(Rc::as_ptr(&env)) {
                continue;
            }
            let env = env.borrow();
            roots.extend(env.values().cloned());
            pending.extend(env.enclosing());
        }
        roots
    }
    pub fn execute_block(&self, statements: &[Stmt], e: Environment) -> LoxResult<()> {
        let previous = self.environment.replace(Rc::new(RefCell::new(e)));

        let result = statements.iter().try_for_each(|s| self.execute(s));

        self.environment.replace(previous);

        result
    }
    /// Runs a method body with `method`'s receiver as `this`. A `return`
    /// inside the body ends the call with its value; falling off the end
    /// yields nil.
    pub(crate) fn execute_method(
        &self,
        method: &BoundMethod,
        body: &[Stmt],
        env: Environment,
    ) -> LoxResult<Value> {
        trace!(
            "call",
            "{}.{}",
            self.classes().get(method.declaring_class()).name.lexeme,
            method.name()
        );
        self.frames.borrow_mut().push(Frame {
            receiver: method.receiver(),
            declaring_class: method.declaring_class(),
        });

        let result = self.execute_block(body, env);

        self.frames.borrow_mut().pop();

        match result {
            Ok(()) => Ok(Value::Nil),
            Err(LoxError::Return(value)) => Ok(value),
            Err(err) => Err(err),
        }
    }
    pub fn stringify(&self, value: &Value) -> String {
        match value {
            Value::Nil => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Class(c) => self.classes().get(*c).name.lexeme.clone(),
            Value::Instance(i) => {
                let class = self.heap().get(*i).class();
                format!("{} instance", self.classes().get(class).name.lexeme)
            }
            Value::Method(m) => format!("<fn {}>", m.name()),
        }
    }
    fn current_frame(&self) -> Option<Frame> {
        self.frames.borrow().last().copied()
    }
    fn solve_number_binary(
        &self,
        solver: fn(f64, f64) -> Value,
        left: Value,
        right: Value,
        expr: &BinaryExpr,
    ) -> LoxResult<Value> {
        match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(solver(l, r)),
            _ => Err(LoxError::runtime(
                expr.span,
                RuntimeErrorCode::NumberBinaryExprOperandsIncorrectType,
                &expr.operator.lexeme,
            )),
        }
    }
}

impl StmtVisitor<()> for Interpreter {
    fn visit_block_stmt(&self, stmt: &BlockStmt) -> LoxResult<()> {
        let e = Environment::new_with_enclosing(self.environment.borrow().clone());
        self.execute_block(&stmt.statements, e)
    }

    fn visit_class_stmt(&self, stmt: &ClassStmt) -> LoxResult<()> {
        let mut superclass = None;
        if let Some(superclass_expr) = &stmt.superclass {
            if let Value::Class(c) = self.visit_var_expr(superclass_expr)? {
                superclass = Some(c);
            } else {
                return Err(LoxError::runtime(
                    superclass_expr.span,
                    RuntimeErrorCode::NonClassInherit,
                    &superclass_expr.name.lexeme,
                ));
            }
        }

        let env = self.environment.borrow().clone();
        let class = ClassDefinition::new(&stmt.name, &stmt.methods, superclass, &env);
        let id = self.classes.borrow_mut().register(class);
        trace!("class", "{} ({} methods)", stmt.name.lexeme, stmt.methods.len());

        env.borrow_mut().define(&stmt.name.lexeme, Value::Class(id));
        Ok(())
    }

    fn visit_expression_stmt(&self, stmt: &ExpressionStmt) -> LoxResult<()> {
        self.evaluate(&stmt.expression).and(Ok(()))
    }

    fn visit_print_stmt(&self, stmt: &PrintStmt) -> LoxResult<()> {
        let value = self.evaluate(&stmt.expression)?;
        let formatted = self.stringify(&value);
        writeln!(self.output.borrow_mut(), "{}", formatted)?;
        Ok(())
    }

    fn visit_return_stmt(&self, stmt: &ReturnStmt) -> LoxResult<()> {
        if self.frames.borrow().is_empty() {
            return Err(LoxError::compile(
                stmt.keyword.span,
                CompileErrorCode::TopLevelReturn,
            ));
        }
        let value = stmt
            .value
            .as_ref()
            .map_or(Ok(Value::Nil), |expr| self.evaluate(expr))?;
        Err(LoxError::Return(value))
    }

    fn visit_var_stmt(&self, stmt: &VarStmt) -> LoxResult<()> {
        let value = stmt
            .initializer
            .as_ref()
            .map_or(Ok(Value::Nil), |init| self.evaluate(init))?;

        self.environment
            .borrow()
            .borrow_mut()
            .define(&stmt.name.lexeme, value);
        Ok(())
    }
}

impl ExprVisitor<Value> for Interpreter {
    fn visit_assign_expr(&self, expr: &AssignExpr) -> LoxResult<Value> {
        let value = self.evaluate(&expr.value)?;
        if !self
            .environment
            .borrow()
            .borrow_mut()
            .assign(&expr.name.lexeme, value.clone())
        {
            return Err(LoxError::runtime(
                expr.name.span,
                RuntimeErrorCode::UndefinedVariable,
                &expr.name.lexeme,
            ));
        }
        Ok(value)
    }

    fn visit_binary_expr(&self, expr: &BinaryExpr) -> LoxResult<Value> {
        let left = self.evaluate(&expr.left)?;
        let right = self.evaluate(&expr.right)?;
        match expr.operator.ttype {
            TokenType::Minus => {
                self.solve_number_binary(|l, r| Value::Number(l - r), left, right, expr)
            }
            TokenType::Slash => match (left, right) {
                (Value::Number(_), Value::Number(r)) if r == 0.0 => Err(LoxError::runtime(
                    expr.span,
                    RuntimeErrorCode::DivisionByZero,
                    &expr.operator.lexeme,
                )),
                (left, right) => {
                    self.solve_number_binary(|l, r| Value::Number(l / r), left, right, expr)
                }
            },
            TokenType::Star => {
                self.solve_number_binary(|l, r| Value::Number(l * r), left, right, expr)
            }
            TokenType::Plus => match (left, right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => Ok(Value::String(format!("{}{}", l, r))),
                _ => Err(LoxError::runtime(
                    expr.span,
                    RuntimeErrorCode::PlusExprOperandsIncorrectType,
                    &expr.operator.lexeme,
                )),
            },
            TokenType::EqualEqual => Ok(Value::Bool(left == right)),
            TokenType::BangEqual => Ok(Value::Bool(left != right)),
            _ => Err(LoxError::runtime(
                expr.operator.span,
                RuntimeErrorCode::UnknownBinaryOperator,
                &expr.operator.lexeme,
            )),
        }
    }

    fn visit_call_expr(&self, expr: &CallExpr) -> LoxResult<Value> {
        let callee = self.evaluate(&expr.callee)?;

        let args = expr
            .arguments
            .iter()
            .map(|a| self.evaluate(a))
            .collect::<LoxResult<Vec<Value>>>()?;

        match callee {
            Value::Class(class) => {
                let expected = class.arity(self);
                if args.len() != expected {
                    let name = self.classes().get(class).name.lexeme.clone();
                    return Err(LoxError::runtime(
                        expr.span,
                        RuntimeErrorCode::ClassInitializerArityMismatch {
                            expected,
                            got: args.len(),
                        },
                        &name,
                    ));
                }
                class.call(self, args)
            }
            Value::Method(method) => {
                let expected = method.arity(self);
                if args.len() != expected {
                    return Err(LoxError::runtime(
                        expr.span,
                        RuntimeErrorCode::FunctionCallArityMismatch {
                            expected,
                            got: args.len(),
                        },
                        method.name(),
                    ));
                }
                method.call(self, args)
            }
            _ => Err(LoxError::runtime(
                expr.callee.span(),
                RuntimeErrorCode::CallNonFunctionValue,
                "",
            )),
        }
    }

    fn visit_get_expr(&self, expr: &GetExpr) -> LoxResult<Value> {
        let value = self.evaluate(&expr.object)?;

        if let Value::Instance(inst) = value {
            let property = self
                .heap()
                .get(inst)
                .get(inst, &expr.name.lexeme, &self.classes());
            property.ok_or_else(|| {
                LoxError::runtime(
                    expr.name.span,
                    RuntimeErrorCode::UndefinedProperty,
                    &expr.name.lexeme,
                )
            })
        } else {
            Err(LoxError::runtime(
                expr.span,
                RuntimeErrorCode::NonInstancePropertyAccess,
                &expr.name.lexeme,
            ))
        }
    }

    fn visit_grouping_expr(&self, expr: &GroupingExpr) -> LoxResult<Value> {
        self.evaluate(&expr.expression)
    }

    fn visit_literal_expr(&self, expr: &LiteralExpr) -> LoxResult<Value> {
        Ok(expr.value.clone())
    }

    fn visit_set_expr(&self, expr: &SetExpr) -> LoxResult<Value> {
        let obj = self.evaluate(&expr.object)?;

        if let Value::Instance(inst) = obj {
            let value = self.evaluate(&expr.value)?;
            self.heap
                .borrow_mut()
                .get_mut(inst)
                .set(&expr.name.lexeme, value.clone());
            Ok(value)
        } else {
            Err(LoxError::runtime(
                expr.object.span(),
                RuntimeErrorCode::NonInstancePropertyAccess,
                &expr.name.lexeme,
            ))
        }
    }

    fn visit_super_expr(&self, expr: &SuperExpr) -> LoxResult<Value> {
        let frame = self.current_frame().ok_or_else(|| {
            LoxError::compile(expr.keyword.span, CompileErrorCode::SuperOutsideClass)
        })?;
        // Start above the class that declared the running method, not above
        // the receiver's own class.
        let superclass = self
            .classes()
            .get(frame.declaring_class)
            .superclass()
            .ok_or_else(|| {
                LoxError::compile(expr.keyword.span, CompileErrorCode::SuperOutsideChildClass)
            })?;
        let (declaring_class, method) = self
            .classes()
            .find_method(superclass, &expr.method.lexeme)
            .ok_or_else(|| {
                LoxError::runtime(
                    expr.method.span,
                    RuntimeErrorCode::UndefinedProperty,
                    &expr.method.lexeme,
                )
            })?;
        debug_assert!(self
            .classes()
            .is_subclass_of(self.heap().get(frame.receiver).class(), declaring_class));
        trace!(
            "super",
            "{} -> {}.{}",
            self.classes().get(frame.declaring_class).name.lexeme,
            self.classes().get(declaring_class).name.lexeme,
            expr.method.lexeme
        );

        Ok(Value::Method(Rc::new(BoundMethod::new(
            frame.receiver,
            declaring_class,
            method,
        ))))
    }

    fn visit_this_expr(&self, expr: &ThisExpr) -> LoxResult<Value> {
        self.current_frame()
            .map(|frame| Value::Instance(frame.receiver))
            .ok_or_else(|| LoxError::compile(expr.keyword.span, CompileErrorCode::ThisOutsideClass))
    }

    fn visit_var_expr(&self, expr: &VarExpr) -> LoxResult<Value> {
        self.environment
            .borrow()
            .borrow()
            .get(&expr.name.lexeme)
            .ok_or_else(|| {
                LoxError::runtime(
                    expr.name.span,
                    RuntimeErrorCode::UndefinedVariable,
                    &expr.name.lexeme,
                )
            })
    }
}
