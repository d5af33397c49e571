use std::fmt;
use std::io;

use colored::Colorize;
use thiserror::Error;

use crate::span::Span;
use crate::token::Token;
use crate::value::Value;

pub type LoxResult<T> = Result<T, LoxError>;

/// Broad category an error belongs to, independent of its exact code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    TypeError,
    ArityError,
    PropertyError,
    NameError,
    CompileError,
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompileErrorCode {
    InheritFromSelf,
    InitializerReturnValue,
    LocalAlreadyDefined,
    ReadOwnLocalBeforeInitialized,
    SuperOutsideClass,
    SuperOutsideChildClass,
    ThisOutsideClass,
    TopLevelReturn,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorCode {
    NonClassInherit,
    CallNonFunctionValue,
    NumberBinaryExprOperandsIncorrectType,
    PlusExprOperandsIncorrectType,
    UnknownBinaryOperator,
    DivisionByZero,
    FunctionCallArityMismatch { expected: usize, got: usize },
    ClassInitializerArityMismatch { expected: usize, got: usize },
    UndefinedProperty,
    NonInstancePropertyAccess,
    UndefinedVariable,
}

impl RuntimeErrorCode {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeErrorCode::NonClassInherit
            | RuntimeErrorCode::CallNonFunctionValue
            | RuntimeErrorCode::NumberBinaryExprOperandsIncorrectType
            | RuntimeErrorCode::PlusExprOperandsIncorrectType
            | RuntimeErrorCode::UnknownBinaryOperator
            | RuntimeErrorCode::DivisionByZero => ErrorKind::TypeError,
            RuntimeErrorCode::FunctionCallArityMismatch { .. }
            | RuntimeErrorCode::ClassInitializerArityMismatch { .. } => ErrorKind::ArityError,
            RuntimeErrorCode::UndefinedProperty | RuntimeErrorCode::NonInstancePropertyAccess => {
                ErrorKind::PropertyError
            }
            RuntimeErrorCode::UndefinedVariable => ErrorKind::NameError,
        }
    }
}

/// `subject` names the offending local for the scope codes, empty otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub span: Span,
    pub code: CompileErrorCode,
    pub subject: String,
}

/// `subject` is the name the error is about (property, variable, operator),
/// empty when the code says it all.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub span: Span,
    pub code: RuntimeErrorCode,
    pub subject: String,
}

pub trait Demistify {
    fn demistify(&self) -> String;
}

impl Demistify for CompileError {
    fn demistify(&self) -> String {
        match self.code {
            CompileErrorCode::InheritFromSelf => "a class can't inherit from itself".to_string(),
            CompileErrorCode::InitializerReturnValue => {
                "an initializer can only return 'this'".to_string()
            }
            CompileErrorCode::LocalAlreadyDefined => format!(
                "could not define local variable '{}', a variable with this name already exists in this scope",
                self.subject
            ),
            CompileErrorCode::ReadOwnLocalBeforeInitialized => format!(
                "could not read local variable '{}', this variable is not initialized yet",
                self.subject
            ),
            CompileErrorCode::SuperOutsideClass => {
                "cannot use 'super' outside a class method".to_string()
            }
            CompileErrorCode::SuperOutsideChildClass => {
                "cannot use 'super' in class without a parent".to_string()
            }
            CompileErrorCode::ThisOutsideClass => "cannot use 'this' outside methods".to_string(),
            CompileErrorCode::TopLevelReturn => "cannot return outside a method".to_string(),
        }
    }
}

impl Demistify for RuntimeError {
    fn demistify(&self) -> String {
        match self.code {
            RuntimeErrorCode::NonClassInherit => {
                format!("cannot inherit from '{}', it is not a class", self.subject)
            }
            RuntimeErrorCode::CallNonFunctionValue => {
                "can only call classes and methods".to_string()
            }
            RuntimeErrorCode::NumberBinaryExprOperandsIncorrectType => {
                format!("operands of '{}' must be numbers", self.subject)
            }
            RuntimeErrorCode::PlusExprOperandsIncorrectType => {
                "operands of '+' must be two numbers or two strings".to_string()
            }
            RuntimeErrorCode::UnknownBinaryOperator => {
                format!("unknown binary operator '{}'", self.subject)
            }
            RuntimeErrorCode::DivisionByZero => "division by zero".to_string(),
            RuntimeErrorCode::FunctionCallArityMismatch { expected, got } => format!(
                "'{}' expected {} arguments but got {}",
                self.subject, expected, got
            ),
            RuntimeErrorCode::ClassInitializerArityMismatch { expected, got } => format!(
                "class '{}' init expected {} arguments but got {}",
                self.subject, expected, got
            ),
            RuntimeErrorCode::UndefinedProperty => {
                format!("undefined property '{}'", self.subject)
            }
            RuntimeErrorCode::NonInstancePropertyAccess => {
                "only instances have properties".to_string()
            }
            RuntimeErrorCode::UndefinedVariable => {
                format!("undefined variable '{}'", self.subject)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum LoxError {
    #[error("{}", .0.demistify())]
    Compile(CompileError),
    #[error("{}", .0.demistify())]
    Runtime(RuntimeError),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Unwinds a `return` statement to the enclosing method call. The
    /// interpreter catches it at the method boundary.
    #[error("'return' escaped its method")]
    Return(Value),
}

impl LoxError {
    pub fn compile(span: Span, code: CompileErrorCode) -> Self {
        LoxError::Compile(CompileError {
            span,
            code,
            subject: String::new(),
        })
    }
    /// Compile error about the name `token` introduces or reads.
    pub fn compile_at(token: &Token, code: CompileErrorCode) -> Self {
        LoxError::Compile(CompileError {
            span: token.span,
            code,
            subject: token.lexeme.clone(),
        })
    }
    pub fn runtime(span: Span, code: RuntimeErrorCode, subject: &str) -> Self {
        LoxError::Runtime(RuntimeError {
            span,
            code,
            subject: subject.to_string(),
        })
    }
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoxError::Compile(_) | LoxError::Return(_) => ErrorKind::CompileError,
            LoxError::Runtime(e) => e.code.kind(),
            LoxError::Io(_) => ErrorKind::IoError,
        }
    }
    pub fn span(&self) -> Option<Span> {
        match self {
            LoxError::Compile(e) => Some(e.span),
            LoxError::Runtime(e) => Some(e.span),
            LoxError::Io(_) | LoxError::Return(_) => None,
        }
    }
    pub fn report(&self) {
        let kind = self.kind().to_string().red().bold();
        match self.span() {
            Some(span) => eprintln!("{} {}: {}", format!("[line {}]", span).cyan(), kind, self),
            None => eprintln!("{}: {}", kind, self),
        }
    }
}
