use crate::error::LoxResult;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Anything a call expression can invoke: a class (instantiation) or a
/// bound method.
pub trait LoxCallable {
    fn call(&self, interpreter: &Interpreter, args: Vec<Value>) -> LoxResult<Value>;
    fn arity(&self, interpreter: &Interpreter) -> usize;
}
