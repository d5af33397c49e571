use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::callable::LoxCallable;
use crate::class::ClassId;
use crate::environment::Environment;
use crate::error::LoxResult;
use crate::heap::InstanceId;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// A method body paired with the instance it runs against.
///
/// `declaring_class` is the class whose method table held `method`; `super`
/// inside the body resolves from that class's superclass, never from the
/// receiver's concrete class.
#[derive(Debug)]
pub struct BoundMethod {
    receiver: InstanceId,
    declaring_class: ClassId,
    method: Rc<FunctionDecl>,
}

impl BoundMethod {
    pub fn new(receiver: InstanceId, declaring_class: ClassId, method: Rc<FunctionDecl>) -> Self {
        Self {
            receiver,
            declaring_class,
            method,
        }
    }
    pub fn receiver(&self) -> InstanceId {
        self.receiver
    }
    pub fn declaring_class(&self) -> ClassId {
        self.declaring_class
    }
    pub fn name(&self) -> &str {
        &self.method.name.lexeme
    }
}

impl LoxCallable for BoundMethod {
    fn call(&self, interpreter: &Interpreter, args: Vec<Value>) -> LoxResult<Value> {
        let closure = interpreter.classes().get(self.declaring_class).closure();
        let mut env = Environment::new_with_enclosing(closure);
        for (param, value) in self.method.params.iter().zip(args) {
            env.define(&param.lexeme, value);
        }
        interpreter.execute_method(self, &self.method.body, env)
    }

    fn arity(&self, _interpreter: &Interpreter) -> usize {
        self.method.params.len()
    }
}
