use std::rc::Rc;

use crate::class::ClassId;
use crate::function::BoundMethod;
use crate::heap::InstanceId;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Class(ClassId),
    Instance(InstanceId),
    Method(Rc<BoundMethod>),
}

impl Value {
    /// The instance this value keeps alive, if any.
    pub fn referenced_instance(&self) -> Option<InstanceId> {
        match self {
            Value::Instance(id) => Some(*id),
            Value::Method(method) => Some(method.receiver()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::String(l), Value::String(r)) => l == r,
            (Value::Class(l), Value::Class(r)) => l == r,
            // Identity, not structure: two instances with equal fields are distinct objects.
            (Value::Instance(l), Value::Instance(r)) => l == r,
            (Value::Method(l), Value::Method(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}
