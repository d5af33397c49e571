use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

pub type Link = Option<Rc<RefCell<Environment>>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Link,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }
    pub fn new_with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }
    /// Looks `name` up here, then outward through the enclosing scopes.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self.enclosing.as_ref()?.borrow().get(name),
        }
    }
    /// Rebinds the closest existing `name`. False when no scope defines it.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => false,
        }
    }
    /// Bindings of this scope only.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }
    pub fn enclosing(&self) -> Link {
        self.enclosing.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::environment::Environment;
    use crate::value::Value;

    #[test]
    fn can_define() {
        let mut e = Environment::new();
        e.define("hello", Value::Number(9.0));

        assert!(e.values.contains_key("hello"));
        assert_eq!(e.values.get("hello").unwrap(), &Value::Number(9.0))
    }

    #[test]
    fn can_assign() {
        let mut e = Environment::new();
        e.define("hello", Value::Number(9.0));

        assert!(e.assign("hello", Value::Number(7.0)));
        assert_eq!(e.values.get("hello").unwrap(), &Value::Number(7.0))
    }

    #[test]
    fn fail_assign_to_undefined() {
        let mut e = Environment::new();

        assert!(!e.assign("nope", Value::Number(7.0)));
        assert!(!e.values.contains_key("nope"));
    }

    #[test]
    fn get_when_undefined() {
        let e = Environment::new();

        assert!(e.get("nope").is_none());
    }

    #[test]
    fn can_read_from_enclosing() {
        let e = Rc::new(RefCell::new(Environment::new()));
        e.borrow_mut().define("hello", Value::Number(9.0));

        let f = Environment::new_with_enclosing(e);

        assert_eq!(f.get("hello"), Some(Value::Number(9.0)))
    }

    #[test]
    fn inner_definition_shadows_enclosing() {
        let e = Rc::new(RefCell::new(Environment::new()));
        e.borrow_mut().define("hello", Value::Number(9.0));

        let mut f = Environment::new_with_enclosing(Rc::clone(&e));
        f.define("hello", Value::Bool(true));

        assert_eq!(f.get("hello"), Some(Value::Bool(true)));
        assert_eq!(e.borrow().get("hello"), Some(Value::Number(9.0)));
    }

    #[test]
    fn can_assign_to_enclosing() {
        let e = Rc::new(RefCell::new(Environment::new()));
        e.borrow_mut().define("hello", Value::Number(9.0));

        let mut f = Environment::new_with_enclosing(Rc::clone(&e));

        assert!(f.assign("hello", Value::Number(7.0)));

        assert_eq!(f.get("hello"), Some(Value::Number(7.0)));
        assert_eq!(e.borrow().get("hello"), Some(Value::Number(7.0)));
    }

    #[test]
    fn values_cover_only_this_scope() {
        let e = Rc::new(RefCell::new(Environment::new()));
        e.borrow_mut().define("outer", Value::Number(1.0));

        let mut f = Environment::new_with_enclosing(Rc::clone(&e));
        f.define("inner", Value::Bool(true));

        let values: Vec<&Value> = f.values().collect();
        assert_eq!(values, vec![&Value::Bool(true)]);
        assert!(f.enclosing().is_some_and(|link| Rc::ptr_eq(&link, &e)));
        assert!(e.borrow().enclosing().is_none());
    }
}
