use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::callable::LoxCallable;
use crate::environment::Environment;
use crate::error::LoxResult;
use crate::function::BoundMethod;
use crate::heap::InstanceId;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

pub const CONSTRUCTOR_NAME: &str = "init";

/// Stable handle to a class held by a [`ClassRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

#[derive(Debug)]
pub struct ClassDefinition {
    pub name: Token,
    methods: HashMap<String, Rc<FunctionDecl>>,
    superclass: Option<ClassId>,
    closure: Rc<RefCell<Environment>>,
}

impl ClassDefinition {
    pub fn new(
        name: &Token,
        methods: &[Rc<FunctionDecl>],
        superclass: Option<ClassId>,
        closure: &Rc<RefCell<Environment>>,
    ) -> Self {
        let mut methods_hash = HashMap::new();
        for m in methods {
            // A later declaration with the same name replaces the earlier one.
            methods_hash.insert(m.name.lexeme.clone(), Rc::clone(m));
        }
        Self {
            name: name.clone(),
            methods: methods_hash,
            superclass,
            closure: Rc::clone(closure),
        }
    }
    pub fn superclass(&self) -> Option<ClassId> {
        self.superclass
    }
    pub fn closure(&self) -> Rc<RefCell<Environment>> {
        Rc::clone(&self.closure)
    }
    fn own_method(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.methods.get(name).map(Rc::clone)
    }
}

/// Owns every class declared while a program runs.
///
/// Superclass links are plain [`ClassId`]s into this registry, so an
/// inheritance chain of any depth is walked by repeated lookup.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDefinition>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    /// Every evaluation of a class declaration registers a new class, so a
    /// declaration inside a method body adds one entry per call. Entries are
    /// never removed: instances and bound methods name their class by id.
    pub fn register(&mut self, class: ClassDefinition) -> ClassId {
        let id = ClassId(self.classes.len());
        self.classes.push(class);
        id
    }

    /// Ids are only ever minted by [`ClassRegistry::register`], so every id
    /// indexes a live class.
    pub fn get(&self, id: ClassId) -> &ClassDefinition {
        &self.classes[id.0]
    }

    /// Scopes the declared classes were created in. Their bindings stay
    /// reachable for as long as the classes can run methods.
    pub fn closures(&self) -> impl Iterator<Item = Rc<RefCell<Environment>>> + '_ {
        self.classes.iter().map(ClassDefinition::closure)
    }

    /// First match walking `class`, its superclass, and so on up the chain.
    /// Returns the class whose method table held the method alongside it.
    pub fn find_method(&self, class: ClassId, name: &str) -> Option<(ClassId, Rc<FunctionDecl>)> {
        let mut current = Some(class);
        while let Some(id) = current {
            let class = self.get(id);
            if let Some(method) = class.own_method(name) {
                return Some((id, method));
            }
            current = class.superclass;
        }
        None
    }

    /// True when `ancestor` is `class` itself or sits above it in the chain.
    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).superclass;
        }
        false
    }
}

impl LoxCallable for ClassId {
    fn call(&self, interpreter: &Interpreter, args: Vec<Value>) -> LoxResult<Value> {
        trace!("new", "{}", interpreter.classes().get(*self).name.lexeme);
        let inst = interpreter.allocate(Instance::new(*self));
        let init = interpreter.classes().find_method(*self, CONSTRUCTOR_NAME);
        if let Some((declaring_class, init)) = init {
            let bound = BoundMethod::new(inst, declaring_class, init);
            // Whatever `init` hands back, the call expression yields the instance.
            bound.call(interpreter, args)?;
        }
        Ok(Value::Instance(inst))
    }

    fn arity(&self, interpreter: &Interpreter) -> usize {
        interpreter
            .classes()
            .find_method(*self, CONSTRUCTOR_NAME)
            .map_or(0, |(_, init)| init.params.len())
    }
}

#[derive(Debug)]
pub struct Instance {
    class: ClassId,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: ClassId) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }
    pub fn class(&self) -> ClassId {
        self.class
    }
    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
    pub fn fields(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }
    /// Property read on this instance, stored at `this`. Fields shadow
    /// methods; a method is bound fresh on every access.
    pub fn get(&self, this: InstanceId, name: &str, classes: &ClassRegistry) -> Option<Value> {
        self.field(name).or_else(|| {
            classes
                .find_method(self.class, name)
                .map(|(declaring_class, method)| {
                    Value::Method(Rc::new(BoundMethod::new(this, declaring_class, method)))
                })
        })
    }
    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}
