use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, LoxFunction, NativeFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Shared handle to an instance; aliases observe each other's writes.
pub type InstanceRef = Rc<RefCell<LoxInstance>>;

pub const INITIALIZER: &str = "init";

/// An entry in a class's method table.
#[derive(Clone)]
pub enum Method {
    Lox(Rc<LoxFunction>),
    Native(Rc<NativeFunction>),
}

impl Method {
    fn arity(&self) -> usize {
        match self {
            Method::Lox(function) => function.arity(),
            Method::Native(native) => native.arity,
        }
    }

    /// Produce a callable with the receiver fixed in place.
    pub fn bind(&self, instance: &InstanceRef) -> Callable {
        match self {
            Method::Lox(function) => Callable::Function(Rc::new(function.bind(instance))),
            Method::Native(native) => Callable::Native(Rc::new(native.bind(instance))),
        }
    }
}

pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Method>,
}

impl LoxClass {
    pub fn new(name: &str, superclass: Option<Rc<LoxClass>>, methods: HashMap<String, Method>) -> Self {
        Self {
            name: name.to_string(),
            superclass,
            methods,
        }
    }

    /// Own methods first, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Method> {
        match self.methods.get(name) {
            Some(method) => Some(method.clone()),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }

    /// A class takes as many arguments as its initializer.
    pub fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |initializer| initializer.arity())
    }

    pub fn instantiate(
        class: &Rc<LoxClass>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Instantiating class '{}'", class.name);

        let instance: InstanceRef = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));

        if let Some(initializer) = class.find_method(INITIALIZER) {
            initializer
                .bind(&instance)
                .call(interpreter, arguments, paren)?;
        }

        Ok(Value::Instance(instance))
    }
}

pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,

    /// Backing storage for host classes such as `List`.
    pub slots: Vec<Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
            slots: Vec::new(),
        }
    }

    /// Property access: fields shadow methods; methods come back bound.
    pub fn get(instance: &InstanceRef, name: &Token) -> Result<Value> {
        let this = instance.borrow();

        if let Some(value) = this.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        match this.class.find_method(&name.lexeme) {
            Some(method) => Ok(Value::Callable(method.bind(instance))),
            None => Err(LoxError::runtime(
                name.line,
                format!("Undefined property '{}'.", name.lexeme),
            )),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }
}

impl fmt::Display for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
