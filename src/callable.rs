//! Everything that can appear on the left of `(...)`.
//!
//! `Callable` is a closed set: user functions (closures), host‑provided
//! natives and classes (which construct instances when called).  All three
//! share one `arity` / `call` capability.

use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::FunctionDecl;
use crate::class::{InstanceRef, LoxClass};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Host function signature.  `receiver` is set for native methods bound to
/// an instance; the `Err` string becomes a runtime error at the call site.
pub type NativeFn =
    fn(&mut Interpreter, Option<&InstanceRef>, &[Value]) -> std::result::Result<Value, String>;

#[derive(Clone)]
pub enum Callable {
    Function(Rc<LoxFunction>),
    Native(Rc<NativeFunction>),
    Class(Rc<LoxClass>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Function(function) => function.arity(),
            Callable::Native(native) => native.arity,
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invoke with already‑evaluated arguments.  `paren` locates errors.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>, paren: &Token) -> Result<Value> {
        match self {
            Callable::Function(function) => function.call(interpreter, arguments),

            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);

                (native.func)(interpreter, native.receiver.as_ref(), &arguments)
                    .map_err(|message| LoxError::runtime(paren.line, message))
            }

            Callable::Class(class) => LoxClass::instantiate(class, interpreter, arguments, paren),
        }
    }

    /// Identity comparison.
    pub fn same_as(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Class(class) => write!(f, "{}", class.name),
        }
    }
}

/// A closure: a declaration plus the scope that was current when the
/// declaration was evaluated.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this method whose closure has `this` bound to `instance`.
    pub fn bind(&self, instance: &InstanceRef) -> LoxFunction {
        let environment: EnvRef = Environment::child_of(&self.closure);

        environment
            .borrow_mut()
            .define("this", Value::Instance(Rc::clone(instance)));

        LoxFunction::new(
            Rc::clone(&self.declaration),
            environment,
            self.is_initializer,
        )
    }

    pub fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let environment: EnvRef = Environment::child_of(&self.closure);

        {
            let mut scope = environment.borrow_mut();
            for (param, value) in self.declaration.params.iter().zip(arguments) {
                scope.define(&param.lexeme, value);
            }
        }

        let flow: Flow = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            return Ok(self.bound_this());
        }

        let result = match flow {
            Flow::Return(value) => value,
            Flow::Normal | Flow::Break => Value::Nil,
        };

        info!("Function '{}' returned: {}", self.name(), result);

        Ok(result)
    }

    fn bound_this(&self) -> Value {
        self.closure
            .borrow()
            .get_here("this")
            .unwrap_or(Value::Nil)
    }
}

/// A function implemented by the host.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
    pub receiver: Option<InstanceRef>,
}

impl NativeFunction {
    pub fn new(name: &'static str, arity: usize, func: NativeFn) -> Self {
        Self {
            name,
            arity,
            func,
            receiver: None,
        }
    }

    /// Same host function, fixed to `instance`.
    pub fn bind(&self, instance: &InstanceRef) -> NativeFunction {
        NativeFunction {
            name: self.name,
            arity: self.arity,
            func: self.func,
            receiver: Some(Rc::clone(instance)),
        }
    }
}
