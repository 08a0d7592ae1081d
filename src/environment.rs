use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable handle to a scope.  Closures, bound methods and the
/// interpreter all alias scopes through this.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope.  Scopes only point outward, never at their children.
#[derive(Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Convenience for the common `Rc<RefCell<_>>` child construction.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Bind `name` in this scope, overwriting any previous binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup walking outward.  Only used for globals and natives;
    /// resolved locals go through [`get_at`].
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Look a name up in this scope only.
    pub fn get_here(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// Read `name` exactly `distance` scopes out from `env`.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        let scope: EnvRef = ancestor(env, distance, name)?;
        let value = scope.borrow().get_here(&name.lexeme);

        value.ok_or_else(|| undefined(name))
    }

    /// Assign `name` exactly `distance` scopes out from `env`.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let scope: EnvRef = ancestor(env, distance, name)?;
        let mut scope = scope.borrow_mut();

        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

/// Follow `distance` enclosing links from `env`.
fn ancestor(env: &EnvRef, distance: usize, name: &Token) -> Result<EnvRef> {
    let mut scope: EnvRef = Rc::clone(env);

    for _ in 0..distance {
        let next = scope.borrow().enclosing();

        scope = match next {
            Some(next) => next,
            None => {
                debug!(
                    "Scope chain ended before {} hop(s) for '{}'",
                    distance, name.lexeme
                );
                return Err(undefined(name));
            }
        };
    }

    Ok(scope)
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name.line, format!("Undefined variable '{}'.", name.lexeme))
}
