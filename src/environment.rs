use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to a scope. Closures and the interpreter may hold the same
/// scope; writes through any handle are visible to all of them.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: its bindings plus a link to the enclosing scope.
/// The link is fixed at creation so the chain is always a tree.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// The global scope.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn with_enclosing(enclosing: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Bind `name` in this scope, replacing any previous binding.
    pub fn define(&mut self, name: &str, value: Value) {
        trace!("define {} = {}", name, value);

        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up here, then in each enclosing scope.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite the nearest existing binding of `name`.
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

    /// Read a binding directly in this scope, without walking outward.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

/// The scope `distance` hops outward from `env` (0 is `env` itself).
pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
    let mut current: EnvRef = Rc::clone(env);

    for _ in 0..distance {
        let next: EnvRef = current.borrow().enclosing()?;
        current = next;
    }

    Some(current)
}

/// Read `name` from the scope exactly `distance` hops out.
pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
    ancestor(env, distance)
        .and_then(|scope| scope.borrow().get_local(&name.lexeme))
        .ok_or_else(|| undefined(name))
}

/// Write `name` in the scope exactly `distance` hops out.
pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
    let scope: EnvRef = ancestor(env, distance).ok_or_else(|| undefined(name))?;

    scope.borrow_mut().define(&name.lexeme, value);

    Ok(())
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
