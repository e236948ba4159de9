use std::fmt::Debug;

use gc::{Finalize, Trace};

use crate::object::Object;
use crate::types::{GcCell, Key, OrderedMap};


/// One lexical scope: local bindings plus an optional enclosing scope.
#[derive(Trace, Finalize, Default)]
pub struct Environment {
    store: OrderedMap<Key, Object>,
    outer: Option<Env>,
}


/// A shared handle to a lexical scope. Cloning an `Env` aliases the same
/// scope, which is how closures capture their defining environment.
#[derive(Clone, Trace, Finalize)]
pub struct Env(GcCell<Environment>);

impl Env {
    /// Create a new top-level environment with no enclosing scope.
    pub fn new() -> Env {
        Env(GcCell::new(Environment::default()))
    }

    /// Create a new, empty environment enclosed by `outer`.
    pub fn enclosed(outer: &Env) -> Env {
        Env(GcCell::new(Environment {
            store: OrderedMap::new(),
            outer: Some(outer.clone()),
        }))
    }

    /// Look up a name in this scope, then in each enclosing scope in turn.
    pub fn get(&self, name: Key) -> Option<Object> {
        let env = self.0.borrow();
        match env.store.get(&name) {
            Some(value) => Some(value.clone()),
            None => env.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }

    /// Bind a name in this scope only. Enclosing scopes are never modified;
    /// a binding here shadows any binding of the same name further out.
    pub fn set(&self, name: Key, value: Object) {
        self.0.borrow_mut().store.insert(name, value);
    }

    /// Names bound in this scope, in binding order.
    pub fn names(&self) -> Vec<Key> {
        self.0.borrow().store.iter().map(|(k, _)| *k).collect()
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

// Bindings are not printed: a scope usually contains closures that capture it.
impl Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("names", &self.names())
            .field("enclosed", &self.0.borrow().outer.is_some())
            .finish()
    }
}
