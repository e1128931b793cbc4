// ABOUTME: Lexical scope chain used by the evaluator

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A lexical scope: a mapping from name to value plus an optional pointer
/// to an enclosing scope. Lookup walks outward; `define` always writes to
/// the current scope. The parent link is a back-reference used only for
/// lookup, never for ownership — scopes form a stack popped on call return,
/// never a cycle.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new root environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child scope whose lookups fall through to `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `name` in this scope, shadowing any binding of the same name
    /// in an enclosing scope.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up `name` in this scope, then recursively in enclosing scopes.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// The outermost ancestor in this scope's parent chain (itself, if this
    /// scope has no parent). User function calls chain to this rather than
    /// to the caller's scope, since functions are not closures.
    pub fn root(self: &Rc<Self>) -> Rc<Environment> {
        match &self.parent {
            Some(parent) => parent.root(),
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Integer(42));
        assert!(matches!(env.get("x"), Some(Value::Integer(42))));
    }

    #[test]
    fn undefined_name_is_none() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn child_scope_shadows_parent() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Integer(42));

        let child = Environment::with_parent(parent);
        child.define("x".to_string(), Value::Integer(100));

        assert!(matches!(child.get("x"), Some(Value::Integer(100))));
    }

    #[test]
    fn child_scope_sees_parent_bindings() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Integer(42));

        let child = Environment::with_parent(parent);
        assert!(matches!(child.get("x"), Some(Value::Integer(42))));
    }

    #[test]
    fn lookup_walks_multiple_levels() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Value::Integer(1));

        let parent = Environment::with_parent(grandparent);
        parent.define("b".to_string(), Value::Integer(2));

        let child = Environment::with_parent(parent);
        child.define("c".to_string(), Value::Integer(3));

        assert!(matches!(child.get("a"), Some(Value::Integer(1))));
        assert!(matches!(child.get("b"), Some(Value::Integer(2))));
        assert!(matches!(child.get("c"), Some(Value::Integer(3))));
    }

    #[test]
    fn a_binding_defined_in_a_child_is_not_visible_to_its_parent() {
        let parent = Environment::new();
        let child = Environment::with_parent(parent.clone());
        child.define("local".to_string(), Value::Integer(1));

        assert!(parent.get("local").is_none());
    }

    #[test]
    fn root_walks_to_the_outermost_scope() {
        let grandparent = Environment::new();
        let parent = Environment::with_parent(grandparent.clone());
        let child = Environment::with_parent(parent);

        assert!(Rc::ptr_eq(&child.root(), &grandparent));
        assert!(Rc::ptr_eq(&grandparent.root(), &grandparent));
    }
}
