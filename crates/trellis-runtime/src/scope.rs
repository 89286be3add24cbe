#![forbid(unsafe_code)]

//! Data scopes for view binding.
//!
//! A [`Scope`] is the data context a view is bound against: a view-model
//! ([`BindingContext`]) plus an optional parent scope for lookup chaining.
//! The lifecycle core never inspects scope internals beyond pointer
//! identity — the same-scope rebind optimization compares `Rc` pointers,
//! nothing else. [`BindingContext`] carries actual values only so templates
//! and fixtures have something to render.
//!
//! # Invariants
//!
//! 1. A view owns at most one scope at a time; rebinding replaces it.
//! 2. `lookup` resolves in the nearest context that defines the key,
//!    walking parents outward.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ahash::RandomState;

use crate::value::BoundValue;

/// A string-keyed view-model backing a [`Scope`].
#[derive(Debug, Default)]
pub struct BindingContext {
    values: RefCell<HashMap<String, BoundValue, RandomState>>,
}

impl BindingContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Create a context pre-populated from key/value pairs.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Rc<Self>
    where
        K: Into<String>,
        V: Into<BoundValue>,
    {
        let ctx = Self::new();
        for (key, value) in values {
            ctx.set(key, value);
        }
        ctx
    }

    /// Read a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<BoundValue> {
        self.values.borrow().get(key).cloned()
    }

    /// Write a value by key, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: impl Into<BoundValue>) {
        self.values.borrow_mut().insert(key.into(), value.into());
    }
}

/// The data context a view is bound against.
#[derive(Debug)]
pub struct Scope {
    binding_context: Rc<BindingContext>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// Create a root scope over `binding_context`.
    #[must_use]
    pub fn new(binding_context: Rc<BindingContext>) -> Rc<Self> {
        Rc::new(Self {
            binding_context,
            parent: None,
        })
    }

    /// Create a child scope chained to `parent` for lookup.
    #[must_use]
    pub fn from_parent(parent: &Rc<Scope>, binding_context: Rc<BindingContext>) -> Rc<Self> {
        Rc::new(Self {
            binding_context,
            parent: Some(Rc::clone(parent)),
        })
    }

    /// The scope's own view-model.
    #[must_use]
    pub fn binding_context(&self) -> &Rc<BindingContext> {
        &self.binding_context
    }

    /// The parent scope, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    /// Resolve `key` in this scope, walking the parent chain outward.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<BoundValue> {
        if let Some(value) = self.binding_context.get(key) {
            return Some(value);
        }
        self.parent.as_ref().and_then(|p| p.lookup(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_resolves_in_own_context() {
        let scope = Scope::new(BindingContext::with_values([("name", "inner")]));
        assert_eq!(scope.lookup("name"), Some(BoundValue::from("inner")));
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let parent = Scope::new(BindingContext::with_values([("shared", 1_i64)]));
        let child = Scope::from_parent(&parent, BindingContext::new());
        assert_eq!(child.lookup("shared"), Some(BoundValue::from(1_i64)));
    }

    #[test]
    fn nearest_context_shadows_parent() {
        let parent = Scope::new(BindingContext::with_values([("x", "outer")]));
        let child = Scope::from_parent(&parent, BindingContext::with_values([("x", "inner")]));
        assert_eq!(child.lookup("x"), Some(BoundValue::from("inner")));
    }

    #[test]
    fn missing_key_is_none() {
        let scope = Scope::new(BindingContext::new());
        assert_eq!(scope.lookup("absent"), None);
    }

    #[test]
    fn set_replaces_previous_value() {
        let ctx = BindingContext::with_values([("n", 1_i64)]);
        ctx.set("n", 2_i64);
        assert_eq!(ctx.get("n"), Some(BoundValue::from(2_i64)));
    }
}
