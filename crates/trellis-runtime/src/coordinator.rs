#![forbid(unsafe_code)]

//! The view-swap coordinator.
//!
//! A [`CompositionCoordinator`] owns exactly one "current view" slot for a
//! host location and swaps it in response to state changes while honoring
//! the lifecycle ordering rules: the outgoing view is detached, unmounted,
//! and unbound before the incoming view binds, attaches, and mounts, all
//! within the same flush.
//!
//! # Invariants
//!
//! 1. At most one view is attached/mounted at the coordinator's location at
//!    any time.
//! 2. Composing the view that is already current is a no-op, so branch
//!    identity stays stable across rapid toggles within one flush window.
//! 3. The incoming view only attaches/mounts when the coordinator itself is
//!    attached; while the coordinator is merely bound, composing binds the
//!    new view and defers attach until the owning controller attaches.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::changeset::ChangeSet;
use crate::flags::{LifecycleFlags, State};
use crate::lifecycle::{Attachable, AttachPass, Bindable, DetachPass, Lifecycle};
use crate::scope::Scope;
use crate::view::View;

/// Owns the single current-view slot for a host location.
pub struct CompositionCoordinator {
    lifecycle: Rc<Lifecycle>,
    current_view: RefCell<Option<Rc<View>>>,
    scope: RefCell<Option<Rc<Scope>>>,
    is_bound: Cell<bool>,
    is_attached: Cell<bool>,
}

impl CompositionCoordinator {
    /// Create a coordinator with an empty slot.
    #[must_use]
    pub fn new(lifecycle: &Rc<Lifecycle>) -> Self {
        Self {
            lifecycle: Rc::clone(lifecycle),
            current_view: RefCell::new(None),
            scope: RefCell::new(None),
            is_bound: Cell::new(false),
            is_attached: Cell::new(false),
        }
    }

    /// The view currently occupying the slot.
    #[must_use]
    pub fn current_view(&self) -> Option<Rc<View>> {
        self.current_view.borrow().clone()
    }

    /// Whether the owning controller is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.is_bound.get()
    }

    /// Whether the owning controller is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.is_attached.get()
    }

    /// Swap the slot to `view` (or empty it with `None`).
    ///
    /// The outgoing view is detached and unmounted through a bracketed
    /// detach pass — its DOM removal completes at that pass's `end()`,
    /// inside the current flush — and then unbound. The incoming view is
    /// bound against the coordinator's scope when the controller is bound,
    /// and attached + mounted when the controller is attached.
    pub fn compose(
        &self,
        view: Option<Rc<View>>,
        change_set: &Rc<ChangeSet>,
        flags: LifecycleFlags,
    ) {
        let current = self.current_view.borrow().clone();
        if let (Some(old), Some(new)) = (&current, &view) {
            if Rc::ptr_eq(old, new) {
                return;
            }
        }
        if current.is_none() && view.is_none() {
            return;
        }
        debug!(
            outgoing = current.is_some(),
            incoming = view.is_some(),
            "composing view swap"
        );

        if let Some(old) = current {
            if old.state().contains(State::IS_ATTACHED) {
                let pass = self.lifecycle.begin_detach(change_set, flags);
                pass.add(&(Rc::clone(&old) as Rc<dyn Attachable>));
                pass.end();
            }
            if old.state().contains(State::IS_BOUND) {
                old.unbind(flags | LifecycleFlags::FROM_UNBIND);
            }
        }

        *self.current_view.borrow_mut() = view.clone();

        if let Some(new) = view {
            if self.is_bound.get() {
                let scope = self.scope.borrow().clone();
                if let Some(scope) = scope {
                    new.bind(flags | LifecycleFlags::FROM_BIND, &scope);
                }
            }
            if self.is_attached.get() {
                let pass = self.lifecycle.begin_attach(change_set, None, flags);
                pass.add(&(new as Rc<dyn Attachable>));
                pass.end();
            }
        }
    }

    /// Record the controller as bound and bind the current view, if any.
    pub fn bind_current(&self, flags: LifecycleFlags, scope: &Rc<Scope>) {
        self.is_bound.set(true);
        *self.scope.borrow_mut() = Some(Rc::clone(scope));
        if let Some(view) = self.current_view() {
            view.bind(flags, scope);
        }
    }

    /// Unbind the current view and record the controller as unbound.
    pub fn unbind_current(&self, flags: LifecycleFlags) {
        self.is_bound.set(false);
        if let Some(view) = self.current_view() {
            view.unbind(flags);
        }
    }

    /// Record the controller as attached and attach the current view into
    /// the enclosing pass.
    pub fn attach_current(&self, pass: &AttachPass) {
        self.is_attached.set(true);
        if let Some(view) = self.current_view() {
            pass.add(&(view as Rc<dyn Attachable>));
        }
    }

    /// Detach the current view into the enclosing pass and record the
    /// controller as detached.
    pub fn detach_current(&self, pass: &DetachPass) {
        self.is_attached.set(false);
        if let Some(view) = self.current_view() {
            pass.add(&(view as Rc<dyn Attachable>));
        }
    }
}
