#![forbid(unsafe_code)]

//! The conditional template controller pair.
//!
//! [`If`] owns a bound value coerced to boolean via truthiness, a primary
//! view factory, an optionally linked alternate branch, and a
//! [`CompositionCoordinator`]. Value changes never mutate the DOM
//! synchronously: the controller enqueues itself on the owning
//! [`ChangeSet`] and applies the swap for the value current at flush time,
//! so any number of toggles between flushes produce exactly one swap.
//!
//! # Invariants
//!
//! 1. Branch views are instantiated lazily, once, and reused across
//!    toggles; node-sequence identity is stable per branch.
//! 2. Observable DOM content lags one flush behind a value write, except
//!    when the write itself happens inside a flush
//!    (`FROM_FLUSH_CHANGES`), in which case the swap applies immediately.
//! 3. Each controller owns its own view's bind lifecycle: unbinding the
//!    primary never unbinds the alternate's view.
//!
//! # Failure Modes
//!
//! - Value writes before the controller is bound only store the value; no
//!   reaction is queued.
//! - Unbinding a never-bound controller is a safe no-op.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::changeset::{ChangeSet, ChangeTracker};
use crate::coordinator::CompositionCoordinator;
use crate::dom::RenderLocation;
use crate::flags::{LifecycleFlags, State};
use crate::lifecycle::{Attachable, AttachPass, Bindable, DetachPass};
use crate::scope::Scope;
use crate::value::BoundValue;
use crate::view::{View, ViewFactory};

/// Conditional template controller: shows its view while the bound value is
/// truthy, the linked alternate's view (if any) while falsy.
pub struct If {
    change_set: Rc<ChangeSet>,
    coordinator: CompositionCoordinator,
    value: RefCell<BoundValue>,
    if_factory: Rc<ViewFactory>,
    else_factory: RefCell<Option<Rc<ViewFactory>>>,
    if_view: RefCell<Option<Rc<View>>>,
    else_view: RefCell<Option<Rc<View>>>,
    location: Rc<dyn RenderLocation>,
    state: Cell<State>,
    scope: RefCell<Option<Rc<Scope>>>,
    weak_self: Weak<If>,
}

impl If {
    /// Create a controller for `location`, rendering the truthy branch
    /// from `if_factory`.
    #[must_use]
    pub fn new(
        change_set: &Rc<ChangeSet>,
        if_factory: &Rc<ViewFactory>,
        location: Rc<dyn RenderLocation>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            change_set: Rc::clone(change_set),
            coordinator: CompositionCoordinator::new(if_factory.lifecycle()),
            value: RefCell::new(BoundValue::Undefined),
            if_factory: Rc::clone(if_factory),
            else_factory: RefCell::new(None),
            if_view: RefCell::new(None),
            else_view: RefCell::new(None),
            location,
            state: Cell::new(State::empty()),
            scope: RefCell::new(None),
            weak_self: weak_self.clone(),
        })
    }

    /// The controller's completed-phase mask.
    #[must_use]
    pub fn state(&self) -> State {
        self.state.get()
    }

    /// The current bound value.
    #[must_use]
    pub fn value(&self) -> BoundValue {
        self.value.borrow().clone()
    }

    /// The controller's swap coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &CompositionCoordinator {
        &self.coordinator
    }

    /// The view occupying the coordinator's slot, if any.
    #[must_use]
    pub fn current_view(&self) -> Option<Rc<View>> {
        self.coordinator.current_view()
    }

    /// The instantiated truthy-branch view, if any.
    #[must_use]
    pub fn if_view(&self) -> Option<Rc<View>> {
        self.if_view.borrow().clone()
    }

    /// The instantiated falsy-branch view, if any.
    #[must_use]
    pub fn else_view(&self) -> Option<Rc<View>> {
        self.else_view.borrow().clone()
    }

    /// Write the bound value.
    ///
    /// While bound, a change queues the swap on the owning [`ChangeSet`]
    /// (coalesced by controller identity) unless the write already happens
    /// inside a flush, in which case the swap applies immediately. Writes
    /// before bind only store the value.
    pub fn set_value(&self, value: impl Into<BoundValue>, flags: LifecycleFlags) {
        let value = value.into();
        let changed = {
            let mut current = self.value.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if !changed || !self.state.get().contains(State::IS_BOUND) {
            return;
        }
        if flags.contains(LifecycleFlags::FROM_FLUSH_CHANGES) {
            self.apply_value_change(flags);
        } else if let Some(me) = self.weak_self.upgrade() {
            self.change_set.enqueue(me as Rc<dyn ChangeTracker>);
        }
    }

    fn apply_value_change(&self, flags: LifecycleFlags) {
        let truthy = self.value.borrow().is_truthy();
        debug!(truthy, "applying conditional value change");
        let view = self.branch_view(truthy);
        self.coordinator.compose(view, &self.change_set, flags);
    }

    fn branch_view(&self, truthy: bool) -> Option<Rc<View>> {
        if truthy {
            Some(self.ensure_view(&self.if_view, &self.if_factory))
        } else {
            let factory = self.else_factory.borrow().clone();
            factory.map(|f| self.ensure_view(&self.else_view, &f))
        }
    }

    fn ensure_view(
        &self,
        slot: &RefCell<Option<Rc<View>>>,
        factory: &Rc<ViewFactory>,
    ) -> Rc<View> {
        if let Some(view) = slot.borrow().clone() {
            return view;
        }
        let view = factory.create();
        view.hold(Rc::clone(&self.location));
        *slot.borrow_mut() = Some(Rc::clone(&view));
        view
    }

    fn set_else_factory(&self, factory: Rc<ViewFactory>) {
        *self.else_factory.borrow_mut() = Some(factory);
    }
}

impl Bindable for If {
    fn bind(&self, flags: LifecycleFlags, scope: &Rc<Scope>) {
        if self.state.get().contains(State::IS_BOUND) {
            let same = self
                .scope
                .borrow()
                .as_ref()
                .is_some_and(|current| Rc::ptr_eq(current, scope));
            if same {
                return;
            }
            // Scope refresh: rebind the current view, keep the branch.
            *self.scope.borrow_mut() = Some(Rc::clone(scope));
            self.coordinator.bind_current(flags, scope);
            return;
        }
        *self.scope.borrow_mut() = Some(Rc::clone(scope));
        self.state.set(self.state.get() | State::IS_BOUND);
        let view = self.branch_view(self.value.borrow().is_truthy());
        self.coordinator.bind_current(flags, scope);
        self.coordinator.compose(view, &self.change_set, flags);
    }

    fn unbind(&self, flags: LifecycleFlags) {
        if !self.state.get().contains(State::IS_BOUND) {
            return;
        }
        self.state.set(self.state.get() & !State::IS_BOUND);
        self.coordinator.unbind_current(flags);
    }
}

impl Attachable for If {
    fn attach(&self, pass: &AttachPass) {
        if self.state.get().contains(State::IS_ATTACHED) {
            return;
        }
        self.state.set(self.state.get() | State::IS_ATTACHED);
        self.coordinator.attach_current(pass);
    }

    fn detach(&self, pass: &DetachPass) {
        if !self.state.get().contains(State::IS_ATTACHED) {
            return;
        }
        self.state.set(self.state.get() & !State::IS_ATTACHED);
        self.coordinator.detach_current(pass);
    }
}

impl ChangeTracker for If {
    fn flush_changes(&self) {
        self.apply_value_change(LifecycleFlags::FROM_FLUSH_CHANGES);
    }
}

/// Alternate-branch controller; renders when the linked [`If`]'s value is
/// falsy.
pub struct Else {
    factory: Rc<ViewFactory>,
    primary: RefCell<Weak<If>>,
}

impl Else {
    /// Create an alternate controller around `factory`.
    #[must_use]
    pub fn new(factory: &Rc<ViewFactory>) -> Rc<Self> {
        Rc::new(Self {
            factory: Rc::clone(factory),
            primary: RefCell::new(Weak::new()),
        })
    }

    /// Install this controller's factory as `primary`'s alternate branch
    /// and record the back-reference.
    pub fn link(&self, primary: &Rc<If>) {
        primary.set_else_factory(Rc::clone(&self.factory));
        *self.primary.borrow_mut() = Rc::downgrade(primary);
    }

    /// The linked primary controller, if still alive.
    #[must_use]
    pub fn primary(&self) -> Option<Rc<If>> {
        self.primary.borrow().upgrade()
    }
}
