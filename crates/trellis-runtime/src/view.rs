#![forbid(unsafe_code)]

//! Views and their factories.
//!
//! A [`View`] is a reusable unit of bound and attachable DOM content: a node
//! sequence, an optional scope, a held render location, and a back-reference
//! to the [`ViewFactory`] that created it. Factories own a bounded pool of
//! released views so branch content can be swapped in and out without
//! reconstructing nodes.
//!
//! # Invariants
//!
//! 1. `hold` must be called before the view can mount; mounting without a
//!    held location is a programmer error (asserted in debug builds,
//!    skipped in release builds).
//! 2. A view returned to its factory's pool has its scope and location
//!    cleared and carries exactly `IS_CACHED`.
//! 3. Pool exhaustion is not an error: `release` reports via `bool` whether
//!    the pool retained the view.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::str::FromStr;

use thiserror::Error;
use tracing::trace;

use crate::dom::{NodeSequence, RenderLocation};
use crate::flags::{LifecycleFlags, State};
use crate::lifecycle::{Attachable, Bindable, Lifecycle, Mountable};
use crate::lifecycle::{AttachPass, DetachPass};
use crate::scope::Scope;

/// Creates node sequences and binds template content against a scope.
///
/// This is the seam to the templating layer: the lifecycle core calls the
/// hooks, the template decides what the nodes show. The bind hooks default
/// to no-ops for static content.
pub trait ViewTemplate {
    /// Create a fresh node sequence for a new view.
    fn create_nodes(&self) -> Rc<dyn NodeSequence>;

    /// Bind template content against `scope`.
    fn bind_nodes(&self, nodes: &Rc<dyn NodeSequence>, scope: &Rc<Scope>, flags: LifecycleFlags) {
        let _ = (nodes, scope, flags);
    }

    /// Tear template content back down.
    fn unbind_nodes(&self, nodes: &Rc<dyn NodeSequence>, flags: LifecycleFlags) {
        let _ = (nodes, flags);
    }
}

/// Pool capacity configuration for a [`ViewFactory`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheSize {
    /// No pooling; released views are abandoned.
    #[default]
    None,
    /// Retain at most this many released views.
    Bounded(usize),
    /// Retain every released view.
    Unbounded,
}

impl CacheSize {
    fn capacity(self) -> usize {
        match self {
            Self::None => 0,
            Self::Bounded(n) => n,
            Self::Unbounded => usize::MAX,
        }
    }
}

/// Error parsing a cache size from template markup.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cache size `{input}`: expected `*` or a non-negative integer")]
pub struct CacheSizeParseError {
    input: String,
}

impl FromStr for CacheSize {
    type Err = CacheSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" {
            return Ok(Self::Unbounded);
        }
        match trimmed.parse::<usize>() {
            Ok(0) => Ok(Self::None),
            Ok(n) => Ok(Self::Bounded(n)),
            Err(_) => Err(CacheSizeParseError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A bound + attachable unit of DOM content.
pub struct View {
    lifecycle: Rc<Lifecycle>,
    nodes: Rc<dyn NodeSequence>,
    template: Rc<dyn ViewTemplate>,
    state: Cell<State>,
    scope: RefCell<Option<Rc<Scope>>>,
    scope_locked: Cell<bool>,
    location: RefCell<Option<Rc<dyn RenderLocation>>>,
    factory: Weak<ViewFactory>,
    is_free: Cell<bool>,
    weak_self: Weak<View>,
}

impl View {
    /// The view's completed-phase mask.
    #[must_use]
    pub fn state(&self) -> State {
        self.state.get()
    }

    /// The currently bound scope, if any.
    #[must_use]
    pub fn scope(&self) -> Option<Rc<Scope>> {
        self.scope.borrow().clone()
    }

    /// The view's node sequence.
    #[must_use]
    pub fn nodes(&self) -> &Rc<dyn NodeSequence> {
        &self.nodes
    }

    /// The lifecycle coordinator whose queues this view joins.
    #[must_use]
    pub fn lifecycle(&self) -> &Rc<Lifecycle> {
        &self.lifecycle
    }

    /// Whether the view has been released for reuse.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.is_free.get()
    }

    /// Record the DOM insertion anchor. Required before mounting.
    pub fn hold(&self, location: Rc<dyn RenderLocation>) {
        *self.location.borrow_mut() = Some(location);
    }

    /// Pin the scope so later binds cannot replace it.
    ///
    /// Used by synthetic root views whose data context is fixed for their
    /// whole lifetime.
    pub fn lock_scope(&self, scope: Rc<Scope>) {
        *self.scope.borrow_mut() = Some(scope);
        self.scope_locked.set(true);
    }

    /// Mark the view free for reuse.
    ///
    /// Returns whether the factory's pool will retain it: a still-attached
    /// view reports the pool's current capacity (the actual return happens
    /// at unmount), a detached view is returned immediately. `false` means
    /// the view is abandoned for collection — not an error.
    pub fn release(&self) -> bool {
        self.is_free.set(true);
        let Some(factory) = self.factory.upgrade() else {
            return false;
        };
        if self.state.get().contains(State::IS_ATTACHED) {
            factory.can_return_to_cache()
        } else {
            match self.weak_self.upgrade() {
                Some(me) => factory.try_return_to_cache(&me),
                None => false,
            }
        }
    }

    /// Out-of-use hook: return a released view to its factory's pool.
    ///
    /// No-op for views that were never released or never pooled.
    pub fn cache(&self) {
        if !self.is_free.get() {
            return;
        }
        if let (Some(factory), Some(me)) = (self.factory.upgrade(), self.weak_self.upgrade()) {
            factory.try_return_to_cache(&me);
        }
    }

    fn reactivate(&self) {
        self.state.set(self.state.get() & !State::IS_CACHED);
        self.is_free.set(false);
    }

    fn prepare_for_cache(&self) {
        self.state.set(State::IS_CACHED);
        self.is_free.set(false);
        self.scope_locked.set(false);
        *self.scope.borrow_mut() = None;
        *self.location.borrow_mut() = None;
    }
}

impl Bindable for View {
    fn bind(&self, flags: LifecycleFlags, scope: &Rc<Scope>) {
        let state = self.state.get();
        if state.contains(State::IS_BOUND) {
            if self.scope_locked.get() {
                return;
            }
            let same = self
                .scope
                .borrow()
                .as_ref()
                .is_some_and(|current| Rc::ptr_eq(current, scope));
            if same {
                return;
            }
            // Different scope instance: rebind.
            self.unbind(flags | LifecycleFlags::FROM_BIND);
        }
        if !self.scope_locked.get() {
            *self.scope.borrow_mut() = Some(Rc::clone(scope));
        }
        let effective = self.scope.borrow().clone().unwrap_or_else(|| Rc::clone(scope));
        self.template.bind_nodes(&self.nodes, &effective, flags);
        self.state.set(self.state.get() | State::IS_BOUND);
    }

    fn unbind(&self, flags: LifecycleFlags) {
        if !self.state.get().contains(State::IS_BOUND) {
            return;
        }
        self.template.unbind_nodes(&self.nodes, flags);
        self.state.set(self.state.get() & !State::IS_BOUND);
    }
}

impl Attachable for View {
    fn attach(&self, _pass: &AttachPass) {
        if self.state.get().contains(State::IS_ATTACHED) {
            return;
        }
        self.state.set(self.state.get() | State::IS_ATTACHED);
        if let Some(me) = self.weak_self.upgrade() {
            self.lifecycle.enqueue_mount(me);
        }
    }

    fn detach(&self, _pass: &DetachPass) {
        if !self.state.get().contains(State::IS_ATTACHED) {
            return;
        }
        self.state.set(self.state.get() & !State::IS_ATTACHED);
        if let Some(me) = self.weak_self.upgrade() {
            self.lifecycle.enqueue_unmount(me);
        }
    }
}

impl Mountable for View {
    fn mount(&self) {
        if self.state.get().contains(State::IS_MOUNTED) {
            return;
        }
        let location = self.location.borrow().clone();
        let Some(location) = location else {
            debug_assert!(false, "mount without a held render location");
            return;
        };
        self.state.set(self.state.get() | State::IS_MOUNTED);
        self.nodes.insert_before(location.as_ref());
    }

    fn unmount(&self) {
        if self.state.get().contains(State::IS_MOUNTED) {
            self.state.set(self.state.get() & !State::IS_MOUNTED);
            self.nodes.remove();
        }
        self.cache();
    }
}

/// Creates views from a template and pools released ones for reuse.
pub struct ViewFactory {
    name: String,
    template: Rc<dyn ViewTemplate>,
    lifecycle: Rc<Lifecycle>,
    cache: RefCell<Vec<Rc<View>>>,
    cache_size: Cell<CacheSize>,
    weak_self: Weak<ViewFactory>,
}

impl ViewFactory {
    /// Create a factory. Pooling starts disabled; see
    /// [`set_cache_size`](Self::set_cache_size).
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        template: Rc<dyn ViewTemplate>,
        lifecycle: &Rc<Lifecycle>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            name: name.into(),
            template,
            lifecycle: Rc::clone(lifecycle),
            cache: RefCell::new(Vec::new()),
            cache_size: Cell::new(CacheSize::None),
            weak_self: weak_self.clone(),
        })
    }

    /// The factory's (template) name, used for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lifecycle coordinator views created here enqueue on.
    #[must_use]
    pub fn lifecycle(&self) -> &Rc<Lifecycle> {
        &self.lifecycle
    }

    /// Current pool capacity configuration.
    #[must_use]
    pub fn cache_size(&self) -> CacheSize {
        self.cache_size.get()
    }

    /// Configure pool capacity.
    ///
    /// With `do_not_override` set, an already-configured capacity wins and
    /// the call is ignored; the first configuration still applies.
    pub fn set_cache_size(&self, size: CacheSize, do_not_override: bool) {
        if self.cache_size.get() == CacheSize::None || !do_not_override {
            self.cache_size.set(size);
        }
    }

    /// Whether the pool currently has room for one more view.
    #[must_use]
    pub fn can_return_to_cache(&self) -> bool {
        self.cache.borrow().len() < self.cache_size.get().capacity()
    }

    /// Return `view` to the pool if there is room.
    ///
    /// On success the view's scope and location are cleared and its state
    /// becomes exactly `IS_CACHED`.
    pub fn try_return_to_cache(&self, view: &Rc<View>) -> bool {
        if !self.can_return_to_cache() {
            return false;
        }
        view.prepare_for_cache();
        self.cache.borrow_mut().push(Rc::clone(view));
        trace!(factory = %self.name, pooled = self.cache.borrow().len(), "view returned to pool");
        true
    }

    /// Number of views currently pooled.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Produce a view: a pooled one if available, else freshly rendered
    /// from the template.
    pub fn create(&self) -> Rc<View> {
        if let Some(view) = self.cache.borrow_mut().pop() {
            view.reactivate();
            trace!(factory = %self.name, "view reused from pool");
            return view;
        }
        let nodes = self.template.create_nodes();
        Rc::new_cyclic(|weak_self| View {
            lifecycle: Rc::clone(&self.lifecycle),
            nodes,
            template: Rc::clone(&self.template),
            state: Cell::new(State::empty()),
            scope: RefCell::new(None),
            scope_locked: Cell::new(false),
            location: RefCell::new(None),
            factory: self.weak_self.clone(),
            is_free: Cell::new(false),
            weak_self: weak_self.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::BindingContext;
    use std::any::Any;

    struct NullSequence;

    impl NodeSequence for NullSequence {
        fn insert_before(&self, _location: &dyn RenderLocation) {}
        fn remove(&self) {}
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct NullTemplate;

    impl ViewTemplate for NullTemplate {
        fn create_nodes(&self) -> Rc<dyn NodeSequence> {
            Rc::new(NullSequence)
        }
    }

    fn factory() -> Rc<ViewFactory> {
        ViewFactory::new("test", Rc::new(NullTemplate), &Lifecycle::new())
    }

    #[test]
    fn cache_size_parses_star_and_numbers() {
        assert_eq!("*".parse::<CacheSize>(), Ok(CacheSize::Unbounded));
        assert_eq!(" 5 ".parse::<CacheSize>(), Ok(CacheSize::Bounded(5)));
        assert_eq!("0".parse::<CacheSize>(), Ok(CacheSize::None));
        assert!("-2".parse::<CacheSize>().is_err());
        assert!("many".parse::<CacheSize>().is_err());
    }

    #[test]
    fn do_not_override_respects_existing_configuration() {
        let f = factory();
        f.set_cache_size(CacheSize::Bounded(2), true);
        assert_eq!(f.cache_size(), CacheSize::Bounded(2));

        f.set_cache_size(CacheSize::Bounded(9), true);
        assert_eq!(f.cache_size(), CacheSize::Bounded(2), "first configuration wins");

        f.set_cache_size(CacheSize::Unbounded, false);
        assert_eq!(f.cache_size(), CacheSize::Unbounded);
    }

    #[test]
    fn release_without_pooling_abandons_the_view() {
        let f = factory();
        let view = f.create();
        assert!(!view.release());
        assert_eq!(f.pooled(), 0);
    }

    #[test]
    fn release_returns_detached_view_to_pool() {
        let f = factory();
        f.set_cache_size(CacheSize::Bounded(1), false);
        let view = f.create();
        assert!(view.release());
        assert_eq!(f.pooled(), 1);
        assert_eq!(view.state(), State::IS_CACHED);
        assert!(view.scope().is_none());
    }

    #[test]
    fn pool_capacity_is_bounded() {
        let f = factory();
        f.set_cache_size(CacheSize::Bounded(1), false);
        let a = f.create();
        let b = f.create();
        assert!(a.release());
        assert!(!b.release(), "pool at capacity");
        assert_eq!(f.pooled(), 1);
    }

    #[test]
    fn locked_scope_survives_binds_with_other_scopes() {
        #[derive(Default)]
        struct ScopeRecordingTemplate {
            bound: RefCell<Vec<Rc<Scope>>>,
        }

        impl ViewTemplate for ScopeRecordingTemplate {
            fn create_nodes(&self) -> Rc<dyn NodeSequence> {
                Rc::new(NullSequence)
            }

            fn bind_nodes(
                &self,
                _nodes: &Rc<dyn NodeSequence>,
                scope: &Rc<Scope>,
                _flags: LifecycleFlags,
            ) {
                self.bound.borrow_mut().push(Rc::clone(scope));
            }
        }

        let template = Rc::new(ScopeRecordingTemplate::default());
        let f = ViewFactory::new(
            "locked",
            Rc::clone(&template) as Rc<dyn ViewTemplate>,
            &Lifecycle::new(),
        );
        f.set_cache_size(CacheSize::Unbounded, false);
        let view = f.create();

        let pinned = Scope::new(BindingContext::new());
        let other = Scope::new(BindingContext::new());
        view.lock_scope(Rc::clone(&pinned));

        view.bind(LifecycleFlags::FROM_BIND, &other);
        assert!(
            view.scope().is_some_and(|s| Rc::ptr_eq(&s, &pinned)),
            "bind cannot replace a locked scope"
        );
        assert!(
            Rc::ptr_eq(&template.bound.borrow()[0], &pinned),
            "template binds against the pinned scope"
        );

        view.bind(LifecycleFlags::FROM_BIND, &other);
        assert_eq!(template.bound.borrow().len(), 1, "rebind while locked is a no-op");
        assert!(view.scope().is_some_and(|s| Rc::ptr_eq(&s, &pinned)));

        // Returning to the pool clears the pin.
        view.unbind(LifecycleFlags::FROM_UNBIND);
        assert!(view.release());
        let reused = f.create();
        assert!(Rc::ptr_eq(&reused, &view));
        reused.bind(LifecycleFlags::FROM_BIND, &other);
        assert!(reused.scope().is_some_and(|s| Rc::ptr_eq(&s, &other)));
        assert!(Rc::ptr_eq(&template.bound.borrow()[1], &other));
    }

    #[test]
    fn create_reuses_pooled_view() {
        let f = factory();
        f.set_cache_size(CacheSize::Unbounded, false);
        let view = f.create();
        let nodes = Rc::clone(view.nodes());
        assert!(view.release());

        let reused = f.create();
        assert!(Rc::ptr_eq(&reused, &view));
        assert!(Rc::ptr_eq(reused.nodes(), &nodes), "node identity is stable");
        assert_eq!(reused.state(), State::empty());
        assert!(!reused.is_free());
    }
}
