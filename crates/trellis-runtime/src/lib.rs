#![forbid(unsafe_code)]

//! View lifecycle coordination and batched change flushing for Trellis.
//!
//! This crate is the ordering and batching engine behind a component tree:
//! it coordinates bind/attach/detach/unbind transitions over nested views
//! and defers DOM mutation onto explicit queues so that state changes land
//! as one ordered flush instead of synchronous churn.
//!
//! - [`ChangeSet`]: collects pending reactions; flushes them as one atomic
//!   batch at an explicit, caller-chosen boundary.
//! - [`Lifecycle`]: paired begin/end bracketed passes per phase, with mount
//!   and unmount queues drained at each pass's `end()`.
//! - [`View`] / [`ViewFactory`]: reusable, poolable units of bound and
//!   attachable DOM content.
//! - [`CompositionCoordinator`]: the single current-view slot per host
//!   location, swapped without violating ordering guarantees.
//! - [`If`] / [`Else`]: the conditional template controllers driving the
//!   coordinator from bound value changes.
//!
//! # Architecture
//!
//! Single-threaded and cooperative: `Rc`/`RefCell`/`Cell` shared ownership,
//! no timers, no hidden microtask loop. "Suspension" means deferral to a
//! later explicit [`ChangeSet::flush_changes`] call. Concrete DOM nodes,
//! binding-expression evaluation, and property observation are external
//! collaborators reached only through the traits in [`dom`] and
//! [`changeset`].
//!
//! # Invariants
//!
//! 1. Within one bracketed pass, participants are processed in add order
//!    (unbind: reverse), so DOM insertion order matches logical attach
//!    order.
//! 2. Mount/unmount side effects are observable only after the owning
//!    pass's `end()`, never at `attach()`/`detach()` call time.
//! 3. N value toggles between flushes coalesce into one swap reflecting
//!    only the final value.

pub mod changeset;
pub mod coordinator;
pub mod dom;
pub mod flags;
pub mod lifecycle;
pub mod scope;
pub mod templating;
pub mod value;
pub mod view;

pub use changeset::{ChangeSet, ChangeTracker};
pub use coordinator::CompositionCoordinator;
pub use dom::{NodeSequence, RenderLocation};
pub use flags::{LifecycleFlags, State};
pub use lifecycle::{
    Attachable, AttachPass, BindPass, Bindable, DetachPass, Lifecycle, Mountable, UnbindPass,
};
pub use scope::{BindingContext, Scope};
pub use templating::{Else, If};
pub use value::BoundValue;
pub use view::{CacheSize, CacheSizeParseError, View, ViewFactory, ViewTemplate};
