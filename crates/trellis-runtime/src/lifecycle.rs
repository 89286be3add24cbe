#![forbid(unsafe_code)]

//! Ordered lifecycle passes over a tree of participants.
//!
//! The [`Lifecycle`] coordinator runs paired begin/end bracketed passes for
//! each phase. Binds run in enqueue (tree-walk) order so parent state exists
//! before children read it; unbinds run in reverse so children never touch
//! torn-down parent state. Attach and detach mark participants synchronously
//! but defer the actual DOM work onto the coordinator's mount and unmount
//! queues, which drain at the pass's `end()` — DOM insertion order therefore
//! matches logical attach order.
//!
//! # Invariants
//!
//! 1. Within one bracketed pass, participants are processed in exactly the
//!    order they were added (unbind: reverse of its own bracket's order).
//! 2. A participant appears at most once per queue. Double-enqueue is a
//!    programmer error: `debug_assert!` in debug builds, defensively
//!    skipped in release builds. This choice is applied consistently.
//! 3. Mount and unmount side effects happen only while a pass's `end()`
//!    drains its queue, never at `attach()`/`detach()` call time.
//!
//! # Failure Modes
//!
//! - Attaching an already-attached participant: safe no-op (participants
//!   guard their own state).
//! - Unbinding a never-bound participant: safe no-op.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::changeset::ChangeSet;
use crate::dom::RenderLocation;
use crate::flags::LifecycleFlags;
use crate::scope::Scope;

/// A participant in bind/unbind passes.
pub trait Bindable {
    /// Associate the participant with `scope`.
    ///
    /// Binding while already bound with the identical scope is a no-op;
    /// a different scope instance rebinds.
    fn bind(&self, flags: LifecycleFlags, scope: &Rc<Scope>);

    /// Dissociate from the current scope. Safe no-op when never bound.
    fn unbind(&self, flags: LifecycleFlags);
}

/// A participant in attach/detach passes.
pub trait Attachable: Bindable {
    /// Mark the participant attached and enqueue its mounts on the pass's
    /// lifecycle. DOM insertion is deferred to the pass's `end()`.
    fn attach(&self, pass: &AttachPass);

    /// Mark the participant detached and enqueue its unmounts.
    fn detach(&self, pass: &DetachPass);
}

/// A queue entry capable of actual DOM insertion and removal.
pub trait Mountable {
    /// Insert the participant's nodes before its held location.
    fn mount(&self);

    /// Remove the participant's nodes from the tree.
    fn unmount(&self);
}

/// Coordinates ordered lifecycle passes and owns the mount/unmount queues.
pub struct Lifecycle {
    mount_queue: RefCell<Vec<Rc<dyn Mountable>>>,
    unmount_queue: RefCell<Vec<Rc<dyn Mountable>>>,
    weak_self: Weak<Lifecycle>,
}

impl Lifecycle {
    /// Create a coordinator with empty queues.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            mount_queue: RefCell::new(Vec::new()),
            unmount_queue: RefCell::new(Vec::new()),
            weak_self: weak_self.clone(),
        })
    }

    /// Begin a bind pass. Participants bind in add order at `end()`.
    pub fn begin_bind(&self, flags: LifecycleFlags, scope: &Rc<Scope>) -> BindPass {
        BindPass {
            flags,
            scope: Rc::clone(scope),
            items: RefCell::new(Vec::new()),
        }
    }

    /// Begin an unbind pass. Participants unbind in reverse add order at
    /// `end()`.
    pub fn begin_unbind(&self, flags: LifecycleFlags) -> UnbindPass {
        UnbindPass {
            flags,
            items: RefCell::new(Vec::new()),
        }
    }

    /// Begin an attach pass. `host` is an opaque anchor context handed
    /// through to participants; the coordinator does not inspect it.
    pub fn begin_attach(
        &self,
        change_set: &Rc<ChangeSet>,
        host: Option<Rc<dyn RenderLocation>>,
        flags: LifecycleFlags,
    ) -> AttachPass {
        AttachPass {
            lifecycle: self.weak_self.clone(),
            change_set: Rc::clone(change_set),
            host,
            flags,
        }
    }

    /// Begin a detach pass.
    pub fn begin_detach(&self, change_set: &Rc<ChangeSet>, flags: LifecycleFlags) -> DetachPass {
        DetachPass {
            lifecycle: self.weak_self.clone(),
            change_set: Rc::clone(change_set),
            flags,
            unbind_after: RefCell::new(Vec::new()),
        }
    }

    /// Queue a single participant for mounting at the enclosing pass's
    /// `end()`.
    ///
    /// Double-enqueue of the same participant is a programmer error; see
    /// the module docs for the debug/release policy.
    pub fn enqueue_mount(&self, item: Rc<dyn Mountable>) {
        let mut queue = self.mount_queue.borrow_mut();
        if queue.iter().any(|m| Rc::ptr_eq(m, &item)) {
            debug_assert!(false, "participant already queued for mount");
            return;
        }
        queue.push(item);
    }

    /// Queue a single participant for unmounting at the enclosing pass's
    /// `end()`.
    pub fn enqueue_unmount(&self, item: Rc<dyn Mountable>) {
        let mut queue = self.unmount_queue.borrow_mut();
        if queue.iter().any(|m| Rc::ptr_eq(m, &item)) {
            debug_assert!(false, "participant already queued for unmount");
            return;
        }
        queue.push(item);
    }

    /// Number of participants awaiting mount.
    #[must_use]
    pub fn queued_mounts(&self) -> usize {
        self.mount_queue.borrow().len()
    }

    /// Number of participants awaiting unmount.
    #[must_use]
    pub fn queued_unmounts(&self) -> usize {
        self.unmount_queue.borrow().len()
    }

    fn process_mount_queue(&self) {
        let items = self.mount_queue.take();
        trace!(count = items.len(), "draining mount queue");
        for item in items {
            item.mount();
        }
    }

    fn process_unmount_queue(&self) {
        let items = self.unmount_queue.take();
        trace!(count = items.len(), "draining unmount queue");
        for item in items {
            item.unmount();
        }
    }
}

/// Bracketed bind pass. Dropping without `end()` discards the bracket.
pub struct BindPass {
    flags: LifecycleFlags,
    scope: Rc<Scope>,
    items: RefCell<Vec<Rc<dyn Bindable>>>,
}

impl BindPass {
    /// Add a participant. Binds run at `end()` in add order.
    pub fn add(&self, item: &Rc<dyn Bindable>) -> &Self {
        self.items.borrow_mut().push(Rc::clone(item));
        self
    }

    /// Run `bind` on every added participant in add order.
    pub fn end(self) {
        let items = self.items.take();
        trace!(count = items.len(), "bind pass end");
        for item in &items {
            item.bind(self.flags, &self.scope);
        }
    }
}

/// Bracketed unbind pass; participants unbind in reverse add order.
pub struct UnbindPass {
    flags: LifecycleFlags,
    items: RefCell<Vec<Rc<dyn Bindable>>>,
}

impl UnbindPass {
    /// Add a participant. Unbinds run at `end()` in reverse add order.
    pub fn add(&self, item: &Rc<dyn Bindable>) -> &Self {
        self.items.borrow_mut().push(Rc::clone(item));
        self
    }

    /// Run `unbind` on every added participant, children before parents.
    pub fn end(self) {
        let items = self.items.take();
        trace!(count = items.len(), "unbind pass end");
        for item in items.iter().rev() {
            item.unbind(self.flags);
        }
    }
}

/// Bracketed attach pass; `end()` drains the mount queue.
pub struct AttachPass {
    lifecycle: Weak<Lifecycle>,
    change_set: Rc<ChangeSet>,
    host: Option<Rc<dyn RenderLocation>>,
    flags: LifecycleFlags,
}

impl AttachPass {
    /// Attach a participant: it marks itself attached and enqueues its
    /// mounts via [`Lifecycle::enqueue_mount`].
    pub fn add(&self, item: &Rc<dyn Attachable>) -> &Self {
        item.attach(self);
        self
    }

    /// The change set driving this pass.
    #[must_use]
    pub fn change_set(&self) -> &Rc<ChangeSet> {
        &self.change_set
    }

    /// The opaque host anchor context, if the caller supplied one.
    #[must_use]
    pub fn host(&self) -> Option<&Rc<dyn RenderLocation>> {
        self.host.as_ref()
    }

    /// The pass flags.
    #[must_use]
    pub fn flags(&self) -> LifecycleFlags {
        self.flags
    }

    /// Drain the mount queue, inserting nodes in enqueue order.
    pub fn end(self) {
        if let Some(lifecycle) = self.lifecycle.upgrade() {
            lifecycle.process_mount_queue();
        }
    }
}

/// Bracketed detach pass; `end()` drains the unmount queue and then runs
/// any unbind-after-detach chain.
pub struct DetachPass {
    lifecycle: Weak<Lifecycle>,
    change_set: Rc<ChangeSet>,
    flags: LifecycleFlags,
    unbind_after: RefCell<Vec<Rc<dyn Attachable>>>,
}

impl DetachPass {
    /// Detach a participant: it marks itself detached and enqueues its
    /// unmounts. With [`LifecycleFlags::UNBIND_AFTER_DETACHED`] set, the
    /// participant is also queued for unbind once the unmount drain is
    /// done.
    pub fn add(&self, item: &Rc<dyn Attachable>) -> &Self {
        item.detach(self);
        if self.flags.contains(LifecycleFlags::UNBIND_AFTER_DETACHED) {
            self.unbind_after.borrow_mut().push(Rc::clone(item));
        }
        self
    }

    /// The change set driving this pass.
    #[must_use]
    pub fn change_set(&self) -> &Rc<ChangeSet> {
        &self.change_set
    }

    /// The pass flags.
    #[must_use]
    pub fn flags(&self) -> LifecycleFlags {
        self.flags
    }

    /// Drain the unmount queue, then unbind participants queued by the
    /// `UNBIND_AFTER_DETACHED` chain, in add order.
    pub fn end(self) {
        if let Some(lifecycle) = self.lifecycle.upgrade() {
            lifecycle.process_unmount_queue();
        }
        let unbind_after = self.unbind_after.take();
        for item in &unbind_after {
            item.unbind(self.flags | LifecycleFlags::FROM_UNBIND);
        }
    }
}
