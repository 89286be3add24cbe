#![forbid(unsafe_code)]

//! Batched reactive change queue.
//!
//! A [`ChangeSet`] collects pending reactions ([`ChangeTracker`]s) and runs
//! them as one atomic batch when the caller decides a flush boundary has
//! been reached. There is no hidden timer or microtask loop; flush timing is
//! always explicit, which keeps the core deterministic and testable.
//!
//! # Invariants
//!
//! 1. Duplicate enqueue of the same tracker (pointer identity) within one
//!    pending batch coalesces; `size` counts distinct pending reactions.
//! 2. Reactions run in enqueue order. Reactions enqueued *during* a flush
//!    land in the next generation and never run re-entrantly in the same
//!    call.
//! 3. A flush removes each reaction from the queue before invoking it, so a
//!    panicking reaction aborts the batch while every not-yet-run reaction
//!    stays pending for the next flush. At-least-once-attempt, not atomic.
//!
//! # Failure Modes
//!
//! - Reaction panic: propagates to the `flush_changes` caller; already
//!   applied side effects are not rolled back.
//! - Re-entrant `flush_changes` from inside a reaction: rejected as a no-op
//!   (logged). Flushing while flushing would corrupt batch boundaries.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

/// A pending reaction to a batched state change.
///
/// Implementors are enqueued on a [`ChangeSet`] by the observer layer and
/// called back exactly once per batch they are pending in.
pub trait ChangeTracker {
    /// Apply the tracked change. Runs inside a flush, so any further
    /// lifecycle work must honor `FROM_FLUSH_CHANGES` semantics.
    fn flush_changes(&self);
}

/// Collects pending reactions and flushes them as one ordered batch.
pub struct ChangeSet {
    pending: RefCell<VecDeque<Rc<dyn ChangeTracker>>>,
    flushing: Cell<bool>,
}

impl ChangeSet {
    /// Create an empty change set.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            pending: RefCell::new(VecDeque::new()),
            flushing: Cell::new(false),
        })
    }

    /// Queue a reaction for the next flush.
    ///
    /// Enqueueing a tracker that is already pending is a no-op, so any
    /// number of changes between flushes collapse into a single reaction.
    pub fn enqueue(&self, tracker: Rc<dyn ChangeTracker>) {
        let mut pending = self.pending.borrow_mut();
        if pending.iter().any(|t| Rc::ptr_eq(t, &tracker)) {
            return;
        }
        pending.push_back(tracker);
        trace!(size = pending.len(), "change tracker enqueued");
    }

    /// Number of distinct pending reactions.
    #[must_use]
    pub fn size(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run all currently pending reactions in enqueue order.
    ///
    /// Reactions enqueued while the flush runs are deferred to the next
    /// call. A panicking reaction aborts the batch; reactions it did not
    /// reach remain pending.
    pub fn flush_changes(&self) {
        if self.flushing.get() {
            trace!("re-entrant flush rejected");
            return;
        }
        self.flushing.set(true);
        let _guard = FlushGuard(&self.flushing);

        // Bound the drain to the generation that was pending when the flush
        // began; anything enqueued by a reaction stays for the next flush.
        let generation = self.pending.borrow().len();
        trace!(generation, "flushing changes");
        for _ in 0..generation {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(tracker) => tracker.flush_changes(),
                None => break,
            }
        }
    }
}

/// Clears the flushing flag even when a reaction panics.
struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
