#![forbid(unsafe_code)]

//! Lifecycle phase masks.
//!
//! Every lifecycle participant carries a [`State`] mask recording which
//! phases have completed, and every transition carries [`LifecycleFlags`]
//! describing how it should propagate.
//!
//! # Invariants
//!
//! 1. Phase bits are set by the pass that completes the phase and cleared by
//!    its reverse: `IS_BOUND` by bind/unbind, `IS_ATTACHED` by attach/detach,
//!    `IS_MOUNTED` by mount/unmount.
//! 2. `IS_MOUNTED` implies the participant's nodes are in the host tree;
//!    it is only ever flipped while draining a mount or unmount queue.
//! 3. `IS_CACHED` is exclusive with every other bit: a pooled view is
//!    neither bound, attached, nor mounted.

use bitflags::bitflags;

bitflags! {
    /// Completed-phase mask carried by every lifecycle participant.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct State: u8 {
        /// A scope is bound against this participant.
        const IS_BOUND = 1 << 0;
        /// The participant is logically part of the visible tree.
        const IS_ATTACHED = 1 << 1;
        /// The participant's nodes are inserted in the host tree.
        const IS_MOUNTED = 1 << 2;
        /// The view sits in its factory's pool awaiting reuse.
        const IS_CACHED = 1 << 3;
    }
}

bitflags! {
    /// Transition modifiers threaded through lifecycle passes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct LifecycleFlags: u8 {
        /// The transition originates from a bind pass.
        const FROM_BIND = 1 << 0;
        /// The transition originates from an unbind pass.
        const FROM_UNBIND = 1 << 1;
        /// The transition runs inside a `ChangeSet` flush; deferred work
        /// must be applied synchronously instead of re-queued.
        const FROM_FLUSH_CHANGES = 1 << 2;
        /// Participants added to a detach pass are unbound right after the
        /// unmount queue drains, chaining detach into unbind.
        const UNBIND_AFTER_DETACHED = 1 << 3;
    }
}
