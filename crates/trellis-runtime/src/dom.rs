#![forbid(unsafe_code)]

//! External DOM collaborator contracts.
//!
//! The lifecycle core never creates or mutates real nodes; it drives an
//! external node implementation through these two traits. The harness crate
//! provides an in-memory implementation for tests.
//!
//! # Contracts
//!
//! - [`NodeSequence::insert_before`] is only safe to call when the sequence
//!   is not currently inserted; [`NodeSequence::remove`] leaves the sequence
//!   detachable for later reinsertion. The mount/unmount queues uphold this
//!   by never double-enqueueing a participant.
//! - A [`RenderLocation`] is an opaque anchor (typically a comment or
//!   placeholder node) before which views insert themselves. The core never
//!   creates, destroys, or inspects the anchor.

use std::any::Any;

/// An opaque DOM anchor marking where a view's content is inserted.
///
/// Implementations expose themselves through [`as_any`](Self::as_any) so a
/// matching [`NodeSequence`] implementation can downcast; the lifecycle core
/// only passes the anchor through.
pub trait RenderLocation {
    /// The concrete anchor, for collaborator downcasts.
    fn as_any(&self) -> &dyn Any;
}

/// A movable DOM fragment owned by a view.
pub trait NodeSequence {
    /// Insert the sequence's nodes before `location`.
    ///
    /// Only valid while the sequence is not inserted.
    fn insert_before(&self, location: &dyn RenderLocation);

    /// Remove the sequence's nodes from the tree, keeping them reusable.
    fn remove(&self);

    /// The concrete sequence, for collaborator downcasts.
    fn as_any(&self) -> &dyn Any;
}
