#![forbid(unsafe_code)]

//! Test harness for the Trellis runtime.
//!
//! Provides the collaborators the runtime treats as external: an in-memory
//! node tree ([`dom`]), a scope-driven text template ([`template`]), an
//! event-recording lifecycle participant ([`recorder`]), pre-wired
//! conditional-controller fixtures ([`hydrate`]), and proptest strategies
//! over bound values ([`strategies`]).
//!
//! Everything here is deterministic and single-threaded, matching the
//! runtime's own execution model, so ordering assertions in tests are
//! exact rather than eventually-consistent.

pub mod dom;
pub mod hydrate;
pub mod recorder;
pub mod strategies;
pub mod template;

pub use dom::{TestNode, TestNodeSequence, TestRenderLocation};
pub use hydrate::{hydrate_if, hydrate_if_else, item_scope, IfFixture};
pub use recorder::{event_log, EventLog, RecordingParticipant};
pub use template::TextTemplate;
