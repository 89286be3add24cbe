#![forbid(unsafe_code)]

//! Event-recording lifecycle participant.
//!
//! [`RecordingParticipant`] implements every lifecycle trait and appends a
//! `label:event` line to a shared log for each effective transition, so
//! pass-ordering tests can assert the exact sequence. Redundant calls (a
//! second attach, unbinding while unbound) are guarded no-ops and leave no
//! log entry.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use trellis_runtime::flags::{LifecycleFlags, State};
use trellis_runtime::lifecycle::{
    AttachPass, Attachable, Bindable, DetachPass, Lifecycle, Mountable,
};
use trellis_runtime::scope::Scope;

/// Shared, ordered record of lifecycle events.
pub type EventLog = Rc<RefCell<Vec<String>>>;

/// Create an empty [`EventLog`].
#[must_use]
pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A lifecycle participant that records its transitions.
pub struct RecordingParticipant {
    label: &'static str,
    lifecycle: Rc<Lifecycle>,
    state: Cell<State>,
    log: EventLog,
    weak_self: Weak<RecordingParticipant>,
}

impl RecordingParticipant {
    /// Create a participant writing to `log` under `label`.
    #[must_use]
    pub fn new(label: &'static str, lifecycle: &Rc<Lifecycle>, log: &EventLog) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            label,
            lifecycle: Rc::clone(lifecycle),
            state: Cell::new(State::empty()),
            log: Rc::clone(log),
            weak_self: weak_self.clone(),
        })
    }

    /// The participant's completed-phase mask.
    #[must_use]
    pub fn state(&self) -> State {
        self.state.get()
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{event}", self.label));
    }
}

impl Bindable for RecordingParticipant {
    fn bind(&self, _flags: LifecycleFlags, _scope: &Rc<Scope>) {
        if self.state.get().contains(State::IS_BOUND) {
            return;
        }
        self.state.set(self.state.get() | State::IS_BOUND);
        self.record("bind");
    }

    fn unbind(&self, _flags: LifecycleFlags) {
        if !self.state.get().contains(State::IS_BOUND) {
            return;
        }
        self.state.set(self.state.get() & !State::IS_BOUND);
        self.record("unbind");
    }
}

impl Attachable for RecordingParticipant {
    fn attach(&self, _pass: &AttachPass) {
        if self.state.get().contains(State::IS_ATTACHED) {
            return;
        }
        self.state.set(self.state.get() | State::IS_ATTACHED);
        self.record("attach");
        if let Some(me) = self.weak_self.upgrade() {
            self.lifecycle.enqueue_mount(me);
        }
    }

    fn detach(&self, _pass: &DetachPass) {
        if !self.state.get().contains(State::IS_ATTACHED) {
            return;
        }
        self.state.set(self.state.get() & !State::IS_ATTACHED);
        self.record("detach");
        if let Some(me) = self.weak_self.upgrade() {
            self.lifecycle.enqueue_unmount(me);
        }
    }
}

impl Mountable for RecordingParticipant {
    fn mount(&self) {
        self.state.set(self.state.get() | State::IS_MOUNTED);
        self.record("mount");
    }

    fn unmount(&self) {
        self.state.set(self.state.get() & !State::IS_MOUNTED);
        self.record("unmount");
    }
}
