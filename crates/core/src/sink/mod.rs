//! Consumers of console events

mod queued;

pub use queued::QueuedSink;

use parking_lot::Mutex;

use crate::types::BuildEvent;

/// Receives every event a console emits, together with the id of the root
/// task the event belongs to.
///
/// Called while the console lock is held: implementations must return quickly
/// and must not call back into the console. Wrap slow sinks in a [`QueuedSink`].
pub trait EventSink<Id>: Send + Sync {
    fn on_event(&self, build_id: &Id, event: BuildEvent<Id>);
}

impl<Id, F> EventSink<Id> for F
where
    F: Fn(&Id, BuildEvent<Id>) + Send + Sync,
{
    fn on_event(&self, build_id: &Id, event: BuildEvent<Id>) {
        self(build_id, event)
    }
}

/// Keeps every received event in memory, in arrival order
#[derive(Debug)]
pub struct RecordingSink<Id> {
    events: Mutex<Vec<(Id, BuildEvent<Id>)>>,
}

impl<Id> Default for RecordingSink<Id> {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl<Id: Clone> RecordingSink<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Id, BuildEvent<Id>)> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<(Id, BuildEvent<Id>)> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl<Id: Clone + Send + Sync> EventSink<Id> for RecordingSink<Id> {
    fn on_event(&self, build_id: &Id, event: BuildEvent<Id>) {
        self.events.lock().push((build_id.clone(), event));
    }
}
