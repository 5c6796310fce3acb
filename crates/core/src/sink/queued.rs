use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use super::EventSink;
use crate::error::Result;
use crate::types::BuildEvent;

type Envelope<Id> = (Id, BuildEvent<Id>);

/// Moves delivery to a slow sink off the console lock.
///
/// Events are handed to a dedicated worker thread over a channel and delivered
/// to the inner sink in the order they were emitted. Dropping the queue waits
/// until every pending event has been delivered.
pub struct QueuedSink<Id: Send + 'static> {
    sender: Option<Sender<Envelope<Id>>>,
    worker: Option<JoinHandle<()>>,
}

impl<Id: Send + 'static> QueuedSink<Id> {
    pub fn new(inner: Arc<dyn EventSink<Id>>) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Envelope<Id>>();
        let worker = thread::Builder::new()
            .name("bsp-console-events".to_string())
            .spawn(move || {
                for (build_id, event) in receiver {
                    inner.on_event(&build_id, event);
                }
                debug!("Event queue drained");
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }
}

impl<Id: Clone + Send + Sync + 'static> EventSink<Id> for QueuedSink<Id> {
    fn on_event(&self, build_id: &Id, event: BuildEvent<Id>) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send((build_id.clone(), event)).is_err() {
            warn!("Event queue worker is gone, dropping event");
        }
    }
}

impl<Id: Send + 'static> Drop for QueuedSink<Id> {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Event queue worker panicked");
            }
        }
    }
}
