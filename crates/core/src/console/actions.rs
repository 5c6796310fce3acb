//! Stop and re-run affordances attached to a started task

use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, Weak};

use super::registry::Registry;
use crate::types::TaskKey;

/// Callback invoked when an affordance is performed
pub type Callback = Arc<dyn Fn() + Send + Sync>;

type EnabledCheck = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Stop,
    Reload,
    Rebuild,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Stop => "Stop",
            ActionKind::Reload => "Reload",
            ActionKind::Rebuild => "Rebuild",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActionKind::Stop => "disconnect",
            ActionKind::Reload => "reload",
            ActionKind::Rebuild => "compile",
        }
    }
}

/// Caller-supplied callbacks for the affordances of a new task
#[derive(Clone, Default)]
pub struct TaskActions {
    pub(crate) cancel: Option<Callback>,
    pub(crate) redo: Option<Callback>,
}

impl TaskActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cancel(mut self, cancel: impl Fn() + Send + Sync + 'static) -> Self {
        self.cancel = Some(Arc::new(cancel));
        self
    }

    pub fn on_redo(mut self, redo: impl Fn() + Send + Sync + 'static) -> Self {
        self.redo = Some(Arc::new(redo));
        self
    }
}

impl fmt::Debug for TaskActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskActions")
            .field("cancel", &self.cancel.is_some())
            .field("redo", &self.redo.is_some())
            .finish()
    }
}

/// A button-like affordance whose enabled state follows the live console.
///
/// Performing an action never mutates the console: stopping the underlying
/// work is up to the callback.
#[derive(Clone)]
pub struct TaskAction {
    kind: ActionKind,
    enabled: EnabledCheck,
    callback: Option<Callback>,
}

impl TaskAction {
    /// Enabled while `task_id` is still running.
    pub(crate) fn stop<Id: TaskKey>(
        state: Weak<Mutex<Registry<Id>>>,
        task_id: Id,
        callback: Option<Callback>,
    ) -> Self {
        let enabled = move || {
            state
                .upgrade()
                .is_some_and(|state| state.lock().is_in_progress(&task_id))
        };
        Self {
            kind: ActionKind::Stop,
            enabled: Arc::new(enabled),
            callback,
        }
    }

    /// Enabled only while nothing is running in the console.
    pub(crate) fn when_idle<Id: TaskKey>(
        kind: ActionKind,
        state: Weak<Mutex<Registry<Id>>>,
        callback: Option<Callback>,
    ) -> Self {
        let enabled = move || {
            state
                .upgrade()
                .is_some_and(|state| !state.lock().has_tasks_in_progress())
        };
        Self {
            kind,
            enabled: Arc::new(enabled),
            callback,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn icon(&self) -> &'static str {
        self.kind.icon()
    }

    /// Locks the console briefly; must not be called from inside a sink callback.
    pub fn is_enabled(&self) -> bool {
        (self.enabled)()
    }

    /// Runs the callback if the action is currently enabled.
    /// Returns whether a callback ran.
    pub fn perform(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match &self.callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskAction")
            .field("kind", &self.kind)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl Serialize for TaskAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.kind.serialize(serializer)
    }
}
