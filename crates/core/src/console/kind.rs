use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use super::actions::{ActionKind, Callback, TaskAction};
use super::registry::Registry;
use crate::types::TaskKey;

/// Flavour of a console, deciding which re-run affordance a started task gets
#[derive(Clone)]
pub enum ConsoleKind {
    /// Project synchronization: "Reload", falling back to `default_reload`
    /// when the caller supplies no re-run callback.
    Sync { default_reload: Callback },
    /// Builds: "Rebuild", which only ever runs the caller's callback.
    Build,
}

impl ConsoleKind {
    pub fn sync(default_reload: impl Fn() + Send + Sync + 'static) -> Self {
        ConsoleKind::Sync {
            default_reload: Arc::new(default_reload),
        }
    }

    pub fn build() -> Self {
        ConsoleKind::Build
    }

    pub fn redo_kind(&self) -> ActionKind {
        match self {
            ConsoleKind::Sync { .. } => ActionKind::Reload,
            ConsoleKind::Build => ActionKind::Rebuild,
        }
    }

    pub(crate) fn redo_action<Id: TaskKey>(
        &self,
        state: Weak<Mutex<Registry<Id>>>,
        redo: Option<Callback>,
    ) -> TaskAction {
        let callback = match self {
            ConsoleKind::Sync { default_reload } => {
                Some(redo.unwrap_or_else(|| Arc::clone(default_reload)))
            }
            ConsoleKind::Build => redo,
        };
        TaskAction::when_idle(self.redo_kind(), state, callback)
    }
}

impl fmt::Debug for ConsoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleKind::Sync { .. } => f.write_str("Sync"),
            ConsoleKind::Build => f.write_str("Build"),
        }
    }
}
