use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Bounds every task identifier used by a console has to satisfy.
///
/// Identifiers are opaque: the console only compares, hashes and clones them.
pub trait TaskKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> TaskKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// String identifier of a task or subtask, as carried by build-server notifications
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
