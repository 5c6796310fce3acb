pub mod event;
pub mod task_id;

use crate::impl_case_insensitive_deserialize;
use serde::Serialize;

/// Outcome attached to a finished task or subtask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventResult {
    #[default]
    Success,
    Failure,
    Skipped,
}

impl_case_insensitive_deserialize!(
    EventResult,
    Success => "success",
    Failure => "failure" | "failed",
    Skipped => "skipped"
);

/// Severity of a diagnostic, mirroring the usual build message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Error,
    Warning,
    Info,
}

impl_case_insensitive_deserialize!(
    MessageKind,
    Error => "error",
    Warning => "warning" | "warn",
    Info => "info" | "information"
);

impl EventResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventResult::Success => "success",
            EventResult::Failure => "failure",
            EventResult::Skipped => "skipped",
        }
    }
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Error => "error",
            MessageKind::Warning => "warning",
            MessageKind::Info => "info",
        }
    }
}

// Re-export commonly used types
pub use event::{
    BuildEvent, FileMessageEvent, FinishEvent, OutputEvent, ProgressEvent, StartEvent,
};
pub use task_id::{TaskId, TaskKey};
