use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::{EventResult, MessageKind};
use crate::console::TaskAction;

/// Normalized event delivered to an [`EventSink`](crate::sink::EventSink)
///
/// Every event is emitted together with the id of the root task it belongs to,
/// so a sink can group subtask events under their build.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent<Id> {
    Start(StartEvent<Id>),
    Progress(ProgressEvent<Id>),
    Finish(FinishEvent<Id>),
    FileMessage(FileMessageEvent<Id>),
    Output(OutputEvent<Id>),
}

/// A root task appeared in the console
#[derive(Debug, Clone, Serialize)]
pub struct StartEvent<Id> {
    pub id: Id,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub base_path: PathBuf,
    pub activate_tool_window: bool,
    /// Re-run affordance first, then the stop affordance
    pub actions: Vec<TaskAction>,
}

/// A subtask started under `parent_id`
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent<Id> {
    pub id: Id,
    pub parent_id: Id,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinishEvent<Id> {
    pub id: Id,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub result: EventResult,
}

/// Diagnostic pinned to a file position; `line` and `column` are zero-based
#[derive(Debug, Clone, Serialize)]
pub struct FileMessageEvent<Id> {
    pub id: Id,
    pub severity: MessageKind,
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Console output; `id` is `None` when the text belongs to the root task itself
#[derive(Debug, Clone, Serialize)]
pub struct OutputEvent<Id> {
    pub id: Option<Id>,
    pub message: String,
    pub stdout: bool,
}

impl<Id> BuildEvent<Id> {
    /// The task or subtask the event is about, if it names one
    pub fn id(&self) -> Option<&Id> {
        match self {
            BuildEvent::Start(event) => Some(&event.id),
            BuildEvent::Progress(event) => Some(&event.id),
            BuildEvent::Finish(event) => Some(&event.id),
            BuildEvent::FileMessage(event) => Some(&event.id),
            BuildEvent::Output(event) => event.id.as_ref(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            BuildEvent::Start(_) => "start",
            BuildEvent::Progress(_) => "progress",
            BuildEvent::Finish(_) => "finish",
            BuildEvent::FileMessage(_) => "file_message",
            BuildEvent::Output(_) => "output",
        }
    }
}
