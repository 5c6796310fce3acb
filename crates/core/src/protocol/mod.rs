//! Build-server notifications and their translation into console calls

mod listener;

pub use listener::NotificationListener;

use serde::{Deserialize, Serialize};
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::types::{EventResult, MessageKind, TaskId};

/// Completion status reported by the build server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    #[default]
    Ok,
    Error,
    Cancelled,
}

impl StatusCode {
    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(StatusCode::Ok),
            2 => Some(StatusCode::Error),
            3 => Some(StatusCode::Cancelled),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ok" => Some(StatusCode::Ok),
            "error" => Some(StatusCode::Error),
            "cancelled" | "canceled" => Some(StatusCode::Cancelled),
            other => other.parse().ok().and_then(Self::from_code),
        }
    }
}

// The wire form is the integer code; names are accepted for hand-written streams.
impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u64),
            Name(String),
        }

        let status = match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Self::from_code(code),
            Raw::Name(name) => Self::from_name(&name),
        };
        status.ok_or_else(|| {
            serde::de::Error::custom("invalid status code: expected 1, 2, 3, ok, error or cancelled")
        })
    }
}

impl From<StatusCode> for EventResult {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::Ok => EventResult::Success,
            StatusCode::Error => EventResult::Failure,
            StatusCode::Cancelled => EventResult::Skipped,
        }
    }
}

/// One notification of a build-server client, as read from a JSON-lines stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    TaskStart {
        task_id: TaskId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<TaskId>,
        #[serde(default)]
        message: String,
    },
    TaskProgress {
        task_id: TaskId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<TaskId>,
        #[serde(default)]
        message: String,
    },
    TaskFinish {
        task_id: TaskId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<TaskId>,
        #[serde(default)]
        message: String,
        #[serde(default)]
        status: StatusCode,
    },
    Diagnostic {
        task_id: TaskId,
        uri: String,
        line: u32,
        #[serde(default)]
        column: u32,
        message: String,
        severity: MessageKind,
    },
    LogMessage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
        message: String,
    },
}

/// Parses a JSON-lines notification stream. Blank lines are skipped.
pub fn read_notifications(reader: impl BufRead) -> Result<Vec<Notification>> {
    let mut notifications = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let notification = serde_json::from_str(&line)
            .map_err(|e| Error::ParseError(format!("line {}: {e}", index + 1)))?;
        notifications.push(notification);
    }
    Ok(notifications)
}
