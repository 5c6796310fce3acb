use tracing::debug;

use super::Notification;
use crate::console::{TaskActions, TaskConsole};
use crate::types::{EventResult, TaskId};
use crate::utils::is_blank;

/// Drives a [`TaskConsole`] from build-server notifications.
///
/// Notifications without a parent open and close root tasks; notifications
/// with a parent become subtasks of it.
pub struct NotificationListener<'a> {
    console: &'a TaskConsole<TaskId>,
    actions: TaskActions,
}

impl<'a> NotificationListener<'a> {
    pub fn new(console: &'a TaskConsole<TaskId>) -> Self {
        Self {
            console,
            actions: TaskActions::default(),
        }
    }

    /// Callbacks attached to every root task this listener starts
    pub fn with_actions(mut self, actions: TaskActions) -> Self {
        self.actions = actions;
        self
    }

    pub fn handle(&self, notification: Notification) {
        match notification {
            Notification::TaskStart {
                task_id,
                parent_id: None,
                message,
            } => {
                let title = if is_blank(&message) {
                    task_id.to_string()
                } else {
                    message.clone()
                };
                self.console
                    .start_task(task_id, &title, &message, self.actions.clone());
            }
            Notification::TaskStart {
                task_id,
                parent_id: Some(parent_id),
                message,
            } => self.console.start_subtask(parent_id, task_id, &message),
            Notification::TaskProgress {
                task_id, message, ..
            } => {
                if !message.is_empty() {
                    self.console.add_message(&task_id, &message);
                }
            }
            Notification::TaskFinish {
                task_id,
                parent_id,
                message,
                status,
            } => {
                let result = EventResult::from(status);
                match parent_id {
                    None => self.console.finish_task(&task_id, &message, result),
                    Some(_) => self.console.finish_subtask(&task_id, &message, result),
                }
            }
            Notification::Diagnostic {
                task_id,
                uri,
                line,
                column,
                message,
                severity,
            } => self
                .console
                .add_diagnostic_message(&task_id, &uri, line, column, &message, severity),
            Notification::LogMessage {
                task_id: Some(task_id),
                message,
            } => self.console.add_message(&task_id, &message),
            Notification::LogMessage {
                task_id: None,
                message,
            } => self.console.add_latest_message(&message),
        }
    }

    pub fn replay(&self, notifications: impl IntoIterator<Item = Notification>) {
        let mut count = 0usize;
        for notification in notifications {
            self.handle(notification);
            count += 1;
        }
        debug!("Replayed {} notifications", count);
    }
}
