//! Task console: a task tree state machine feeding an event sink
//!
//! Every public method takes the same lock for its whole duration, including
//! the call into the sink, so events leave the console in call order and no
//! caller ever observes a half-applied update. Invalid calls (unknown ids,
//! duplicate starts, blank messages) are dropped silently.

mod actions;
mod kind;
mod registry;

pub use actions::{ActionKind, Callback, TaskAction, TaskActions};
pub use kind::ConsoleKind;

use chrono::Utc;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::ConsoleConfig;
use crate::sink::EventSink;
use crate::types::{
    BuildEvent, EventResult, FileMessageEvent, FinishEvent, MessageKind, OutputEvent,
    ProgressEvent, StartEvent, TaskId, TaskKey,
};
use crate::utils::{file_uri_to_path, is_blank, terminate_line};
use registry::Registry;

pub const DEFAULT_TITLE_PREFIX: &str = "BSP";

pub struct TaskConsole<Id = TaskId> {
    state: Arc<Mutex<Registry<Id>>>,
    sink: Arc<dyn EventSink<Id>>,
    base_path: PathBuf,
    title_prefix: String,
    activate_tool_window: bool,
    kind: ConsoleKind,
}

impl<Id: TaskKey> TaskConsole<Id> {
    pub fn new(sink: Arc<dyn EventSink<Id>>, base_path: impl Into<PathBuf>, kind: ConsoleKind) -> Self {
        Self {
            state: Arc::new(Mutex::new(Registry::default())),
            sink,
            base_path: base_path.into(),
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            activate_tool_window: true,
            kind,
        }
    }

    /// Console for project synchronization, re-run as "Reload"
    pub fn sync(
        sink: Arc<dyn EventSink<Id>>,
        base_path: impl Into<PathBuf>,
        default_reload: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self::new(sink, base_path, ConsoleKind::sync(default_reload))
    }

    /// Console for builds, re-run as "Rebuild"
    pub fn build(sink: Arc<dyn EventSink<Id>>, base_path: impl Into<PathBuf>) -> Self {
        Self::new(sink, base_path, ConsoleKind::build())
    }

    /// Applies title prefix and tool window behaviour from a config file.
    /// The config's base path wins over the one given at construction.
    pub fn with_config(mut self, config: &ConsoleConfig) -> Self {
        self.title_prefix = config.title_prefix.clone();
        self.activate_tool_window = config.activate_tool_window;
        if let Some(base_path) = &config.base_path {
            self.base_path = base_path.clone();
        }
        self
    }

    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn kind(&self) -> &ConsoleKind {
        &self.kind
    }

    /// Displays the start of a task.
    ///
    /// Does nothing if a task with the same id is already running.
    pub fn start_task(&self, task_id: Id, title: &str, message: &str, actions: TaskActions) {
        let mut state = self.state.lock();
        if !state.start_task(task_id.clone()) {
            debug!("Ignoring start of already running task {:?}", task_id);
            return;
        }

        let redo = self
            .kind
            .redo_action(Arc::downgrade(&self.state), actions.redo);
        let stop = TaskAction::stop(Arc::downgrade(&self.state), task_id.clone(), actions.cancel);

        let event = StartEvent {
            id: task_id.clone(),
            title: format!("{}: {}", self.title_prefix, title),
            message: message.to_string(),
            timestamp: Utc::now(),
            base_path: self.base_path.clone(),
            activate_tool_window: self.activate_tool_window,
            actions: vec![redo, stop],
        };
        debug!("Started task {:?}", task_id);
        self.sink.on_event(&task_id, BuildEvent::Start(event));
    }

    pub fn has_tasks_in_progress(&self) -> bool {
        self.state.lock().has_tasks_in_progress()
    }

    pub fn is_task_in_progress(&self, task_id: &Id) -> bool {
        self.state.lock().is_in_progress(task_id)
    }

    /// Snapshot of the running tasks, in start order
    pub fn tasks_in_progress(&self) -> Vec<Id> {
        self.state.lock().task_ids()
    }

    /// Snapshot of the registered subtasks, in start order
    pub fn active_subtasks(&self) -> Vec<Id> {
        self.state.lock().subtask_ids()
    }

    /// Displays the finish of a task; all of its subtasks are dropped with it.
    ///
    /// Does nothing if the task is not running.
    pub fn finish_task(&self, task_id: &Id, message: &str, result: EventResult) {
        let mut state = self.state.lock();
        if !state.finish_task(task_id) {
            debug!("Ignoring finish of task {:?} which is not running", task_id);
            return;
        }

        let event = FinishEvent {
            id: task_id.clone(),
            message: message.to_string(),
            timestamp: Utc::now(),
            result,
        };
        self.sink.on_event(task_id, BuildEvent::Finish(event));
    }

    /// Displays the start of a subtask under `parent_task_id`, which may be a
    /// task or another subtask.
    ///
    /// `subtask_id` has to be unique among all running subtasks of this console.
    pub fn start_subtask(&self, parent_task_id: Id, subtask_id: Id, message: &str) {
        let mut state = self.state.lock();
        let root_task = state.root_for_parent(&parent_task_id).clone();
        if !state.is_in_progress(&root_task) {
            debug!(
                "Ignoring subtask {:?}: root task {:?} is not running",
                subtask_id, root_task
            );
            return;
        }

        state.insert_subtask(subtask_id.clone(), root_task.clone(), parent_task_id.clone());
        let event = ProgressEvent {
            id: subtask_id,
            parent_id: parent_task_id,
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        self.sink.on_event(&root_task, BuildEvent::Progress(event));
    }

    /// Displays the finish of a subtask. Its descendants are dropped silently,
    /// only the named subtask gets a finish event.
    pub fn finish_subtask(&self, subtask_id: &Id, message: &str, result: EventResult) {
        let mut state = self.state.lock();
        let Some(root_task) = state
            .subtask(subtask_id)
            .map(|parents| parents.root_task.clone())
        else {
            debug!("Ignoring finish of unknown subtask {:?}", subtask_id);
            return;
        };
        if !state.is_in_progress(&root_task) {
            return;
        }

        state.remove_subtree(subtask_id);
        let event = FinishEvent {
            id: subtask_id.clone(),
            message: message.to_string(),
            timestamp: Utc::now(),
            result,
        };
        self.sink.on_event(&root_task, BuildEvent::Finish(event));
    }

    /// Adds a diagnostic to a task or subtask.
    ///
    /// `file_uri` is a `file://` URI or an absolute path; `line` and `column`
    /// are zero-based.
    pub fn add_diagnostic_message(
        &self,
        task_id: &Id,
        file_uri: &str,
        line: u32,
        column: u32,
        message: &str,
        severity: MessageKind,
    ) {
        let state = self.state.lock();
        let Some(root_task) = self.running_root(&state, task_id) else {
            return;
        };
        if is_blank(message) {
            return;
        }

        let path = match file_uri_to_path(file_uri) {
            Ok(path) => path,
            Err(e) => {
                warn!("Dropping diagnostic for task {:?}: {}", task_id, e);
                return;
            }
        };
        let target = if state.is_in_progress(task_id) {
            root_task.clone()
        } else {
            task_id.clone()
        };

        let event = FileMessageEvent {
            id: target,
            severity,
            path,
            line,
            column,
            message: terminate_line(message),
        };
        self.sink.on_event(&root_task, BuildEvent::FileMessage(event));
    }

    /// Adds a message to the latest subtask, or to the latest task when no
    /// subtask is running.
    pub fn add_latest_message(&self, message: &str) {
        let state = self.state.lock();
        let Some(task_id) = state.latest().cloned() else {
            debug!("Ignoring message, no task is running");
            return;
        };
        self.add_message_locked(&state, &task_id, message);
    }

    /// Adds a message to a task or subtask. Messages for a subtask are also
    /// copied to each of its ancestors up to the root task.
    pub fn add_message(&self, task_id: &Id, message: &str) {
        let state = self.state.lock();
        self.add_message_locked(&state, task_id, message);
    }

    fn add_message_locked(&self, state: &Registry<Id>, task_id: &Id, message: &str) {
        let Some(root_task) = self.running_root(state, task_id) else {
            return;
        };
        if is_blank(message) {
            return;
        }

        let text = terminate_line(message);
        self.send_output(state, &root_task, task_id, &text);
        for ancestor in state.ancestors_of(task_id) {
            self.send_output(state, &root_task, &ancestor, &text);
        }
    }

    fn send_output(&self, state: &Registry<Id>, root_task: &Id, task_id: &Id, text: &str) {
        let id = if state.is_in_progress(task_id) {
            None
        } else {
            Some(task_id.clone())
        };
        let event = OutputEvent {
            id,
            message: text.to_string(),
            stdout: true,
        };
        self.sink.on_event(root_task, BuildEvent::Output(event));
    }

    fn running_root(&self, state: &Registry<Id>, task_id: &Id) -> Option<Id> {
        let root_task = state.root_of(task_id)?;
        if state.is_in_progress(root_task) {
            Some(root_task.clone())
        } else {
            debug!("Ignoring call for {:?}: its task is not running", task_id);
            None
        }
    }
}
