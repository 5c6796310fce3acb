use bsp_console_core::{BuildEvent, EventSink, TaskId};
use clap::ValueEnum;
use parking_lot::Mutex;
use std::io::{self, Write};
use tracing::warn;

use super::formatter::{format_event, format_event_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per event
    Text,
    /// One JSON object per line
    Json,
}

/// Sink writing every event as a line to an output stream
pub struct PrintingSink {
    format: OutputFormat,
    out: Mutex<Box<dyn Write + Send>>,
}

impl PrintingSink {
    pub fn new(format: OutputFormat, out: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            out: Mutex::new(out),
        }
    }

    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, Box::new(io::stdout()))
    }

    fn render(&self, build_id: &TaskId, event: &BuildEvent<TaskId>) -> Option<String> {
        match self.format {
            OutputFormat::Text => Some(format_event(build_id, event)),
            OutputFormat::Json => match format_event_json(build_id, event) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!("Failed to serialize {} event: {}", event.kind_name(), e);
                    None
                }
            },
        }
    }
}

impl EventSink<TaskId> for PrintingSink {
    fn on_event(&self, build_id: &TaskId, event: BuildEvent<TaskId>) {
        let Some(line) = self.render(build_id, &event) else {
            return;
        };
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!("Failed to write event: {}", e);
        }
    }
}
