use anyhow::{Context, Result};
use bsp_console_core::protocol::read_notifications;
use bsp_console_core::{
    ConsoleConfig, ConsoleKind, EventSink, NotificationListener, QueuedSink, TaskActions,
    TaskConsole, TaskId,
};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cli::ConsoleKindArg;
use crate::display::{OutputFormat, PrintingSink};

pub fn replay_command(input: &str, kind: ConsoleKindArg, format: OutputFormat) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let config = ConsoleConfig::discover(&cwd).context("Failed to load console config")?;
    debug!("Replaying {} with {:?}", input, config);

    let notifications = if input == "-" {
        read_notifications(io::stdin().lock())
    } else {
        let file = File::open(input).with_context(|| format!("Failed to open {input}"))?;
        read_notifications(BufReader::new(file))
    }
    .with_context(|| format!("Failed to read notifications from {input}"))?;

    let printer: Arc<dyn EventSink<TaskId>> = Arc::new(PrintingSink::stdout(format));
    let sink: Arc<dyn EventSink<TaskId>> = if config.queued {
        Arc::new(QueuedSink::new(printer).context("Failed to start event queue")?)
    } else {
        printer
    };

    let console_kind = match kind {
        ConsoleKindArg::Sync => ConsoleKind::sync(|| info!("Reload requested")),
        ConsoleKindArg::Build => ConsoleKind::build(),
    };
    let console = TaskConsole::new(sink, cwd, console_kind).with_config(&config);

    NotificationListener::new(&console)
        .with_actions(TaskActions::new().on_cancel(|| info!("Stop requested")))
        .replay(notifications);

    let unfinished = console.tasks_in_progress();
    if !unfinished.is_empty() {
        warn!(
            "Stream ended with {} unfinished task(s): {:?}",
            unfinished.len(),
            unfinished
        );
    }

    // Dropping the console flushes a queued sink before we exit
    drop(console);
    Ok(())
}
