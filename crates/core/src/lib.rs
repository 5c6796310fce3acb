//! bsp-console - Build console aggregator for build-server task notifications
//!
//! This crate provides functionality to:
//! - Track running tasks and their nested subtasks
//! - Translate start/finish/message calls into normalized build console events
//! - Replay build-server notification streams through a console
pub mod config;
pub mod console;
pub mod error;
pub mod protocol;
pub mod sink;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use config::ConsoleConfig;
pub use console::{ActionKind, ConsoleKind, TaskAction, TaskActions, TaskConsole};
pub use protocol::{Notification, NotificationListener, StatusCode};
pub use sink::{EventSink, QueuedSink, RecordingSink};
