//! Configuration management for bsp-console

mod settings;

// Re-export main types
pub use settings::{CONFIG_FILE_NAMES, ConsoleConfig};
