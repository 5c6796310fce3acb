use std::io;

/// Errors that can occur outside the console state machine itself
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid file URI: {0}")]
    InvalidUri(String),
}

/// Result type alias for bsp-console operations
pub type Result<T> = std::result::Result<T, Error>;
