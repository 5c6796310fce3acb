pub mod formatter;
pub mod printer;

pub use formatter::{format_event, format_event_json};
pub use printer::{OutputFormat, PrintingSink};
