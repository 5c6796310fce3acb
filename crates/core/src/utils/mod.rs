pub mod serde_helpers;
pub mod text;

pub use text::{file_uri_to_path, is_blank, terminate_line};
