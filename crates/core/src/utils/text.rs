use std::path::PathBuf;

use url::Url;

use crate::error::{Error, Result};

const FILE_SCHEME: &str = "file://";

/// A message counts as blank when it has no non-whitespace characters.
pub fn is_blank(message: &str) -> bool {
    message.trim().is_empty()
}

/// Appends a trailing newline unless the text already ends with one.
pub fn terminate_line(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

/// Converts a diagnostic location into an absolute file path.
///
/// A `file://` URI is parsed and percent-decoded. Anything else is taken as a
/// literal absolute path, so `#`, `?` and `%` stay part of the file name.
pub fn file_uri_to_path(file_uri: &str) -> Result<PathBuf> {
    if !file_uri.starts_with(FILE_SCHEME) {
        let path = PathBuf::from(file_uri);
        if !path.is_absolute() {
            return Err(Error::InvalidUri(format!("{file_uri}: not an absolute path")));
        }
        return Ok(path);
    }

    let url = Url::parse(file_uri).map_err(|e| Error::InvalidUri(format!("{file_uri}: {e}")))?;
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::InvalidUri(format!(
            "{file_uri}: query or fragment in a file URI"
        )));
    }
    url.to_file_path()
        .map_err(|()| Error::InvalidUri(format!("{file_uri}: not a local file path")))
}
