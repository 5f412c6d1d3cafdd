//! Path helpers for cookie files and recorded media paths.
//!
//! Media paths stored in `.ed5` property tables come from the machine that
//! logged the clip, so they may use either Windows or Unix separators
//! regardless of the host.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Extension of logging database files.
pub const ED5_EXTENSION: &str = "ed5";

/// Extension of project index files.
pub const ODB_EXTENSION: &str = "odb";

/// Characters left as-is in `file://` URIs.
const URI_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b':')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Final component of a recorded path, accepting `\` and `/` separators.
///
/// ```
/// use ed5_common::paths::basename;
///
/// assert_eq!(basename(r"\\server\media\Take 1.mov"), "Take 1.mov");
/// assert_eq!(basename("/srv/media/clip.mxf"), "clip.mxf");
/// ```
pub fn basename(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Clip name usable as an EDL reel: text before the first `.`, spaces
/// replaced by `_`.
pub fn short_clip_name(base: &str) -> String {
    base.split('.').next().unwrap_or(base).replace(' ', "_")
}

/// File name of the logging database for `cookie`.
pub fn cookie_file_name(cookie: &str) -> String {
    format!("{}.{}", cookie, ED5_EXTENSION)
}

/// File name of the project index for a `PROJECT_COOKIE` value.
///
/// The first character of the cookie is replaced by `O`.
pub fn project_index_file_name(project_cookie: &str) -> Option<String> {
    let mut chars = project_cookie.chars();
    chars.next()?;
    Some(format!("O{}.{}", chars.as_str(), ODB_EXTENSION))
}

fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let letter = chars.next()?;
    (letter.is_ascii_alphabetic() && chars.next() == Some(':')).then_some(letter)
}

/// `file://` URI for a recorded path.
///
/// Backslashes become `/`; everything outside the unreserved set is percent
/// encoded. An empty path yields an empty string.
///
/// ```
/// use ed5_common::paths::file_uri;
///
/// assert_eq!(file_uri("/media/My Clip.mov"), "file:///media/My%20Clip.mov");
/// assert_eq!(file_uri(r"C:\media\a.mov"), "file:///C:/media/a.mov");
/// ```
pub fn file_uri(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let normalized = path.replace('\\', "/");
    let encoded = utf8_percent_encode(&normalized, URI_PATH).to_string();

    if drive_letter(path).is_some() {
        format!("file:///{}", encoded)
    } else if let Some(unc) = encoded.strip_prefix("//") {
        format!("file://{}", unc)
    } else if encoded.starts_with('/') {
        format!("file://{}", encoded)
    } else {
        format!("file:///{}", encoded)
    }
}
