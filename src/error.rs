//! Error taxonomy for decoding, reconciliation and export.
//!
//! Framing errors abort the affected source. Pairing errors abort the
//! affected export. Reel, track and media path errors are recoverable: they
//! are logged where they occur and replaced by a sentinel.

use std::path::{Path, PathBuf};

/// Error type for ed5decode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The byte stream could not be framed.
    #[error(transparent)]
    Format(#[from] ed5_format::Error),

    /// A file could not be read or written.
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raw edit cells cannot be paired.
    #[error("odd number of edit cells ({0})")]
    OddCellCount(usize),

    /// The source holds no edit cells.
    #[error("no edit data found")]
    NoEditData,

    /// No file matches a reel cookie suffix.
    #[error("did not find cookie \"*{suffix}\" in {dir:?}")]
    ReelNotFound { suffix: String, dir: PathBuf },

    /// Several files match a reel cookie suffix.
    #[error("cookie \"*{suffix}\" is not unique in {dir:?} ({matches} matches)")]
    AmbiguousReel {
        suffix: String,
        dir: PathBuf,
        matches: usize,
    },

    /// A track label has no EDL channel.
    #[error("channel {0} invalid in EDL")]
    UnsupportedTrack(String),

    /// A media reel has no recorded original file.
    #[error("did not find path for \"{0}\"")]
    MissingMediaPath(String),

    /// Cross-file resolution looped or nested too deeply.
    #[error("resolving \"{cookie}\" exceeded depth {depth}")]
    ResolutionDepthExceeded { cookie: String, depth: usize },

    /// The project index could not be read.
    #[error("can not read project info ({path:?}): {reason}")]
    ProjectIndex { path: PathBuf, reason: String },

    /// XML output failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON summary output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a new ProjectIndex error.
    pub fn project_index(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::ProjectIndex {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a new Xml error.
    pub fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<ed5_common::Error> for Error {
    fn from(err: ed5_common::Error) -> Self {
        match err {
            ed5_common::Error::UnsupportedTrack(t) => Self::UnsupportedTrack(t),
        }
    }
}

/// Result type alias using the crate Error type.
pub type Result<T> = std::result::Result<T, Error>;
