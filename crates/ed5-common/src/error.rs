//! Error types shared by the edit model.

/// Error type for ed5-common.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A track label is not one of the six EDL channels.
    #[error("Unsupported track: {0}")]
    UnsupportedTrack(String),
}

impl Error {
    /// Create a new UnsupportedTrack error.
    pub fn unsupported_track<S: Into<String>>(track: S) -> Self {
        Self::UnsupportedTrack(track.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
