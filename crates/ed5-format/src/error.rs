//! Error types for ed5-format.

use thiserror::Error;

/// Result type for ed5-format operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ed5-format operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Top-level frame does not start with the `$\0` marker.
    #[error("Framing error at offset {offset}: magic sequence not found")]
    MissingMagic { offset: usize },

    /// Frame label is not NUL terminated.
    #[error("Framing error at offset {offset}: unterminated label")]
    UnterminatedLabel { offset: usize },

    /// Frame is shorter than its header or its declared length.
    #[error("Framing error at offset {offset}: need {need} bytes, have {have}")]
    Truncated {
        offset: usize,
        need: usize,
        have: usize,
    },

    /// A length field is negative.
    #[error("Framing error at offset {offset}: negative length {value}")]
    NegativeLength { offset: usize, value: i32 },

    /// Payload layout does not match its label.
    #[error("Malformed {label} payload: {reason}")]
    MalformedPayload { label: &'static str, reason: String },
}

impl Error {
    /// Create a malformed payload error.
    pub fn malformed(label: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            label,
            reason: reason.into(),
        }
    }
}
