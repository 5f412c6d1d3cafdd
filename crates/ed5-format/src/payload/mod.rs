//! Subsegment payload decoding.
//!
//! Dispatch is purely on the subsegment label. Unrecognised labels decode to
//! [`Payload::Unknown`] and keep their raw bytes.

pub mod edit;
pub mod gain;
pub mod properties;

pub use edit::{
    base36, EditRecord, EditRecordBlock, IndexEntry, ReelCode, TimeEdge, EDIT_RECORD_SIZE,
    INDEX_TERMINATOR,
};
pub use gain::{GainEnvelope, GainPoint};
pub use properties::{Property, PropertyTable};

use crate::Result;
use bytes::Bytes;

/// Known payload kinds, keyed by subsegment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// `T`
    Title,
    /// `EHP`
    Properties,
    /// `A`
    GainEnvelope,
    /// `C`
    EditRecord,
    Unknown,
}

impl PayloadKind {
    /// Classify a subsegment label.
    pub fn from_label(label: &[u8]) -> Self {
        match label {
            b"T" => Self::Title,
            b"EHP" => Self::Properties,
            b"A" => Self::GainEnvelope,
            b"C" => Self::EditRecord,
            _ => Self::Unknown,
        }
    }
}

/// Decoded subsegment payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Title(String),
    Properties(PropertyTable),
    GainEnvelope(GainEnvelope),
    EditRecord(EditRecordBlock),
    Unknown(Bytes),
}

impl Payload {
    /// Decode `body` according to `label`.
    pub fn decode(label: &[u8], body: &Bytes) -> Result<Self> {
        Ok(match PayloadKind::from_label(label) {
            PayloadKind::Title => Self::Title(decode_title(body)),
            PayloadKind::Properties => Self::Properties(properties::decode(body)?),
            PayloadKind::GainEnvelope => Self::GainEnvelope(gain::decode(body)?),
            PayloadKind::EditRecord => Self::EditRecord(edit::decode(body)?),
            PayloadKind::Unknown => Self::Unknown(body.clone()),
        })
    }

    /// Kind of this payload.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Title(_) => PayloadKind::Title,
            Self::Properties(_) => PayloadKind::Properties,
            Self::GainEnvelope(_) => PayloadKind::GainEnvelope,
            Self::EditRecord(_) => PayloadKind::EditRecord,
            Self::Unknown(_) => PayloadKind::Unknown,
        }
    }
}

/// Title text sits between a leading and a trailing byte.
fn decode_title(body: &[u8]) -> String {
    if body.len() < 2 {
        return String::new();
    }
    String::from_utf8_lossy(&body[1..body.len() - 1]).into_owned()
}
