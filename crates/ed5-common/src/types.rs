//! Edit vocabulary shared by the decoder and the exporters.
//!
//! Raw [`EditCell`]s carry one edge of a cut each; the reconciliation step
//! pairs them into [`EditEvent`]s with all four times set.

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Source of an edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reel {
    /// Black filler (`BL`).
    Black,
    /// Transition marker; modifies the following event.
    Dissolve,
    /// Reel code that could not be resolved to a cookie.
    Unknown,
    /// Cookie of the referenced media item.
    Cookie(String),
}

impl Reel {
    /// Cookie of a media reel.
    pub fn cookie(&self) -> Option<&str> {
        match self {
            Self::Cookie(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Reel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "BL"),
            Self::Dissolve => write!(f, "dissolve"),
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Cookie(c) => write!(f, "{}", c),
        }
    }
}

impl Serialize for Reel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Track that can appear in an EDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Channel {
    V1,
    V2,
    A1,
    A2,
    A3,
    A4,
}

impl Channel {
    /// All EDL channels.
    pub const ALL: [Channel; 6] = [
        Channel::V1,
        Channel::V2,
        Channel::A1,
        Channel::A2,
        Channel::A3,
        Channel::A4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "V1",
            Self::V2 => "V2",
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::A4 => "A4",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::unsupported_track(s))
    }
}

/// One edge of a cut as recorded in a raw cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "edge", rename_all = "lowercase")]
pub enum CellEdge {
    In { rec: f64, src: f64 },
    Out { rec: f64, src: f64 },
}

/// Raw edit fragment decoded from one 64 byte record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditCell {
    pub track: String,
    /// `None` when the record's time selector was not recognised.
    pub edge: Option<CellEdge>,
    pub reel: Reel,
    pub scope: char,
    pub id1: i32,
    pub id2: i32,
    pub speed: f32,
}

impl EditCell {
    /// `(rec_in, src_in)` if this is an in-edge.
    pub fn in_times(&self) -> Option<(f64, f64)> {
        match self.edge {
            Some(CellEdge::In { rec, src }) => Some((rec, src)),
            _ => None,
        }
    }

    /// `(rec_out, src_out)` if this is an out-edge.
    pub fn out_times(&self) -> Option<(f64, f64)> {
        match self.edge {
            Some(CellEdge::Out { rec, src }) => Some((rec, src)),
            _ => None,
        }
    }
}

/// EDL operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Cut,
    Dissolve,
}

impl Operation {
    /// One letter EDL code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cut => "C",
            Self::Dissolve => "D",
        }
    }
}

/// Transition into an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub operation: Operation,
    /// Length in frames.
    pub duration_frames: u32,
}

/// Exact identity of a cut, used to merge the same cut logged on several
/// tracks. Times compare by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CutKey {
    reel: Reel,
    times: [u64; 4],
}

/// Reconciled edit event with all four times set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditEvent {
    pub reel: Reel,
    /// Space separated track labels, e.g. `V1 A1`.
    pub track: String,
    pub src_in: f64,
    pub src_out: f64,
    pub rec_in: f64,
    pub rec_out: f64,
    pub scope: char,
    pub id1: i32,
    pub id2: i32,
    pub speed: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
}

impl EditEvent {
    /// Individual track labels.
    pub fn tracks(&self) -> impl Iterator<Item = &str> {
        self.track.split_whitespace()
    }

    pub fn has_track(&self, label: &str) -> bool {
        self.tracks().any(|t| t == label)
    }

    /// Append the labels of `other` that are not already present.
    pub fn add_tracks(&mut self, other: &str) {
        for label in other.split_whitespace() {
            if !self.has_track(label) {
                if !self.track.is_empty() {
                    self.track.push(' ');
                }
                self.track.push_str(label);
            }
        }
    }

    pub fn cut_key(&self) -> CutKey {
        CutKey {
            reel: self.reel.clone(),
            times: [
                self.src_in.to_bits(),
                self.src_out.to_bits(),
                self.rec_in.to_bits(),
                self.rec_out.to_bits(),
            ],
        }
    }

    /// Parsed EDL channels, failing on the first label that is not one.
    pub fn channels(&self) -> Result<Vec<Channel>> {
        self.tracks().map(str::parse).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(reel: Reel, track: &str) -> EditEvent {
        EditEvent {
            reel,
            track: track.to_string(),
            src_in: 1.0,
            src_out: 2.0,
            rec_in: 0.0,
            rec_out: 1.0,
            scope: 'V',
            id1: 0,
            id2: 0,
            speed: 1.0,
            transition: None,
        }
    }

    #[test]
    fn test_reel_display() {
        assert_eq!(Reel::Black.to_string(), "BL");
        assert_eq!(Reel::Dissolve.to_string(), "dissolve");
        assert_eq!(Reel::Unknown.to_string(), "UNKNOWN");
        assert_eq!(Reel::Cookie("S00A1".into()).to_string(), "S00A1");
        assert_eq!(Reel::Cookie("S00A1".into()).cookie(), Some("S00A1"));
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("A3".parse::<Channel>().unwrap(), Channel::A3);
        let err = "V3".parse::<Channel>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedTrack(t) if t == "V3"));
    }

    #[test]
    fn test_cell_edges() {
        let cell = EditCell {
            track: "V1".into(),
            edge: Some(CellEdge::In { rec: 3.0, src: 4.0 }),
            reel: Reel::Black,
            scope: 'V',
            id1: 1,
            id2: 2,
            speed: 1.0,
        };
        assert_eq!(cell.in_times(), Some((3.0, 4.0)));
        assert_eq!(cell.out_times(), None);
    }

    #[test]
    fn test_add_tracks_skips_present() {
        let mut ev = event(Reel::Black, "V1");
        ev.add_tracks("A1");
        ev.add_tracks("V1 A2");
        assert_eq!(ev.track, "V1 A1 A2");
        assert!(ev.has_track("A2"));
    }

    #[test]
    fn test_cut_key() {
        let a = event(Reel::Black, "V1");
        let b = event(Reel::Black, "A1");
        let mut c = event(Reel::Black, "A1");
        c.rec_out = 1.5;
        assert_eq!(a.cut_key(), b.cut_key());
        assert_ne!(a.cut_key(), c.cut_key());
        assert_ne!(a.cut_key(), event(Reel::Unknown, "V1").cut_key());
    }

    #[test]
    fn test_channels() {
        assert_eq!(
            event(Reel::Black, "V1 A3").channels().unwrap(),
            vec![Channel::V1, Channel::A3]
        );
        assert!(event(Reel::Black, "V1 T1").channels().is_err());
    }
}
