//! `C` edit cell payloads.
//!
//! Layout after the one byte marker:
//!
//! ```text
//! ref \0 track \0 sub \0 sub2 \0
//! time: f64 | count: u32
//! index block (17 bytes, first 8 are u32 a, u32 b with a + b == count)
//! 64 byte edit records ...
//! ```
//!
//! An index block whose `b` is [`INDEX_TERMINATOR`] carries no records.

use crate::{Error, Result};
use bytes::Buf;
use tracing::{debug, warn};

/// Size of one edit record.
pub const EDIT_RECORD_SIZE: usize = 0x40;

/// Size of the index block preceding the edit records.
pub const INDEX_BLOCK_SIZE: usize = 17;

/// Index `b` value marking a block without edit records.
pub const INDEX_TERMINATOR: u32 = 0xf000_0000;

/// Raw reel code for black.
pub const REEL_CODE_BLACK: i32 = 1;

/// Raw reel code for a dissolve transition.
pub const REEL_CODE_DISSOLVE: i32 = 0xb655;

/// Time selector for an in-edge record.
pub const TIME_SELECT_IN: i32 = 1;

/// Time selector for an out-edge record.
pub const TIME_SELECT_OUT: i32 = 4;

const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Encode a number in upper-case base 36.
pub fn base36(mut num: u32) -> String {
    if num == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while num > 0 {
        digits.push(BASE36_DIGITS[(num % 36) as usize]);
        num /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Reel reference stored in an edit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReelCode {
    Black,
    Dissolve,
    /// Numeric id of a media item, resolved through its cookie suffix.
    Media(u32),
}

impl ReelCode {
    /// Classify a raw reel field.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            REEL_CODE_BLACK => Self::Black,
            REEL_CODE_DISSOLVE => Self::Dissolve,
            other => Self::Media(other as u32),
        }
    }

    /// Four character, zero padded base 36 cookie suffix for media reels.
    pub fn cookie_suffix(&self) -> Option<String> {
        match self {
            Self::Media(code) => Some(format!("{:0>4}", base36(*code))),
            _ => None,
        }
    }
}

/// Which edge of a cut a record describes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeEdge {
    In { rec: f64, src: f64 },
    Out { rec: f64, src: f64 },
    /// Selector value was neither in nor out; times are unusable.
    Unknown(i32),
}

/// One 64 byte edit record.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRecord {
    /// Float at bytes 8..12, meaning unknown.
    pub unknown: f32,
    pub speed: f32,
    pub edge: TimeEdge,
    pub reel: ReelCode,
    /// Edit type code.
    pub scope: char,
    pub id1: i32,
    pub id2: i32,
}

impl EditRecord {
    /// Decode a record from exactly [`EDIT_RECORD_SIZE`] bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != EDIT_RECORD_SIZE {
            return Err(Error::malformed(
                "C",
                format!("edit record is {} bytes, expected 64", data.len()),
            ));
        }

        let mut floats = &data[8..16];
        let unknown = floats.get_f32_le();
        let speed = floats.get_f32_le();

        let mut times = &data[16..32];
        let t1 = times.get_f64_le();
        let t2 = times.get_f64_le();

        let reel = ReelCode::from_raw((&data[32..36]).get_i32_le());
        let scope = data[42] as char;
        let selector = (&data[44..48]).get_i32_le();

        let mut ids = &data[52..60];
        let id1 = ids.get_i32_le();
        let id2 = ids.get_i32_le();

        let edge = match selector {
            TIME_SELECT_IN => TimeEdge::In { rec: t1, src: t2 },
            TIME_SELECT_OUT => TimeEdge::Out { rec: t1, src: t2 },
            other => TimeEdge::Unknown(other),
        };

        Ok(Self {
            unknown,
            speed,
            edge,
            reel,
            scope,
            id1,
            id2,
        })
    }
}

/// Index block values preceding the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub a: u32,
    pub b: u32,
}

impl IndexEntry {
    /// Whether this entry closes the block without records.
    pub fn is_terminator(&self) -> bool {
        self.b == INDEX_TERMINATOR
    }
}

/// Decoded `C` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRecordBlock {
    /// Leading byte, observed to be 2.
    pub marker: u8,
    pub reference: String,
    /// Track label such as `V1` or `A2`.
    pub track: String,
    pub sub: String,
    pub sub2: String,
    pub time: f64,
    pub count: u32,
    pub index: Option<IndexEntry>,
    pub records: Vec<EditRecord>,
}

/// Decode a `C` payload.
pub fn decode(body: &[u8]) -> Result<EditRecordBlock> {
    let (&marker, rest) = body
        .split_first()
        .ok_or_else(|| Error::malformed("C", "empty payload"))?;

    let mut fields = rest.splitn(5, |&b| b == 0);
    let reference = lossy(next_field(&mut fields, "ref")?);
    let track = lossy(next_field(&mut fields, "track")?);
    let sub = lossy(next_field(&mut fields, "sub")?);
    let sub2 = lossy(next_field(&mut fields, "sub2")?);
    let mut tail = next_field(&mut fields, "header")?;

    if tail.len() < 12 {
        return Err(Error::malformed(
            "C",
            format!("{} header bytes, expected 12", tail.len()),
        ));
    }
    let time = tail.get_f64_le();
    let count = tail.get_u32_le();

    let mut block = EditRecordBlock {
        marker,
        reference,
        track,
        sub,
        sub2,
        time,
        count,
        index: None,
        records: Vec::new(),
    };

    if tail.is_empty() {
        return Ok(block);
    }
    if tail.len() < INDEX_BLOCK_SIZE {
        return Err(Error::malformed(
            "C",
            format!("{} index bytes, expected 17", tail.len()),
        ));
    }

    let mut index_fields = &tail[..8];
    let index = IndexEntry {
        a: index_fields.get_u32_le(),
        b: index_fields.get_u32_le(),
    };
    block.index = Some(index);

    if index.is_terminator() {
        debug!(track = %block.track, "index terminator, no edit records");
        return Ok(block);
    }
    if index.a.wrapping_add(index.b) != count {
        debug!(
            a = index.a,
            b = index.b,
            count,
            "index entry does not add up to record count"
        );
    }

    let records = tail[INDEX_BLOCK_SIZE..].chunks_exact(EDIT_RECORD_SIZE);
    let trailing = records.remainder().len();
    for chunk in records {
        block.records.push(EditRecord::decode(chunk)?);
    }
    if trailing != 0 {
        warn!(
            track = %block.track,
            bytes = trailing,
            "edit cell payload ends with a partial record"
        );
    }

    Ok(block)
}

fn next_field<'a>(fields: &mut impl Iterator<Item = &'a [u8]>, name: &str) -> Result<&'a [u8]> {
    fields
        .next()
        .ok_or_else(|| Error::malformed("C", format!("missing {} field", name)))
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
