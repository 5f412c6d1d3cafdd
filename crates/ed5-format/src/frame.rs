//! Byte framer for length-prefixed records.
//!
//! Every record in an `.ed5` file shares the same header layout:
//!
//! ```text
//! label bytes | 0x00 | flags[2] | a: i32 LE | b: i32 LE | payload ...
//! ```
//!
//! The header is therefore `label.len() + 11` bytes long. Which of the two
//! length fields closes the record depends on the nesting level: top-level
//! segments span `header + b` bytes while subsegments span `header + a`.
//! Reading the wrong field does not fail, it silently misaligns every
//! following sibling, so the choice is made explicit through [`Extent`].

use crate::{Error, Result};
use bytes::{Buf, Bytes};
use std::borrow::Cow;

/// Marker at the start of every top-level segment.
pub const SEGMENT_MAGIC: &[u8; 2] = b"$\0";

/// Header bytes following the label: terminator, two flag bytes, two lengths.
pub const HEADER_OVERHEAD: usize = 11;

/// Which length field determines the total size of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// Top-level segment: `header_length + body_length`, magic checked.
    Segment,
    /// Child of a segment: `header_length + index_length`.
    Subsegment,
}

/// Parsed frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Record type label, without its terminator.
    pub label: Bytes,
    /// Two raw flag bytes, not interpreted.
    pub flags: [u8; 2],
    /// First length field (`a`).
    pub index_length: i32,
    /// Second length field (`b`).
    pub body_length: i32,
    /// Size of the header in bytes (`label.len() + 11`).
    pub header_length: usize,
}

impl FrameHeader {
    /// Read a header from the start of `data`.
    ///
    /// `offset` is the absolute position of `data` and is only used for
    /// error reporting.
    pub fn read(data: &Bytes, offset: usize) -> Result<Self> {
        let nul = data
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::UnterminatedLabel { offset })?;
        let header_length = nul + HEADER_OVERHEAD;
        if data.len() < header_length {
            return Err(Error::Truncated {
                offset,
                need: header_length,
                have: data.len(),
            });
        }

        let mut fields = &data[nul + 1..header_length];
        let flags = [fields.get_u8(), fields.get_u8()];
        let index_length = fields.get_i32_le();
        let body_length = fields.get_i32_le();

        Ok(Self {
            label: data.slice(..nul),
            flags,
            index_length,
            body_length,
            header_length,
        })
    }

    /// Label as text, lossily decoded.
    pub fn label_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.label)
    }

    /// Total frame size for the given nesting level.
    pub fn total_length(&self, extent: Extent, offset: usize) -> Result<usize> {
        let value = match extent {
            Extent::Segment => self.body_length,
            Extent::Subsegment => self.index_length,
        };
        Ok(self.header_length + checked_length(value, offset)?)
    }
}

/// A header together with the payload bytes it frames.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Parsed header.
    pub header: FrameHeader,
    /// Absolute byte offset of the frame within the decoded file.
    pub offset: usize,
    /// Bytes after the header up to the end of the frame.
    pub payload: Bytes,
}

impl Frame {
    /// Total size of the frame in bytes.
    pub fn len(&self) -> usize {
        self.header.header_length + self.payload.len()
    }

    /// Whether the frame is empty (never true for a parsed frame).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset + self.header.header_length
    }
}

/// Convert a signed length field, rejecting negative values.
pub(crate) fn checked_length(value: i32, offset: usize) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::NegativeLength { offset, value })
}

/// Split a buffer into consecutive sibling frames.
///
/// `base_offset` is the absolute position of `data[0]`. The buffer must be
/// consumed exactly; a frame whose declared length runs past the end is a
/// [`Error::Truncated`] error.
pub fn split_frames(data: &Bytes, base_offset: usize, extent: Extent) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        let offset = base_offset + pos;
        let rest = data.slice(pos..);

        if extent == Extent::Segment && !rest.starts_with(SEGMENT_MAGIC) {
            return Err(Error::MissingMagic { offset });
        }

        let header = FrameHeader::read(&rest, offset)?;
        let total = header.total_length(extent, offset)?;
        if total > rest.len() {
            return Err(Error::Truncated {
                offset,
                need: total,
                have: rest.len(),
            });
        }

        let payload = rest.slice(header.header_length..total);
        frames.push(Frame {
            header,
            offset,
            payload,
        });
        pos += total;
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(label: &[u8], flags: [u8; 2], a: i32, b: i32, payload: &[u8]) -> Vec<u8> {
        let mut out = label.to_vec();
        out.push(0);
        out.extend_from_slice(&flags);
        out.extend_from_slice(&a.to_le_bytes());
        out.extend_from_slice(&b.to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_header_length_follows_label() {
        let data = Bytes::from(frame_bytes(b"EHP", [1, 2], 4, 9, b"abcd"));
        let header = FrameHeader::read(&data, 0).unwrap();
        assert_eq!(header.label.as_ref(), b"EHP");
        assert_eq!(header.flags, [1, 2]);
        assert_eq!(header.index_length, 4);
        assert_eq!(header.body_length, 9);
        assert_eq!(header.header_length, 14);
        assert_eq!(header.label_str(), "EHP");
    }

    #[test]
    fn test_segment_extent_uses_body_length() {
        let mut data = frame_bytes(b"$", [0, 0], 1, 3, b"xyz");
        data.extend(frame_bytes(b"$", [0, 0], 0, 2, b"pq"));
        let frames = split_frames(&Bytes::from(data), 0, Extent::Segment).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].offset, 0);
        assert_eq!(frames[0].payload.as_ref(), b"xyz");
        assert_eq!(frames[1].offset, 15);
        assert_eq!(frames[1].payload_offset(), 27);
        assert_eq!(frames[1].payload.as_ref(), b"pq");
    }

    #[test]
    fn test_subsegment_extent_uses_index_length() {
        let mut data = frame_bytes(b"T", [0, 0], 3, 999, b"abc");
        data.extend(frame_bytes(b"C", [0, 0], 1, 0, b"z"));
        let frames = split_frames(&Bytes::from(data), 100, Extent::Subsegment).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].offset, 100);
        assert_eq!(frames[0].len(), 15);
        assert_eq!(frames[1].offset, 115);
        assert_eq!(frames[1].header.label.as_ref(), b"C");
    }

    #[test]
    fn test_missing_magic() {
        let data = Bytes::from(frame_bytes(b"X", [0, 0], 0, 0, b""));
        let err = split_frames(&data, 0, Extent::Segment).unwrap_err();
        assert!(matches!(err, Error::MissingMagic { offset: 0 }));
    }

    #[test]
    fn test_declared_length_past_end() {
        let data = Bytes::from(frame_bytes(b"$", [0, 0], 0, 50, b"short"));
        let err = split_frames(&data, 0, Extent::Segment).unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                offset: 0,
                need: 62,
                have: 17
            }
        ));
    }

    #[test]
    fn test_negative_length() {
        let data = Bytes::from(frame_bytes(b"T", [0, 0], -1, 0, b""));
        let err = split_frames(&data, 8, Extent::Subsegment).unwrap_err();
        assert!(matches!(err, Error::NegativeLength { offset: 8, value: -1 }));
    }

    #[test]
    fn test_unterminated_label() {
        let data = Bytes::from_static(b"EHP");
        let err = split_frames(&data, 0, Extent::Subsegment).unwrap_err();
        assert!(matches!(err, Error::UnterminatedLabel { offset: 0 }));
    }

    #[test]
    fn test_short_header() {
        let data = Bytes::from_static(b"$\0\x01\x02");
        let err = split_frames(&data, 0, Extent::Segment).unwrap_err();
        assert!(matches!(err, Error::Truncated { need: 12, .. }));
    }
}
