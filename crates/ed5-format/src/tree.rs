//! Two-level segment tree.
//!
//! A file is a run of top-level segments. The first `index_length` bytes of a
//! segment's payload are an opaque index; the rest is a run of subsegments,
//! each holding one typed payload.

use crate::frame::{split_frames, Extent, Frame};
use crate::hexdump::hexdump;
use crate::payload::Payload;
use crate::{Error, Result};
use bytes::Bytes;
use tracing::{debug, trace, warn};

/// Options controlling how a buffer is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Emit hexdumps of every header and payload at `trace` level.
    pub trace_bytes: bool,
}

/// Top-level segment.
#[derive(Debug, Clone)]
pub struct Segment {
    pub frame: Frame,
    /// Leading `index_length` bytes of the payload, not interpreted.
    pub index: Bytes,
    pub children: Vec<Subsegment>,
}

/// Leaf record inside a segment.
#[derive(Debug, Clone)]
pub struct Subsegment {
    pub frame: Frame,
    pub payload: Payload,
}

impl Subsegment {
    /// Subsegment label as text.
    pub fn label(&self) -> String {
        self.frame.header.label_str().into_owned()
    }
}

/// Decode a whole buffer into its segment tree.
///
/// Framing errors are fatal. A payload whose layout does not match its label
/// is logged and kept as [`Payload::Unknown`].
pub fn parse_segments(data: &Bytes, options: &DecodeOptions) -> Result<Vec<Segment>> {
    let frames = split_frames(data, 0, Extent::Segment)?;
    let mut segments = Vec::with_capacity(frames.len());

    for (nr, frame) in frames.into_iter().enumerate() {
        let segment = build_segment(frame, options)?;
        debug!(
            segment = nr,
            offset = segment.frame.offset,
            children = segment.children.len(),
            "parsed segment"
        );
        segments.push(segment);
    }

    Ok(segments)
}

fn build_segment(frame: Frame, options: &DecodeOptions) -> Result<Segment> {
    let header = &frame.header;
    let index_len = crate::frame::checked_length(header.index_length, frame.offset)?;
    if index_len > frame.payload.len() {
        return Err(Error::Truncated {
            offset: frame.offset,
            need: index_len,
            have: frame.payload.len(),
        });
    }

    if options.trace_bytes {
        trace!(
            label = %header.label_str(),
            flags = ?header.flags,
            body_length = header.body_length,
            index_length = header.index_length,
            "segment header\n{}",
            hexdump(&frame.payload[..index_len], frame.payload_offset())
        );
    }

    let index = frame.payload.slice(..index_len);
    let body = frame.payload.slice(index_len..);
    let children = split_frames(&body, frame.payload_offset() + index_len, Extent::Subsegment)?
        .into_iter()
        .map(|child| build_subsegment(child, options))
        .collect();

    Ok(Segment {
        frame,
        index,
        children,
    })
}

fn build_subsegment(frame: Frame, options: &DecodeOptions) -> Subsegment {
    let label = frame.header.label.clone();

    if options.trace_bytes {
        trace!(
            label = %frame.header.label_str(),
            flags = ?frame.header.flags,
            a = frame.header.index_length,
            b = frame.header.body_length,
            "subsegment\n{}",
            hexdump(&frame.payload, frame.payload_offset())
        );
    }

    let payload = match Payload::decode(&label, &frame.payload) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(offset = frame.offset, "{}", e);
            Payload::Unknown(frame.payload.clone())
        }
    };

    if let Payload::Unknown(_) = payload {
        debug!(
            label = %frame.header.label_str(),
            offset = frame.offset,
            "unsupported subsegment"
        );
    }

    Subsegment { frame, payload }
}
