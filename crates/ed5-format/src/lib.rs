//! ed5-format: segment framing and payload decoding for Lightworks `.ed5` files
//!
//! An `.ed5` logging database is a flat run of length-framed segments, each
//! holding a run of typed subsegments. This crate turns the raw bytes into
//! that tree without touching the filesystem.
//!
//! # Modules
//!
//! - `frame` - Shared header layout and sibling splitting
//! - `tree` - Segment/subsegment tree builder
//! - `payload` - Typed payloads: title, `EHP` properties, `A` gain envelopes,
//!   `C` edit records
//! - `hexdump` - Byte dumps for trace logging
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use ed5_format::{parse_segments, DecodeOptions};
//!
//! let segments = parse_segments(&Bytes::new(), &DecodeOptions::default()).unwrap();
//! assert!(segments.is_empty());
//! ```

pub mod error;
pub mod frame;
pub mod hexdump;
pub mod payload;
pub mod tree;

pub use error::{Error, Result};
pub use frame::{split_frames, Extent, Frame, FrameHeader};
pub use payload::{
    EditRecord, EditRecordBlock, GainEnvelope, GainPoint, Payload, PayloadKind, Property,
    PropertyTable, ReelCode, TimeEdge,
};
pub use tree::{parse_segments, DecodeOptions, Segment, Subsegment};
