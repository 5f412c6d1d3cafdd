//! `A` gain envelopes.

use crate::{Error, Result};
use bytes::Buf;
use tracing::warn;

/// Size of one envelope point on disk.
pub const GAIN_POINT_SIZE: usize = 21;

/// Gain level corresponding to 0 dB in the approximate conversion.
const UNITY_LEVEL: f64 = 0xf000_0000u32 as f64;

/// Level steps per dB in the approximate conversion.
const LEVEL_PER_DB: f64 = 10_240_000.0;

/// One point of a gain envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct GainPoint {
    /// Position in seconds.
    pub time: f64,
    /// Raw gain level.
    pub level: u32,
    /// Bytes 8..11, meaning unknown.
    pub reserved: [u8; 3],
    /// Bytes 15..21, meaning unknown.
    pub trailer: [u8; 6],
}

impl GainPoint {
    /// Approximate level in dB.
    ///
    /// The linear mapping has not been validated against the editor and is
    /// only good for rough inspection.
    pub fn approx_db(&self) -> f64 {
        (self.level as f64 - UNITY_LEVEL) / LEVEL_PER_DB
    }
}

/// Decoded `A` payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GainEnvelope {
    /// Count field from the payload header.
    pub declared_count: i32,
    pub points: Vec<GainPoint>,
}

/// Decode an `A` payload: an i32 count followed by 21 byte points.
pub fn decode(body: &[u8]) -> Result<GainEnvelope> {
    if body.len() < 4 {
        return Err(Error::malformed(
            "A",
            format!("{} bytes is shorter than the count field", body.len()),
        ));
    }

    let mut header = &body[..4];
    let declared_count = header.get_i32_le();

    let records = body[4..].chunks_exact(GAIN_POINT_SIZE);
    let trailing = records.remainder().len();

    let points = records
        .map(|mut rec| {
            let time = rec.get_f64_le();
            let mut reserved = [0u8; 3];
            rec.copy_to_slice(&mut reserved);
            let level = rec.get_u32_le();
            let mut trailer = [0u8; 6];
            rec.copy_to_slice(&mut trailer);
            GainPoint {
                time,
                level,
                reserved,
                trailer,
            }
        })
        .collect();

    if trailing != 0 {
        warn!(bytes = trailing, "gain envelope ends with a partial point");
    }

    Ok(GainEnvelope {
        declared_count,
        points,
    })
}
