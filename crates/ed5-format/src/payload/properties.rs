//! `EHP` property tables.

use crate::{Error, Result};
use bytes::Buf;
use tracing::debug;

/// One `(name, value, type)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
    /// Type tag as stored; not interpreted.
    pub kind: String,
}

/// Decoded `EHP` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    /// Count field from the payload header.
    pub declared_count: i32,
    /// Complete triples in file order.
    pub entries: Vec<Property>,
}

impl PropertyTable {
    /// Iterate `(name, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
    }
}

/// Decode an `EHP` payload.
///
/// Layout: 2 unknown bytes, an i32 count, then NUL separated
/// `name, value, type` triples. An incomplete trailing triple ends decoding.
pub fn decode(body: &[u8]) -> Result<PropertyTable> {
    if body.len() < 6 {
        return Err(Error::malformed(
            "EHP",
            format!("{} bytes is shorter than the 6 byte header", body.len()),
        ));
    }

    let mut header = &body[2..6];
    let declared_count = header.get_i32_le();

    let parts: Vec<&[u8]> = body[6..].split(|&b| b == 0).collect();
    let triples = parts.chunks_exact(3);
    let leftover = triples.remainder();

    let entries: Vec<Property> = triples
        .map(|t| Property {
            name: String::from_utf8_lossy(t[0]).into_owned(),
            value: String::from_utf8_lossy(t[1]).into_owned(),
            kind: String::from_utf8_lossy(t[2]).into_owned(),
        })
        .collect();

    if leftover.iter().any(|p| !p.is_empty()) {
        debug!(
            fields = leftover.len(),
            "EHP payload ends with an incomplete triple"
        );
    }
    if usize::try_from(declared_count).ok() != Some(entries.len()) {
        debug!(
            declared = declared_count,
            decoded = entries.len(),
            "EHP count does not match decoded triples"
        );
    }

    Ok(PropertyTable {
        declared_count,
        entries,
    })
}
