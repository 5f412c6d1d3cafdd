//! Hexdump formatting for byte-level tracing.

use std::fmt::Write;

/// Render `data` as 16-byte hexdump rows, numbering from `offset`.
///
/// Each row is `OOOO  hh hh .. hh  ascii`, with non-printable bytes shown
/// as `.`.
pub fn hexdump(data: &[u8], offset: usize) -> String {
    let mut out = String::new();

    for (row, chunk) in data.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();

        if row > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:04x}  {:<50}{}", offset + row * 16, hex.join(" "), ascii);
    }

    out
}
