//! Shared fixtures for integration tests.
//!
//! Builds `.ed5` byte streams from parts and lays out project directories
//! with an index, edits and media items in a temporary directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SELECT_IN: i32 = 1;
pub const SELECT_OUT: i32 = 4;
pub const REEL_BLACK: i32 = 1;
pub const REEL_DISSOLVE: i32 = 0xb655;

/// Reel code whose cookie suffix is `0010`.
pub const REEL_0010: i32 = 36;
/// Reel code whose cookie suffix is `0020`.
pub const REEL_0020: i32 = 72;
/// Reel code whose cookie suffix is `0030`.
pub const REEL_0030: i32 = 108;

/// Raw frame: label, NUL, two flag bytes, `a`, `b`, payload.
pub fn frame(label: &[u8], a: i32, b: i32, payload: &[u8]) -> Vec<u8> {
    let mut out = label.to_vec();
    out.push(0);
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&a.to_le_bytes());
    out.extend_from_slice(&b.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Top-level segment with a small index ahead of its children.
pub fn segment(children: &[Vec<u8>]) -> Vec<u8> {
    let index = [0xee; 4];
    let mut payload = index.to_vec();
    payload.extend(children.concat());
    frame(b"$", index.len() as i32, payload.len() as i32, &payload)
}

pub fn subsegment(label: &[u8], payload: &[u8]) -> Vec<u8> {
    frame(label, payload.len() as i32, 0, payload)
}

/// `EHP` subsegment holding string properties.
pub fn ehp(pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut body = vec![0, 0];
    body.extend_from_slice(&(pairs.len() as i32).to_le_bytes());
    for (name, value) in pairs {
        for field in [*name, *value, "s"] {
            body.extend_from_slice(field.as_bytes());
            body.push(0);
        }
    }
    subsegment(b"EHP", &body)
}

/// One 64 byte edit record.
pub fn record(selector: i32, rec: f64, src: f64, reel: i32) -> Vec<u8> {
    let mut out = vec![0u8; 64];
    out[12..16].copy_from_slice(&1.0f32.to_le_bytes());
    out[16..24].copy_from_slice(&rec.to_le_bytes());
    out[24..32].copy_from_slice(&src.to_le_bytes());
    out[32..36].copy_from_slice(&reel.to_le_bytes());
    out[42] = b'V';
    out[44..48].copy_from_slice(&selector.to_le_bytes());
    out
}

/// In and out records of one cut.
pub fn cut(reel: i32, rec: (f64, f64), src: (f64, f64)) -> Vec<Vec<u8>> {
    vec![
        record(SELECT_IN, rec.0, src.0, reel),
        record(SELECT_OUT, rec.1, src.1, reel),
    ]
}

/// `C` subsegment for one track.
pub fn edit_block(track: &str, records: &[Vec<u8>]) -> Vec<u8> {
    let mut body = vec![2u8];
    for field in ["ref", track, "", ""] {
        body.extend_from_slice(field.as_bytes());
        body.push(0);
    }
    body.extend_from_slice(&0.0f64.to_le_bytes());
    body.extend_from_slice(&(records.len() as u32).to_le_bytes());
    let mut index = [0u8; 17];
    index[..4].copy_from_slice(&(records.len() as u32).to_le_bytes());
    body.extend_from_slice(&index);
    for r in records {
        body.extend_from_slice(r);
    }
    subsegment(b"C", &body)
}

/// Temporary project directory.
pub struct ProjectDir {
    dir: TempDir,
}

impl ProjectDir {
    /// Directory with an `O0001.odb` index for project `P0001`.
    pub fn new(title: &str, rate: &str, edits: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut odb = format!(
            "PROJECT_NAME:\"{}\"\nPROJECT_RATE:\"{}\",\n5,5,20\nstr,str,str\nCookie,Type,Name\n",
            title, rate
        );
        for cookie in edits {
            odb.push_str(&format!("{},edit,\"{}\"\n", cookie, cookie));
        }
        fs::write(dir.path().join("O0001.odb"), odb).expect("write index");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, data: &[u8]) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, data).expect("write fixture");
        path
    }

    /// Edit `<cookie>.ed5` in project `P0001` with the given edit blocks.
    pub fn write_edit(&self, cookie: &str, name: &str, blocks: &[Vec<u8>]) -> PathBuf {
        let mut children = vec![ehp(&[("PROJECT_COOKIE", "P0001"), ("name", name)])];
        children.extend(blocks.iter().cloned());
        self.write(&format!("{}.ed5", cookie), &segment(&children))
    }

    /// Media item `<cookie>.ed5` recording `original` as its file.
    pub fn write_media(&self, cookie: &str, original: &str) -> PathBuf {
        let children = vec![ehp(&[("ORIGINAL_FILE_0", original)])];
        self.write(&format!("{}.ed5", cookie), &segment(&children))
    }
}

/// Project used across tests: `E0001` cuts from black to `S0010` on
/// `V1` and `A1`.
pub fn harbour_project() -> ProjectDir {
    let project = ProjectDir::new("Harbour", "25", &["E0001"]);
    let mut video = cut(REEL_BLACK, (0.0, 2.0), (0.0, 2.0));
    video.extend(cut(REEL_0010, (2.0, 5.0), (10.0, 13.0)));
    project.write_edit(
        "E0001",
        "Edit 1 of Harbour Story",
        &[
            edit_block("V1", &video),
            edit_block("A1", &cut(REEL_0010, (2.0, 5.0), (10.0, 13.0))),
        ],
    );
    project.write_media("S0010", "/media/Take 1.mov");
    project
}
