//! Exporters for reconciled edits.
//!
//! - `edl` - CMX3600 and GVG edit decision lists
//! - `mlt` - MLT producer/playlist XML
//! - `fcpxml` - Final Cut Pro XML (`xmeml` version 4)

pub mod edl;
pub mod fcpxml;
pub mod mlt;

pub use edl::{render_edl, EdlDialect, EdlOptions};
pub use fcpxml::render_fcpxml;
pub use mlt::render_mlt;

use crate::reel::MediaLookup;
use crate::{Error, Result};
use ed5_common::EditEvent;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::error;

/// Target name meaning standard output.
pub const STDOUT_TARGET: &str = "-";

static VIDEO_TRACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"V[0-9]").expect("valid regex"));

/// Where an export is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn parse(target: &str) -> Self {
        if target == STDOUT_TARGET {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(target))
        }
    }

    /// Write the whole document, replacing any existing file.
    pub fn write(&self, content: &str) -> Result<()> {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(content.as_bytes())
                    .and_then(|_| out.flush())
                    .map_err(|e| Error::io(STDOUT_TARGET, e))
            }
            Self::File(path) => std::fs::write(path, content).map_err(|e| Error::io(path, e)),
        }
    }
}

/// Events grouped by the first video track label in their track field, in
/// first-seen order. Events without a video track are left out.
pub fn video_tracks(events: &[EditEvent]) -> Vec<(String, Vec<&EditEvent>)> {
    let mut tracks: Vec<(String, Vec<&EditEvent>)> = Vec::new();

    for event in events {
        let Some(label) = VIDEO_TRACK.find(&event.track).map(|m| m.as_str()) else {
            continue;
        };
        match tracks.iter_mut().find(|(l, _)| l == label) {
            Some((_, members)) => members.push(event),
            None => tracks.push((label.to_string(), vec![event])),
        }
    }

    tracks
}

/// Recorded media path for a cookie. Lookup failures and items without a
/// recorded path are logged and yield `None`.
pub(crate) fn media_path(media: &mut dyn MediaLookup, cookie: &str) -> Option<String> {
    match media.original_file(cookie) {
        Ok(Some(path)) => Some(path),
        Ok(None) => {
            error!("{}", Error::MissingMediaPath(cookie.to_string()));
            None
        }
        Err(e) => {
            error!(cookie, "{}", e);
            None
        }
    }
}

/// Indented XML document writer.
pub(crate) struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(Error::xml)?;
        Ok(Self { writer })
    }

    pub fn doctype(&mut self, name: &str) -> Result<()> {
        self.event(Event::DocType(BytesText::from_escaped(name)))
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut elem = BytesStart::new(name);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.event(Event::Start(elem))
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Element with attributes and no content, written as `<name/>`.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut elem = BytesStart::new(name);
        for attr in attrs {
            elem.push_attribute(*attr);
        }
        self.event(Event::Empty(elem))
    }

    /// Element holding text; never self-closed, even when `text` is empty.
    pub fn text(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(Error::xml)?;
        Ok(())
    }

    pub fn finish(self) -> Result<String> {
        let mut out = String::from_utf8(self.writer.into_inner()).map_err(Error::xml)?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed5_common::Reel;

    fn event(track: &str) -> EditEvent {
        EditEvent {
            reel: Reel::Black,
            track: track.to_string(),
            src_in: 0.0,
            src_out: 1.0,
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
    fn test_output_target() {
        assert_eq!(OutputTarget::parse("-"), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::parse("out.edl"),
            OutputTarget::File(PathBuf::from("out.edl"))
        );
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        OutputTarget::File(path.clone()).write("<mlt/>\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<mlt/>\n");
    }

    #[test]
    fn test_video_tracks_first_seen_order() {
        let events = vec![event("V2"), event("A1 V1"), event("A1"), event("V2 V1")];
        let tracks = video_tracks(&events);
        let labels: Vec<&str> = tracks.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["V2", "V1"]);
        assert_eq!(tracks[0].1.len(), 2);
        assert_eq!(tracks[1].1.len(), 1);
    }

    #[test]
    fn test_xml_text_is_never_self_closed() {
        let mut doc = XmlDoc::new().unwrap();
        doc.start("root", &[]).unwrap();
        doc.text("name", &[], "").unwrap();
        doc.empty("entry", &[("in", "1")]).unwrap();
        doc.end("root").unwrap();
        let xml = doc.finish().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<name></name>"));
        assert!(xml.contains("<entry in=\"1\"/>"));
        assert!(xml.ends_with("</root>\n"));
    }
}
