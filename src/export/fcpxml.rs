//! Final Cut Pro XML (`xmeml` version 4) export.
//!
//! Premiere rejects condensed `<element/>` forms in this format, so every
//! element here is written with an explicit end tag.

use super::{media_path, video_tracks, XmlDoc};
use crate::reel::MediaLookup;
use crate::source::EditSource;
use crate::Result;
use ed5_common::paths::file_uri;
use ed5_common::{frames_at, EditEvent};
use std::collections::HashMap;

/// Project level names and rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FcpProject {
    pub title: String,
    pub sequence_name: String,
    pub frame_rate: u32,
}

/// Reconcile a source and render it as an `xmeml` document.
pub fn render_fcpxml(source: &mut EditSource, media: &mut dyn MediaLookup) -> Result<String> {
    let project = FcpProject {
        title: source.project_info().title.clone(),
        sequence_name: source.edit_name(),
        frame_rate: source.frame_rate(),
    };
    let events = source.prepare()?;
    render_project(events, &project, media)
}

pub fn render_project(
    events: &[EditEvent],
    project: &FcpProject,
    media: &mut dyn MediaLookup,
) -> Result<String> {
    let mut out = FcpWriter {
        doc: XmlDoc::new()?,
        fps: project.frame_rate.to_string(),
        uid: 0,
    };

    out.doc.doctype("xmeml")?;
    out.doc.start("xmeml", &[("version", "4")])?;
    out.doc.start("project", &[])?;
    out.doc.text("name", &[], &project.title)?;
    out.doc.start("children", &[])?;

    out.doc.start("bin", &[])?;
    out.doc.text("name", &[], "Assets")?;
    out.doc.start("children", &[])?;
    let mut files: HashMap<&str, String> = HashMap::new();
    for cookie in events.iter().filter_map(|e| e.reel.cookie()) {
        if files.contains_key(cookie) {
            continue;
        }
        let path = media_path(media, cookie).unwrap_or_default();
        let file_id = out.master_clip(cookie, &path)?;
        files.insert(cookie, file_id);
    }
    out.doc.end("children")?;
    out.doc.end("bin")?;

    let sequence_id = out.next_id("sequence");
    out.doc.start("sequence", &[("id", sequence_id.as_str())])?;
    out.doc.text("name", &[], &project.sequence_name)?;
    out.rate()?;
    out.doc.start("media", &[])?;
    out.doc.start("video", &[])?;
    for (_, members) in video_tracks(events) {
        let clips: Vec<(&EditEvent, &str)> = members
            .into_iter()
            .filter_map(|e| {
                let cookie = e.reel.cookie()?;
                files.get(cookie).map(|id| (e, id.as_str()))
            })
            .collect();
        if clips.is_empty() {
            continue;
        }

        out.doc.start("track", &[])?;
        for (event, file_id) in clips {
            out.sequence_clip(event, file_id, project.frame_rate)?;
        }
        out.doc.end("track")?;
    }
    out.doc.end("video")?;
    out.doc.end("media")?;
    out.doc.end("sequence")?;

    out.doc.end("children")?;
    out.doc.end("project")?;
    out.doc.end("xmeml")?;
    out.doc.finish()
}

struct FcpWriter {
    doc: XmlDoc,
    fps: String,
    uid: u32,
}

impl FcpWriter {
    fn next_id(&mut self, prefix: &str) -> String {
        self.uid += 1;
        format!("{}-{}", prefix, self.uid)
    }

    fn rate(&mut self) -> Result<()> {
        self.doc.start("rate", &[])?;
        self.doc.text("timebase", &[], &self.fps)?;
        self.doc.text("ntsc", &[], "FALSE")?;
        self.doc.end("rate")
    }

    /// Master clip for a media cookie. Returns the id of its file element.
    fn master_clip(&mut self, cookie: &str, path: &str) -> Result<String> {
        let clipitem_id = self.next_id("clipitem");
        let file_id = self.next_id("file");

        self.doc.start("clip", &[("id", cookie)])?;
        self.doc.text("ismasterclip", &[], "TRUE")?;
        self.rate()?;
        self.doc.text("name", &[], cookie)?;
        self.doc.start("media", &[])?;
        self.doc.start("video", &[])?;
        self.doc.start("track", &[])?;
        self.doc.start("clipitem", &[("id", clipitem_id.as_str())])?;
        self.doc.start("file", &[("id", file_id.as_str())])?;
        self.doc.text("pathurl", &[], &file_uri(path))?;
        self.doc.start("media", &[])?;
        self.doc.text("video", &[], " ")?;
        self.doc.text("audio", &[], " ")?;
        self.doc.end("media")?;
        self.doc.end("file")?;
        self.doc.end("clipitem")?;
        self.doc.end("track")?;
        self.doc.end("video")?;
        self.doc.end("media")?;
        self.doc.end("clip")?;

        Ok(file_id)
    }

    fn sequence_clip(&mut self, event: &EditEvent, file_id: &str, fps: u32) -> Result<()> {
        let id = self.next_id("clipitem");
        let frames = |t: f64| frames_at(t, fps).to_string();

        self.doc.start("clipitem", &[("id", id.as_str())])?;
        self.doc.text("name", &[], &event.reel.to_string())?;
        self.doc.text("start", &[], &frames(event.rec_in))?;
        self.doc.text("end", &[], &frames(event.rec_out))?;
        self.doc.text("in", &[], &frames(event.src_in))?;
        self.doc.text("out", &[], &frames(event.src_out))?;
        self.doc.text("file", &[("id", file_id)], "")?;
        self.doc.end("clipitem")
    }
}
