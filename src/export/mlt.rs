//! MLT timeline export.

use super::{media_path, video_tracks, XmlDoc};
use crate::reel::MediaLookup;
use crate::source::EditSource;
use crate::Result;
use ed5_common::{frames_at, EditEvent};
use std::path::Path;
use tracing::warn;

/// Reconcile a source and render it as an MLT document.
pub fn render_mlt(source: &mut EditSource, media: &mut dyn MediaLookup) -> Result<String> {
    let fps = source.frame_rate();
    let events = source.prepare()?;
    render_timeline(events, fps, media)
}

/// One producer per media reel, then one playlist per video track.
pub fn render_timeline(
    events: &[EditEvent],
    fps: u32,
    media: &mut dyn MediaLookup,
) -> Result<String> {
    let mut doc = XmlDoc::new()?;
    doc.start("mlt", &[])?;

    let mut seen: Vec<&str> = Vec::new();
    for cookie in events.iter().filter_map(|e| e.reel.cookie()) {
        if seen.contains(&cookie) {
            continue;
        }
        seen.push(cookie);

        let resource = producer_resource(media, cookie);
        doc.start("producer", &[("id", cookie)])?;
        doc.text("property", &[("name", "resource")], &resource)?;
        doc.end("producer")?;
    }

    for (label, members) in video_tracks(events) {
        doc.start("playlist", &[("id", label.as_str())])?;
        for event in members {
            let producer = event.reel.to_string();
            let src_in = frames_at(event.src_in, fps).to_string();
            let src_out = frames_at(event.src_out, fps).to_string();
            doc.empty(
                "entry",
                &[
                    ("producer", producer.as_str()),
                    ("in", src_in.as_str()),
                    ("out", src_out.as_str()),
                ],
            )?;
        }
        doc.end("playlist")?;
    }

    doc.end("mlt")?;
    doc.finish()
}

/// Recorded path of a clip, or its archived copy when the recorded path is
/// not on disk. Empty when nothing is recorded.
fn producer_resource(media: &mut dyn MediaLookup, cookie: &str) -> String {
    let Some(path) = media_path(media, cookie) else {
        return String::new();
    };
    if Path::new(&path).exists() {
        return path;
    }
    match media.archive_fallback(cookie) {
        Some(archived) => archived.to_string_lossy().into_owned(),
        None => {
            warn!("clip not found {}", path);
            path
        }
    }
}
