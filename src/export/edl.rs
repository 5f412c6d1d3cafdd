//! Edit decision list export.
//!
//! Two dialects are written: CMX3600 and the narrower Grass Valley (GVG)
//! layout. Both go through the same steps:
//!
//! 1. keep only the `V1 V2 A1 A2 A3 A4` channels and merge again
//! 2. map each event's channels to the dialect's channel code
//! 3. number events; a dissolve turns the following event into a `D` edit
//!    sharing the previous number
//! 4. reorder numbered groups by record-in time ("A-mode") and renumber
//! 5. resolve media reels to clip names and format the lines

use crate::export::media_path;
use crate::reconcile::merge_tracks;
use crate::reel::MediaLookup;
use crate::source::EditSource;
use crate::{Error, Result};
use ed5_common::paths::{basename, short_clip_name};
use ed5_common::{frames_at, Channel, EditEvent, Operation, Reel, Timecode, Transition};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{error, warn};

/// EDL layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdlDialect {
    #[default]
    Cmx3600,
    /// Grass Valley: 4 digit numbers, 6 character reels and channel codes.
    Gvg,
}

impl EdlDialect {
    fn reel_width(&self) -> usize {
        match self {
            Self::Cmx3600 => 8,
            Self::Gvg => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdlOptions {
    pub dialect: EdlDialect,
    /// Use the clip's file name as reel instead of `AX`.
    pub clipnames: bool,
    /// Leave black filler out.
    pub skip_black: bool,
}

/// Values for the `TITLE:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdlHeader {
    pub title: String,
    pub edit_name: String,
    pub file_name: String,
    pub frame_rate: u32,
}

impl EdlHeader {
    pub fn from_source(source: &EditSource) -> Self {
        let info = source.project_info();
        Self {
            title: info.title.clone(),
            edit_name: source.edit_name(),
            file_name: source.file_name(),
            frame_rate: info.frame_rate,
        }
    }

    fn lines(&self, dialect: EdlDialect) -> Vec<String> {
        let mut lines = vec![format!(
            "TITLE: {} -- {} ({}) FRAMERATE: {}",
            self.title, self.edit_name, self.file_name, self.frame_rate
        )];
        if dialect == EdlDialect::Gvg {
            lines.push("GVG EDL [WARNING: ONLY 6 BYTES OF COOKIES USED]".to_string());
            lines.push("SMPTE FRAME CODE".to_string());
        }
        lines
    }
}

/// Reconcile a source and render it as an EDL.
pub fn render_edl(
    source: &mut EditSource,
    media: &mut dyn MediaLookup,
    options: &EdlOptions,
) -> Result<String> {
    let events = source.prepare()?.to_vec();
    let header = EdlHeader::from_source(source);
    Ok(render_events(&events, &header, media, options))
}

/// Render reconciled events as an EDL document.
pub fn render_events(
    events: &[EditEvent],
    header: &EdlHeader,
    media: &mut dyn MediaLookup,
    options: &EdlOptions,
) -> String {
    let fps = header.frame_rate;
    let mut numbered = number_events(filter_channels(events), fps);
    // black is dropped only after dissolves have been absorbed
    if options.skip_black {
        numbered.retain(|entry| entry.event.reel != Reel::Black);
    }
    let entries = a_mode(numbered);

    let mut lines = header.lines(options.dialect);
    lines.push(String::new());

    let mut reels = ReelNames::new(options);
    for entry in &entries {
        let (reel, from_clip) = reels.field(&entry.event.reel, media);
        format_entry(entry, &reel, fps, options.dialect, &mut lines);
        if let Some(base) = from_clip {
            lines.push(format!("* FROM CLIP NAME: {}", base));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Drop track labels that are not EDL channels, logging each distinct one
/// once, then merge events that became identical.
pub fn filter_channels(events: &[EditEvent]) -> Vec<EditEvent> {
    let mut reported = HashSet::new();
    let mut kept = Vec::with_capacity(events.len());

    for event in events {
        let mut valid = Vec::new();
        for label in event.tracks() {
            match label.parse::<Channel>() {
                Ok(_) => valid.push(label),
                Err(e) => {
                    if reported.insert(label.to_string()) {
                        error!("{}", Error::from(e));
                    }
                }
            }
        }
        if valid.is_empty() {
            continue;
        }
        let mut event = event.clone();
        event.track = valid.join(" ");
        kept.push(event);
    }

    merge_tracks(kept)
}

/// CMX3600 channel code and optional auxiliary audio annotation.
///
/// `V2` counts as `V1`. Every subset of `A1 A2 V1` has a code.
pub fn cmx_channel_code(channels: &[Channel]) -> (&'static str, Option<&'static str>) {
    let mut set: BTreeSet<Channel> = channels.iter().copied().collect();
    if set.remove(&Channel::V2) {
        set.insert(Channel::V1);
    }
    let has = |c: Channel| set.contains(&c);

    let code = match (has(Channel::A1), has(Channel::A2), has(Channel::V1)) {
        (false, false, false) => "NONE",
        (true, false, false) => "A",
        (true, false, true) => "B",
        (false, false, true) => "V",
        (false, true, false) => "A2",
        (false, true, true) => "A2/V",
        (true, true, false) => "AA",
        (true, true, true) => "AA/V",
    };
    let aud = match (has(Channel::A3), has(Channel::A4)) {
        (true, false) => Some("AUD  3"),
        (false, true) => Some("AUD  4"),
        (true, true) => Some("AUD  3  4"),
        (false, false) => None,
    };

    (code, aud)
}

/// GVG channel code: `V1` written as `V`, labels sorted and concatenated,
/// and every `A` after the first character dropped (`V1 A1 A2` is `A12V`).
pub fn gvg_channel_code(channels: &[Channel]) -> String {
    let mut labels: Vec<&str> = channels
        .iter()
        .map(|c| match c {
            Channel::V1 => "V",
            other => other.as_str(),
        })
        .collect();
    labels.sort_unstable();
    let joined = labels.concat();

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => std::iter::once(first)
            .chain(chars.filter(|&c| c != 'A'))
            .collect(),
        None => String::new(),
    }
}

/// Event with its EDL number.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedEvent {
    pub number: u32,
    pub event: EditEvent,
}

/// Number events and absorb dissolves into the event that follows them.
pub fn number_events(events: Vec<EditEvent>, fps: u32) -> Vec<NumberedEvent> {
    let mut numbered = Vec::with_capacity(events.len());
    let mut num = 1u32;
    let mut pending = events.into_iter();

    while let Some(event) = pending.next() {
        if event.reel != Reel::Dissolve {
            numbered.push(NumberedEvent { number: num, event });
            num += 1;
            continue;
        }

        let Some(mut next) = pending.next() else {
            warn!(rec_in = event.rec_in, "dissolve has no following event, dropped");
            break;
        };
        next.transition = Some(Transition {
            operation: Operation::Dissolve,
            duration_frames: frames_at(event.src_out, fps).max(0) as u32,
        });
        next.rec_in = event.rec_in;
        numbered.push(NumberedEvent {
            number: num.saturating_sub(1),
            event: next,
        });
    }

    numbered
}

/// Group events by number, order the groups by the record-in time of their
/// first member and renumber from 1.
pub fn a_mode(entries: Vec<NumberedEvent>) -> Vec<NumberedEvent> {
    let mut groups: Vec<(u32, Vec<NumberedEvent>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(n, _)| *n == entry.number) {
            Some((_, members)) => members.push(entry),
            None => groups.push((entry.number, vec![entry])),
        }
    }

    groups.sort_by(|a, b| a.1[0].event.rec_in.total_cmp(&b.1[0].event.rec_in));

    groups
        .into_iter()
        .enumerate()
        .flat_map(|(n, (_, members))| {
            members.into_iter().map(move |mut entry| {
                entry.number = n as u32 + 1;
                entry
            })
        })
        .collect()
}

fn format_entry(
    entry: &NumberedEvent,
    reel: &str,
    fps: u32,
    dialect: EdlDialect,
    lines: &mut Vec<String>,
) {
    let event = &entry.event;
    let channels = event.channels().unwrap_or_default();
    let (operation, duration) = match event.transition {
        Some(t) => (t.operation.code(), format!("{:03}", t.duration_frames)),
        None => (Operation::Cut.code(), String::new()),
    };
    let times = [event.src_in, event.src_out, event.rec_in, event.rec_out]
        .map(|t| Timecode::from_seconds(t, fps).to_string())
        .join(" ");

    match dialect {
        EdlDialect::Cmx3600 => {
            let (code, aud) = cmx_channel_code(&channels);
            lines.push(
                format!(
                    "{:03}  {:<8}  {:<4}  {:<4} {:>3} {}",
                    entry.number, reel, code, operation, duration, times
                )
                .trim_end()
                .to_string(),
            );
            if let Some(aud) = aud {
                lines.push(aud.to_string());
            }
        }
        EdlDialect::Gvg => {
            let code = gvg_channel_code(&channels);
            lines.push(
                format!(
                    "{:04} {:<6} {:<6} {:<4} {:>3} {}",
                    entry.number, reel, code, operation, duration, times
                )
                .trim_end()
                .to_string(),
            );
        }
    }
}

/// Reel field and clip name per reel, resolved once per cookie.
struct ReelNames<'a> {
    options: &'a EdlOptions,
    cache: HashMap<String, (String, Option<String>)>,
}

impl<'a> ReelNames<'a> {
    fn new(options: &'a EdlOptions) -> Self {
        Self {
            options,
            cache: HashMap::new(),
        }
    }

    fn field(&mut self, reel: &Reel, media: &mut dyn MediaLookup) -> (String, Option<String>) {
        let gvg = self.options.dialect == EdlDialect::Gvg;
        let cookie = match reel {
            Reel::Black if gvg => return ("BLK".to_string(), None),
            Reel::Cookie(cookie) => cookie,
            other => return (other.to_string(), None),
        };
        if let Some(hit) = self.cache.get(cookie) {
            return hit.clone();
        }

        // GVG reels only hold 6 characters; the cookie prefix is dropped.
        let short_cookie = if gvg {
            cookie.get(2..).unwrap_or(cookie)
        } else {
            cookie.as_str()
        };

        let resolved = match media_path(media, cookie) {
            Some(path) => {
                let base = basename(&path).to_string();
                let field = if self.options.clipnames {
                    let short = short_clip_name(&base);
                    if short.chars().count() > self.options.dialect.reel_width() {
                        warn!("filename too long for EDL: {}", base);
                        short_cookie.to_string()
                    } else {
                        short
                    }
                } else {
                    "AX".to_string()
                };
                (field, Some(base))
            }
            None => (cookie.clone(), None),
        };

        self.cache.insert(cookie.clone(), resolved.clone());
        resolved
    }
}
