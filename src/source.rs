//! Decoded `.ed5` sources.
//!
//! An [`EditSource`] holds everything decoded from one logging database: the
//! segment tree, the merged `EHP` property table, gain envelopes and the raw
//! edit cells. Project title and frame rate come from the companion project
//! index and are read on first use.

use crate::project::ProjectIndex;
use crate::reconcile::reconcile;
use crate::reel::{source_dir, ReelLookup, ReelResolver};
use crate::{Error, Result};
use bytes::Bytes;
use ed5_common::paths::project_index_file_name;
use ed5_common::{CellEdge, EditCell, EditEvent};
use ed5_format::{parse_segments, DecodeOptions, GainEnvelope, Payload, Segment, TimeEdge};
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Property naming the project cookie.
pub const PROJECT_COOKIE: &str = "PROJECT_COOKIE";

/// Prefix of properties holding the recorded media path.
pub const ORIGINAL_FILE_PREFIX: &str = "ORIGINAL_FILE";

/// Title used when the project index cannot be read.
pub const UNKNOWN_TITLE: &str = "unknown";

/// Options for loading sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    pub decode: DecodeOptions,
    /// Frame rate used when the project index gives none.
    pub default_frame_rate: u32,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            default_frame_rate: 25,
        }
    }
}

impl From<&crate::config::DecodeConfig> for SourceOptions {
    fn from(config: &crate::config::DecodeConfig) -> Self {
        Self {
            decode: DecodeOptions {
                trace_bytes: config.trace_bytes,
            },
            default_frame_rate: config.default_frame_rate,
        }
    }
}

/// Project level information for a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub title: String,
    pub frame_rate: u32,
}

/// One decoded logging database.
#[derive(Debug)]
pub struct EditSource {
    path: PathBuf,
    segments: Vec<Segment>,
    properties: BTreeMap<String, String>,
    titles: Vec<String>,
    gain_envelopes: Vec<GainEnvelope>,
    cells: Vec<EditCell>,
    default_frame_rate: u32,
    project: OnceCell<ProjectInfo>,
    events: Option<Vec<EditEvent>>,
}

impl EditSource {
    /// Read and decode a file, resolving reels against its directory.
    pub fn open(path: &Path, options: &SourceOptions) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        let resolver = ReelResolver::for_source(path);
        Self::from_bytes(path, Bytes::from(data), options, &resolver)
    }

    /// Decode an in-memory buffer. `path` names the source for reporting
    /// and for locating the project index.
    pub fn from_bytes(
        path: impl Into<PathBuf>,
        data: Bytes,
        options: &SourceOptions,
        reels: &impl ReelLookup,
    ) -> Result<Self> {
        let path = path.into();
        let segments = parse_segments(&data, &options.decode)?;

        let mut source = Self {
            path,
            segments: Vec::new(),
            properties: BTreeMap::new(),
            titles: Vec::new(),
            gain_envelopes: Vec::new(),
            cells: Vec::new(),
            default_frame_rate: options.default_frame_rate,
            project: OnceCell::new(),
            events: None,
        };

        for sub in segments.iter().flat_map(|s| s.children.iter()) {
            match &sub.payload {
                Payload::Title(title) => source.titles.push(title.clone()),
                Payload::Properties(table) => {
                    for (name, value) in table.pairs() {
                        source.properties.insert(name.to_string(), value.to_string());
                    }
                }
                Payload::GainEnvelope(env) => {
                    for point in &env.points {
                        debug!(
                            t = point.time,
                            level = point.level,
                            "gain={:3.1} dB (approximate)",
                            point.approx_db()
                        );
                    }
                    source.gain_envelopes.push(env.clone());
                }
                Payload::EditRecord(block) => {
                    for record in &block.records {
                        let edge = match record.edge {
                            TimeEdge::In { rec, src } => Some(CellEdge::In { rec, src }),
                            TimeEdge::Out { rec, src } => Some(CellEdge::Out { rec, src }),
                            TimeEdge::Unknown(sel) => {
                                error!(
                                    offset = sub.frame.offset,
                                    "time selector \"0x{:x}\" unknown",
                                    sel
                                );
                                None
                            }
                        };
                        source.cells.push(EditCell {
                            track: block.track.clone(),
                            edge,
                            reel: reels.resolve(record.reel),
                            scope: record.scope,
                            id1: record.id1,
                            id2: record.id2,
                            speed: record.speed,
                        });
                    }
                }
                Payload::Unknown(_) => {}
            }
        }
        source.segments = segments;

        debug!(
            path = ?source.path,
            segments = source.segments.len(),
            properties = source.properties.len(),
            cells = source.cells.len(),
            "decoded source"
        );
        Ok(source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the source, e.g. `E00A1.ed5`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Cookie of the source, its file stem.
    pub fn cookie(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Titles from `T` subsegments.
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn gain_envelopes(&self) -> &[GainEnvelope] {
        &self.gain_envelopes
    }

    /// Raw edit cells in decode order.
    pub fn cells(&self) -> &[EditCell] {
        &self.cells
    }

    /// First recorded original media path.
    pub fn original_file(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(name, _)| name.starts_with(ORIGINAL_FILE_PREFIX))
            .map(|(_, value)| value.as_str())
    }

    /// Distinct media cookies referenced by the raw cells, in first-seen order.
    pub fn media_reels(&self) -> Vec<String> {
        let mut cookies: Vec<String> = Vec::new();
        for cookie in self.cells.iter().filter_map(|c| c.reel.cookie()) {
            if !cookies.iter().any(|c| c == cookie) {
                cookies.push(cookie.to_string());
            }
        }
        cookies
    }

    /// Edit name: the `name` property without its first three words.
    pub fn edit_name(&self) -> String {
        match self.property("name") {
            Some(name) => name.splitn(4, ' ').last().unwrap_or(name).to_string(),
            None => "unknown edit".to_string(),
        }
    }

    /// Project title and frame rate, read from the project index on first use.
    pub fn project_info(&self) -> &ProjectInfo {
        self.project.get_or_init(|| self.load_project_info())
    }

    pub fn frame_rate(&self) -> u32 {
        self.project_info().frame_rate
    }

    fn load_project_info(&self) -> ProjectInfo {
        let fallback = ProjectInfo {
            title: UNKNOWN_TITLE.to_string(),
            frame_rate: self.default_frame_rate,
        };

        let Some(file_name) = self.property(PROJECT_COOKIE).and_then(project_index_file_name)
        else {
            error!(path = ?self.path, "no {} property, project info unavailable", PROJECT_COOKIE);
            return fallback;
        };

        let index_path = source_dir(&self.path).join(file_name);
        match ProjectIndex::open(&index_path) {
            Ok(index) => {
                let info = ProjectInfo {
                    title: index.project_name().unwrap_or(UNKNOWN_TITLE).to_string(),
                    frame_rate: index.frame_rate().unwrap_or(self.default_frame_rate),
                };
                info!(title = %info.title, fps = info.frame_rate, "read project info");
                info
            }
            Err(e) => {
                error!("{}", Error::project_index(&index_path, e.to_string()));
                fallback
            }
        }
    }

    /// Reconcile the raw cells into edit events.
    ///
    /// The result is cached, so repeated calls return the same events.
    pub fn prepare(&mut self) -> Result<&[EditEvent]> {
        if self.events.is_none() {
            self.events = Some(reconcile(&self.cells)?);
        }
        Ok(self.events.as_deref().unwrap_or_default())
    }

    /// Reconciled events, if [`prepare`](Self::prepare) has succeeded.
    pub fn events(&self) -> Option<&[EditEvent]> {
        self.events.as_deref()
    }

    /// Serializable overview of the decoded data.
    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            path: self.path.clone(),
            cookie: self.cookie(),
            project: self.project_info().clone(),
            segments: self
                .segments
                .iter()
                .map(|s| SegmentSummary {
                    offset: s.frame.offset,
                    label: s.frame.header.label_str().into_owned(),
                    children: s
                        .children
                        .iter()
                        .map(|c| ChildSummary {
                            offset: c.frame.offset,
                            label: c.label(),
                            kind: format!("{:?}", c.payload.kind()),
                        })
                        .collect(),
                })
                .collect(),
            properties: self.properties.clone(),
            gain: self
                .gain_envelopes
                .iter()
                .flat_map(|e| e.points.iter())
                .map(|p| GainSummary {
                    time: p.time,
                    level: p.level,
                    approx_db: p.approx_db(),
                })
                .collect(),
            cells: self.cells.clone(),
            events: self.events.clone(),
        }
    }
}

/// JSON overview of a source.
#[derive(Debug, Serialize)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub cookie: String,
    pub project: ProjectInfo,
    pub segments: Vec<SegmentSummary>,
    pub properties: BTreeMap<String, String>,
    pub gain: Vec<GainSummary>,
    pub cells: Vec<EditCell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EditEvent>>,
}

/// Gain envelope point with its approximate dB level.
#[derive(Debug, Serialize)]
pub struct GainSummary {
    pub time: f64,
    pub level: u32,
    pub approx_db: f64,
}

#[derive(Debug, Serialize)]
pub struct SegmentSummary {
    pub offset: usize,
    pub label: String,
    pub children: Vec<ChildSummary>,
}

#[derive(Debug, Serialize)]
pub struct ChildSummary {
    pub offset: usize,
    pub label: String,
    pub kind: String,
}
