//! Batch processing of input files.
//!
//! Every input is decoded and exported on its own; a failure is logged and
//! counted without stopping the rest of the batch. Documents for the same
//! output target are concatenated in input order and written at the end.

use crate::config::Config;
use crate::export::{render_edl, render_fcpxml, render_mlt, EdlDialect, EdlOptions, OutputTarget};
use crate::project::ProjectIndex;
use crate::reel::{source_dir, MediaCatalog};
use crate::source::{EditSource, SourceOptions};
use crate::Result;
use ed5_common::paths::{cookie_file_name, ODB_EXTENSION};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Which exports to produce and where.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub edl: Option<OutputTarget>,
    pub mlt: Option<OutputTarget>,
    pub fcpxml: Option<OutputTarget>,
    pub edl_options: EdlOptions,
    /// Add a JSON summary of each source to stdout.
    pub dump: bool,
}

impl ExportRequest {
    /// Apply config defaults on top of the request.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.edl_options.clipnames |= config.export.clipnames;
        self.edl_options.skip_black |= config.export.skip_black;
        if config.export.gvg {
            self.edl_options.dialect = EdlDialect::Gvg;
        }
        self
    }

    fn is_empty(&self) -> bool {
        self.edl.is_none() && self.mlt.is_none() && self.fcpxml.is_none() && !self.dump
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: usize,
}

/// Replace project indexes by the edit files they list. Other paths are
/// kept as given.
pub fn expand_inputs(files: &[PathBuf]) -> Vec<Result<PathBuf>> {
    let mut inputs = Vec::new();
    for file in files {
        let is_index = file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ODB_EXTENSION));
        if !is_index {
            inputs.push(Ok(file.clone()));
            continue;
        }

        match ProjectIndex::open(file) {
            Ok(index) => {
                let dir = source_dir(file);
                let cookies = index.edit_cookies();
                if cookies.is_empty() {
                    warn!(path = ?file, "project index lists no edits");
                }
                inputs.extend(
                    cookies
                        .into_iter()
                        .map(|cookie| Ok(dir.join(cookie_file_name(&cookie)))),
                );
            }
            Err(e) => inputs.push(Err(e)),
        }
    }
    inputs
}

/// Documents collected per output target, in first-use order.
#[derive(Debug, Default)]
pub struct Outputs {
    documents: Vec<(OutputTarget, String)>,
}

impl Outputs {
    pub fn push(&mut self, target: &OutputTarget, content: String) {
        match self.documents.iter_mut().find(|(t, _)| t == target) {
            Some((_, doc)) => doc.push_str(&content),
            None => self.documents.push((target.clone(), content)),
        }
    }

    pub fn get(&self, target: &OutputTarget) -> Option<&str> {
        self.documents
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, doc)| doc.as_str())
    }

    pub fn write_all(&self) -> Result<()> {
        for (target, content) in &self.documents {
            target.write(content)?;
        }
        Ok(())
    }
}

/// Decodes inputs and renders the requested exports.
pub struct Batch {
    request: ExportRequest,
    options: SourceOptions,
    max_depth: usize,
    catalogs: HashMap<PathBuf, MediaCatalog>,
    outputs: Outputs,
}

impl Batch {
    pub fn new(request: ExportRequest, options: SourceOptions, max_depth: usize) -> Self {
        Self {
            request,
            options,
            max_depth,
            catalogs: HashMap::new(),
            outputs: Outputs::default(),
        }
    }

    /// Batch configured from a loaded config file.
    pub fn from_config(request: ExportRequest, config: &Config) -> Self {
        Self::new(
            request.with_config(config),
            SourceOptions::from(&config.decode),
            config.decode.max_resolution_depth,
        )
    }

    /// Process every input, continuing past failures.
    pub fn run(&mut self, files: &[PathBuf]) -> BatchReport {
        if self.request.is_empty() {
            warn!("no export requested, files are only decoded");
        }

        let mut report = BatchReport::default();
        for input in expand_inputs(files) {
            let result = input.and_then(|path| {
                info!(path = ?path, "processing");
                self.process(&path)
            });
            match result {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    error!("{}", e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Decode one source and render its exports.
    ///
    /// Decoding errors abort the source. An export that fails is logged and
    /// the remaining exports still run; the first failure is returned.
    pub fn process(&mut self, path: &Path) -> Result<()> {
        let mut source = EditSource::open(path, &self.options)?;
        let mut first_error = None;

        if self.request.dump {
            // the summary is still written when the cells do not reconcile
            if let Err(e) = source.prepare() {
                first_error = Some(e);
            }
            let mut json = serde_json::to_string_pretty(&source.summary())?;
            json.push('\n');
            self.outputs.push(&OutputTarget::Stdout, json);
        }

        let options = self.options;
        let max_depth = self.max_depth;
        let dir = source_dir(path);
        let media = self
            .catalogs
            .entry(dir.clone())
            .or_insert_with(|| MediaCatalog::new(dir, options, max_depth));

        let mut record = |target: &OutputTarget, rendered: Result<String>, outputs: &mut Outputs| {
            match rendered {
                Ok(doc) => outputs.push(target, doc),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => error!(path = ?path, "{}", e),
            }
        };

        if let Some(target) = &self.request.edl {
            let rendered = render_edl(&mut source, media, &self.request.edl_options);
            record(target, rendered, &mut self.outputs);
        }
        if let Some(target) = &self.request.mlt {
            let rendered = render_mlt(&mut source, media);
            record(target, rendered, &mut self.outputs);
        }
        if let Some(target) = &self.request.fcpxml {
            let rendered = render_fcpxml(&mut source, media);
            record(target, rendered, &mut self.outputs);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Write collected documents to their targets.
    pub fn finish(self) -> Result<()> {
        self.outputs.write_all()
    }
}
