//! Reel resolution.
//!
//! Edit records reference media by a numeric reel code. The code's base 36
//! form is the tail of the referenced item's cookie, and the item's
//! logging database sits next to the edit as `<cookie>.ed5`, so resolving a
//! reel means finding the single file in the directory that ends with that
//! suffix.
//!
//! [`MediaCatalog`] goes one step further and decodes the referenced file
//! to read the original media path recorded for it.

use crate::source::{EditSource, SourceOptions};
use crate::{Error, Result};
use ed5_common::paths::{cookie_file_name, ED5_EXTENSION};
use ed5_common::Reel;
use ed5_format::ReelCode;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Maps raw reel codes to reels.
pub trait ReelLookup {
    fn resolve(&self, code: ReelCode) -> Reel;
}

/// Resolves reel codes against the files of one directory.
#[derive(Debug)]
pub struct ReelResolver {
    dir: PathBuf,
    resolved: RefCell<HashMap<ReelCode, Reel>>,
}

impl ReelResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            resolved: RefCell::new(HashMap::new()),
        }
    }

    /// Resolver for the directory holding `path`.
    pub fn for_source(path: &Path) -> Self {
        Self::new(source_dir(path))
    }

    /// Path of the logging database for `cookie`.
    pub fn cookie_path(&self, cookie: &str) -> PathBuf {
        self.dir.join(cookie_file_name(cookie))
    }

    /// Find the one cookie whose file name ends with `<suffix>.ed5`.
    pub fn find_cookie(&self, suffix: &str) -> Result<String> {
        let wanted = format!("{}.{}", suffix, ED5_EXTENSION);
        let matches: Vec<String> = self
            .file_names()
            .into_iter()
            .filter(|name| name.ends_with(&wanted))
            .collect();

        match matches.as_slice() {
            [name] => Ok(name[..name.len() - ED5_EXTENSION.len() - 1].to_string()),
            [] => Err(Error::ReelNotFound {
                suffix: suffix.to_string(),
                dir: self.dir.clone(),
            }),
            many => Err(Error::AmbiguousReel {
                suffix: suffix.to_string(),
                dir: self.dir.clone(),
                matches: many.len(),
            }),
        }
    }

    /// Archived copy of a shot: a single file named `[SV]<cookie[1..]>.*`
    /// other than a logging database.
    pub fn archive_fallback(&self, cookie: &str) -> Option<PathBuf> {
        let stem = cookie.get(1..)?;
        let database = format!(".{}", ED5_EXTENSION);
        let matches: Vec<String> = self
            .file_names()
            .into_iter()
            .filter(|name| {
                let mut chars = name.chars();
                matches!(chars.next(), Some('S' | 'V'))
                    && chars
                        .as_str()
                        .strip_prefix(stem)
                        .is_some_and(|rest| rest.starts_with('.') && rest != database)
            })
            .collect();

        match matches.as_slice() {
            [name] => Some(self.dir.join(name)),
            _ => {
                debug!(cookie, candidates = matches.len(), "no unique archive copy");
                None
            }
        }
    }

    /// Sorted names of the regular files directly inside the directory.
    fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    debug!("skipping directory entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        names
    }
}

impl ReelLookup for ReelResolver {
    fn resolve(&self, code: ReelCode) -> Reel {
        if let Some(reel) = self.resolved.borrow().get(&code) {
            return reel.clone();
        }

        let reel = match code {
            ReelCode::Black => Reel::Black,
            ReelCode::Dissolve => Reel::Dissolve,
            ReelCode::Media(_) => {
                let suffix = code.cookie_suffix().unwrap_or_default();
                match self.find_cookie(&suffix) {
                    Ok(cookie) => Reel::Cookie(cookie),
                    Err(e) => {
                        error!("{}", e);
                        Reel::Unknown
                    }
                }
            }
        };

        self.resolved.borrow_mut().insert(code, reel.clone());
        reel
    }
}

/// Directory holding a source file.
pub fn source_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Media lookups needed by the exporters.
pub trait MediaLookup {
    /// Original media path recorded for a media cookie.
    fn original_file(&mut self, cookie: &str) -> Result<Option<String>>;

    /// Archived copy used when the recorded path no longer exists.
    fn archive_fallback(&self, cookie: &str) -> Option<PathBuf>;
}

/// Lazily decoded media items, keyed by cookie.
///
/// An item without a recorded file that references exactly one other media
/// item (a subclip) is followed to that item, up to `max_depth` files deep.
pub struct MediaCatalog {
    resolver: ReelResolver,
    options: SourceOptions,
    max_depth: usize,
    cache: HashMap<String, Option<String>>,
}

impl MediaCatalog {
    pub fn new(dir: impl Into<PathBuf>, options: SourceOptions, max_depth: usize) -> Self {
        Self {
            resolver: ReelResolver::new(dir),
            options,
            max_depth,
            cache: HashMap::new(),
        }
    }

    fn lookup(&mut self, cookie: &str, chain: &mut Vec<String>) -> Result<Option<String>> {
        if let Some(hit) = self.cache.get(cookie) {
            return Ok(hit.clone());
        }
        if chain.iter().any(|c| c == cookie) || chain.len() >= self.max_depth {
            return Err(Error::ResolutionDepthExceeded {
                cookie: cookie.to_string(),
                depth: chain.len(),
            });
        }

        let path = self.resolver.cookie_path(cookie);
        debug!(cookie, path = ?path, "decoding media item");
        let item = EditSource::open(&path, &self.options)?;

        let found = match item.original_file() {
            Some(file) => Some(file.to_string()),
            None => match item.media_reels().as_slice() {
                [inner] => {
                    debug!(cookie, inner = %inner, "following subclip");
                    chain.push(cookie.to_string());
                    let inner = self.lookup(inner, chain);
                    chain.pop();
                    inner?
                }
                _ => None,
            },
        };

        self.cache.insert(cookie.to_string(), found.clone());
        Ok(found)
    }
}

impl MediaLookup for MediaCatalog {
    fn original_file(&mut self, cookie: &str) -> Result<Option<String>> {
        self.lookup(cookie, &mut Vec::new())
    }

    fn archive_fallback(&self, cookie: &str) -> Option<PathBuf> {
        let found = self.resolver.archive_fallback(cookie);
        if found.is_some() {
            warn!(cookie, "using shot from archive");
        }
        found
    }
}
