//! ed5decode - recover edits from Lightworks `.ed5` logging databases
//!
//! A logging database holds a tree of framed segments. Decoding it yields
//! properties, gain envelopes and raw edit cells; the cells are paired and
//! merged into edit events which can be exported as an EDL, an MLT timeline
//! or Final Cut XML.
//!
//! ```no_run
//! use ed5decode::export::{render_edl, EdlOptions};
//! use ed5decode::reel::MediaCatalog;
//! use ed5decode::source::{EditSource, SourceOptions};
//! use std::path::Path;
//!
//! # fn main() -> ed5decode::Result<()> {
//! let options = SourceOptions::default();
//! let mut source = EditSource::open(Path::new("E00A1.ed5"), &options)?;
//! let mut media = MediaCatalog::new(".", options, 4);
//! let edl = render_edl(&mut source, &mut media, &EdlOptions::default())?;
//! print!("{}", edl);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod project;
pub mod reconcile;
pub mod reel;
pub mod source;

pub use error::{Error, Result};
