//! ed5-common: shared edit types, timecodes and path utilities.
//!
//! - **Edit model**: [`EditCell`] fragments, reconciled [`EditEvent`]s,
//!   [`Reel`] sentinels and EDL [`Channel`]s
//! - **Timecodes**: seconds to `HH:MM:SS:FF`
//! - **Paths**: basenames of recorded media paths, cookie file names and
//!   `file://` URIs
//!
//! # Examples
//!
//! ```
//! use ed5_common::{Channel, Reel, Timecode};
//!
//! assert_eq!(Reel::Black.to_string(), "BL");
//! assert!("V2".parse::<Channel>().is_ok());
//! assert_eq!(Timecode::from_seconds(61.0, 25).to_string(), "00:01:01:00");
//! ```

pub mod error;
pub mod paths;
pub mod timecode;
pub mod types;

pub use error::{Error, Result};
pub use timecode::{frames_at, Timecode};
pub use types::*;
