use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub decode: DecodeConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecodeConfig {
    /// Frame rate used when the project index cannot be read
    #[serde(default = "default_frame_rate")]
    pub default_frame_rate: u32,

    /// Maximum nesting when following reels across files
    #[serde(default = "default_max_resolution_depth")]
    pub max_resolution_depth: usize,

    /// Hexdump every frame at trace level
    #[serde(default)]
    pub trace_bytes: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            default_frame_rate: default_frame_rate(),
            max_resolution_depth: default_max_resolution_depth(),
            trace_bytes: false,
        }
    }
}

fn default_frame_rate() -> u32 {
    25
}

fn default_max_resolution_depth() -> usize {
    4
}

/// Export defaults; the matching CLI flags can only switch these on.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Use clip file names as EDL reels
    #[serde(default)]
    pub clipnames: bool,

    /// Write Grass Valley EDLs
    #[serde(default)]
    pub gvg: bool,

    /// Leave black filler out of EDLs
    #[serde(default)]
    pub skip_black: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset and --debug is not given
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}
