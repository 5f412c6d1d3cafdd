use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ed5decode")]
#[command(author, version, about = "Decode Lightworks .ed5 edit databases and export edits")]
pub struct Cli {
    /// Export as CMX3600 EDL (use "-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub edl: Option<String>,

    /// Export as MLT XML (use "-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub mlt: Option<String>,

    /// Export as Final Cut Pro XML (use "-" for stdout)
    #[arg(short = 'x', long, value_name = "FILE")]
    pub fcpxml: Option<String>,

    /// Use clip file names as EDL reel names
    #[arg(short, long)]
    pub clipnames: bool,

    /// Write the EDL in GVG format instead of CMX3600
    #[arg(short, long)]
    pub gvg_edl: bool,

    /// Leave black filler out of EDLs
    #[arg(long)]
    pub skip_black: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Print a JSON summary of each decoded file
    #[arg(long)]
    pub dump: bool,

    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Edit files (.ed5) or project indexes (.odb)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
