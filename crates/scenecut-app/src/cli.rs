//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// SceneCut: detect scene cuts in a video and write an EDL
#[derive(Parser, Debug)]
#[command(name = "scenecut")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (JSON)
    #[arg(long, global = true, env = "SCENECUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract frames from a video, detect cuts and write trace and EDL
    Detect(DetectArgs),

    /// Detect cuts on an existing numbered image sequence
    Scan(ScanArgs),

    /// Print source metadata as JSON
    Probe(ProbeArgs),

    /// Report the external tools in use
    Doctor,
}

/// Options shared by `detect` and `scan`
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// ECR score above which a cut is declared
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Minimum frames between cuts (1 disables suppression)
    #[arg(long)]
    pub min_cut_distance: Option<u64>,

    /// Directory for the trace and EDL files
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Also write the EDL as JSON
    #[arg(long)]
    pub json: bool,

    /// Read frames on the calling thread instead of prefetching
    #[arg(long)]
    pub no_prefetch: bool,
}

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Video file
    pub video: PathBuf,

    /// Wait for extraction to finish before reading frames
    #[arg(long)]
    pub blocking: bool,

    /// Frame downscale factor
    #[arg(long)]
    pub downscale: Option<u32>,

    /// Directory under which the scratch directory is created
    #[arg(long)]
    pub scratch_root: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunOptions,
}

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory holding `<stem>_<index>.<ext>` files
    pub dir: PathBuf,

    /// File name stem of the sequence
    #[arg(long)]
    pub stem: String,

    /// Frame rate of the sequence (e.g. 25, 29.97)
    #[arg(long)]
    pub fps: f64,

    /// Timecode of the first frame
    #[arg(long, default_value = "00:00:00:00")]
    pub start: String,

    /// Digits in the frame index
    #[arg(long, default_value = "5")]
    pub digits: usize,

    /// Image file extension
    #[arg(long, default_value = "jpg")]
    pub extension: String,

    /// Title and clip name used in the outputs (defaults to the stem)
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub run: RunOptions,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video file
    pub video: PathBuf,
}
