use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use logweave_engine::RecordFraming;

#[derive(Parser)]
#[command(
    name = "logweave",
    about = "Merge timestamped test logs into one chronological stream",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge log files into one file ordered by timestamp
    Merge(MergeArgs),
    /// Show the component label and timestamp format of log files
    Detect(DetectArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Log files, or directories whose files are all merged
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Destination file; created or truncated
    #[arg(short, long)]
    pub output: PathBuf,
    /// TOML file with merge settings
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Rescan one timestamp width on every read
    #[arg(long, conflicts_with = "fast")]
    pub precise: bool,
    /// Scan only freshly read text
    #[arg(long)]
    pub fast: bool,
    #[arg(long)]
    pub framing: Option<FramingArg>,
    #[arg(long)]
    pub progress_units: Option<u64>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FramingArg {
    Echoed,
    Labelled,
}

impl From<FramingArg> for RecordFraming {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Echoed => RecordFraming::Echoed,
            FramingArg::Labelled => RecordFraming::Labelled,
        }
    }
}

#[derive(Args)]
pub struct DetectArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}
