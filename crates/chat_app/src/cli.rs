use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Collects chat from CHZZK replays, keeping only the lines you ask for.
#[derive(Parser, Debug)]
#[command(name = "chat_harvester", version, about)]
pub struct Cli {
    /// RON file overriding the default endpoints and limits
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write log output to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a channel's videos, newest first
    Videos {
        /// Channel id or channel link
        channel: String,
    },
    /// Collect matching chat from one or more videos
    Collect(CollectArgs),
}

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Channel id or link; gives titles and enables --all
    #[arg(long)]
    pub channel: Option<String>,

    /// Video number to collect (repeatable)
    #[arg(long = "video", value_name = "VIDEO_NO")]
    pub videos: Vec<String>,

    /// Collect every video of --channel
    #[arg(long, requires = "channel")]
    pub all: bool,

    /// Exact nickname to keep
    #[arg(long)]
    pub nickname: Option<String>,

    /// Text the message must contain
    #[arg(long)]
    pub message: Option<String>,

    /// Write an export; `-` or no value picks a timestamped name
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    pub output: Option<PathBuf>,
}
