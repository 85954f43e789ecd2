use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bletrace")]
#[command(about = "Log BLE beacon sightings and summarize presence sessions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the workspace default
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Directory for the CSV partitions (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Write a default config file")]
    Init {
        #[arg(long, help = "Overwrite an existing config file")]
        force: bool,
    },

    #[command(about = "Track sightings from stdin until EOF or ctrl-c")]
    Run,

    #[command(about = "Replay a recorded capture file through the tracker")]
    Replay {
        /// Capture file of `<epoch_seconds> <address> [rssi]` lines
        capture: PathBuf,
    },

    #[command(about = "Summarize the partitions in the data directory")]
    Status,
}
