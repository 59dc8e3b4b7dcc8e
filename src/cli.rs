//! Command-line interface for claque
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Synchronized crowd-cue engine
#[derive(Parser, Debug)]
#[command(name = "claque", version, about = "Synchronized crowd-cue engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a share code and print the event
    Decode {
        /// The share code (with or without the version prefix)
        code: String,

        /// Print the raw embedded JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Encode an event JSON file (or stdin) into a share code
    Encode {
        /// Path to an event JSON file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Show compression statistics for an event
    Stats {
        /// Path to an event JSON file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Run a practice session on the console
    Simulate {
        /// Share code to simulate; mutually exclusive with --file
        #[arg(long, value_name = "CODE", conflicts_with = "file")]
        code: Option<String>,

        /// Path to an event JSON file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Practice speed multiplier (1.0–5.0)
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Seconds of lead-in before the first action
        #[arg(long, default_value = "8")]
        lead: i64,

        /// Suppress spoken output, keep the visual feed
        #[arg(long)]
        mute: bool,
    },
}
