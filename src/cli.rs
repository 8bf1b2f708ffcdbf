use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vbrindex")]
#[command(author, version, about = "Add and inspect VBRI seek indexes in MPEG audio files")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a copy of a file with a VBRI seek index inserted
    Add {
        /// MPEG audio file to index
        #[arg(required = true)]
        input: PathBuf,

        /// Output path (default: <stem>-out.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show the table layout without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Count frames and compute the duration of a file
    Scan {
        /// File to scan
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up the indexed byte offset closest before a time
    Seek {
        /// File carrying a VBRI index
        #[arg(required = true)]
        file: PathBuf,

        /// Target time in seconds
        #[arg(required = true)]
        seconds: f64,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
