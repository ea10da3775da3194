use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ebmlcast")]
#[command(author, version, about = "Re-segment live WebM streams")]
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
    /// Split a WebM file into initialization and media segment files
    Split {
        /// Input file, or - for stdin
        #[arg(required = true)]
        input: PathBuf,

        /// Directory to write segments to
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Hold each cluster back to compute its duration
        #[arg(long)]
        durations: bool,

        /// Zero cluster timecodes in the written segments
        #[arg(long)]
        redact_timecodes: bool,

        /// Ring buffer size in bytes
        #[arg(long, allow_negative_numbers = true)]
        buffer_size: Option<i64>,

        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Accept encoder connections over TCP and record each stream
    Listen {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to write stream files to
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Hold each cluster back to compute its duration
        #[arg(long)]
        durations: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
