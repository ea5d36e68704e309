use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelmatch")]
#[command(author, version, about = "Keyword-driven playlist builder for Plex libraries")]
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
    /// Scan a library section and build a playlist from keyword matches
    Scan {
        /// Term to match against titles, summaries, and keywords
        #[arg(short, long)]
        keyword: String,

        /// Name of the playlist to create or append to
        #[arg(short, long)]
        playlist: String,

        /// Library section to scan (overrides the config)
        #[arg(short, long)]
        section: Option<String>,

        /// Maximum concurrent item lookups (overrides the config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Show matches without creating or updating the playlist
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
