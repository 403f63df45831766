use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "A deduplicating, date-organizing media library manager")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(long, default_value = "config.json", global = true)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or refresh the fingerprint index of the library
    Setup,

    /// Check the index for duplicate content, duplicate names and
    /// files modified since they were hashed
    Audit,

    /// Deduplicate, rename and move incoming files into the library
    Merge {
        /// Show the planned moves without touching the filesystem
        #[arg(long)]
        preview: bool,
    },
}

impl Commands {
    /// Command name as used in log file names.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Setup => "setup",
            Commands::Audit => "audit",
            Commands::Merge { .. } => "merge",
        }
    }
}
