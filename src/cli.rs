//! CLI argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shadowhosts")]
#[command(
    author,
    version,
    about = "Build a hosts file from remote blocklists and local overrides"
)]
pub struct Cli {
    /// Path to a configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// File to write the hosts file (or default configuration) to. Truncated if it exists
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Create missing parent directories of --out
    #[arg(long)]
    pub mkdir: bool,

    /// Generate a default configuration and exit
    #[arg(long)]
    pub genconfig: bool,

    /// Fetch and merge, print the result instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long)]
    pub verbose: bool,
}
