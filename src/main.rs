//! shadowhosts - hosts file generator
//!
//! Merges remote blocklists with local overrides into a hosts file.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use shadowhosts::cli::Cli;
use shadowhosts::commands::generate::GenerateOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if cli.genconfig {
        return shadowhosts::commands::genconfig::run(cli.out.as_deref());
    }

    let opts = GenerateOptions {
        config: cli.config,
        out: cli.out,
        mkdir: cli.mkdir,
        dry_run: cli.dry_run,
    };
    shadowhosts::commands::generate::run(&opts).await
}
