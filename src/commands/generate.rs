//! Hosts file generation: fetch, merge, write.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

use crate::aggregator::build_hosts;
use crate::config::{find_config_file, Config};
use crate::fetcher::Fetcher;
use crate::fs_abstraction::real_fs;
use crate::output::{default_hosts_path, prepare_parent, write_hosts};
use crate::utils::format_count;

/// Options for the generate command
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub mkdir: bool,
    pub dry_run: bool,
}

/// Run the generate command
pub async fn run(opts: &GenerateOptions) -> Result<()> {
    let fs = real_fs();

    let config_path = find_config_file(opts.config.as_deref(), fs)?;
    let config = Config::load(&config_path, fs)?;
    let directives = config.directives()?;

    let out = opts.out.clone().unwrap_or_else(default_hosts_path);
    if !opts.dry_run {
        prepare_parent(&out, opts.mkdir, fs)?;
    }

    info!("Fetching {} sources...", config.sources.len());
    let fetcher = Fetcher::new()?;
    let fetches = fetcher.fetch_all(&config.sources).await;

    let build = build_hosts(&fetches, &directives);
    if build.sources_failed > 0 {
        error!(
            "{} of {} sources failed to download",
            build.sources_failed,
            fetches.len()
        );
    }

    if opts.dry_run {
        std::io::stdout()
            .write_all(&build.bytes)
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    write_hosts(&out, &build.bytes, fs)?;
    println!(
        "[OK] {} entries written to {}",
        format_count(build.table.len()),
        out.display()
    );

    Ok(())
}
