//! # shadowhosts - hosts file generator
//!
//! Builds a hosts file from remote ad/tracker blocklists plus local
//! blacklist, whitelist and redirect rules.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       shadowhosts                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── --config, --out, --mkdir, --genconfig, --dry-run     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde + toml)                                      │
//! │    └── sources, blacklist, whitelist, redirect              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls)                                 │
//! │    └── concurrent downloads, results in source order        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parser                                                     │
//! │    └── hosts-format lines, noise tolerant                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator                                                 │
//! │    └── remote < blacklist < whitelist < redirect            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Serializer                                                 │
//! │    └── sorted, byte-stable hosts text                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use shadowhosts::aggregator::build_hosts;
//! use shadowhosts::config::Config;
//! use shadowhosts::fetcher::Fetcher;
//! use shadowhosts::fs_abstraction::real_fs;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Path::new("config.toml"), real_fs())?;
//!     let directives = config.directives()?;
//!
//!     let fetcher = Fetcher::new()?;
//!     let fetches = fetcher.fetch_all(&config.sources).await;
//!
//!     let build = build_hosts(&fetches, &directives);
//!     std::fs::write("hosts", &build.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Security
//!
//! Remote lists are untrusted. Unless `allow_redirect` is set, a remote
//! entry may not point `localhost` (or any name the user redirects locally)
//! at anything other than a blocking address.
//!
//! ## Modules
//!
//! - [`aggregator`] - Merge policy and the fetch-to-bytes composition
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing, discovery and validation
//! - [`error`] - Typed errors
//! - [`fetcher`] - HTTP client for downloading lists
//! - [`fs_abstraction`] - Mockable filesystem access
//! - [`output`] - Hosts file destination handling
//! - [`parser`] - Hosts-format line tokenizer
//! - [`serializer`] - Hosts file rendering
//! - [`utils`] - Formatting helpers

pub mod aggregator;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod output;
pub mod parser;
pub mod serializer;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
