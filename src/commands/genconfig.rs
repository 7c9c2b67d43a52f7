//! Default configuration generation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{generate_config, portable_config_path, user_config_path};
use crate::fs_abstraction::{real_fs, FileSystem};

/// Run the genconfig command
pub fn run(out: Option<&Path>) -> Result<()> {
    let fs = real_fs();
    let target = choose_target(out, user_config_path(), fs)?;

    generate_config(&target, fs)
        .with_context(|| format!("Failed to write configuration to {}", target.display()))?;

    info!("Wrote default configuration to {}", target.display());
    println!("{}", target.display());
    Ok(())
}

/// Pick where the default configuration goes.
///
/// An explicit `--out` is always used. Otherwise the user config dir, unless
/// it already holds a config. `./config.toml` is only used when no user config
/// dir is known, since it would shadow the user config during discovery.
fn choose_target(
    out: Option<&Path>,
    user: Option<PathBuf>,
    fs: &dyn FileSystem,
) -> Result<PathBuf> {
    if let Some(out) = out {
        return Ok(out.to_path_buf());
    }

    if let Some(user) = user {
        if fs.exists(&user) {
            bail!(
                "{} already exists. Try again using the --out flag",
                user.display()
            );
        }
        return Ok(user);
    }

    let portable = portable_config_path();
    if !fs.exists(&portable) {
        return Ok(portable);
    }

    bail!("Could not determine where to put the configuration file. Try again using the --out flag")
}
