//! Hosts file destination handling.

use anyhow::{bail, Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::fs_abstraction::FileSystem;

/// The operating system's hosts file
pub fn default_hosts_path() -> PathBuf {
    if cfg!(windows) {
        let root = std::env::var_os("SystemRoot").unwrap_or_else(|| "C:\\Windows".into());
        PathBuf::from(root)
            .join("System32")
            .join("drivers")
            .join("etc")
            .join("hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

/// Make sure the parent directory of `out` exists, creating it if allowed.
pub fn prepare_parent(out: &Path, mkdir: bool, fs: &dyn FileSystem) -> Result<()> {
    let parent = match out.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => return Ok(()),
    };

    if fs.exists(parent) {
        return Ok(());
    }

    if !mkdir {
        bail!(
            "Parent folders of {} don't exist. Create them yourself or pass --mkdir",
            out.display()
        );
    }

    info!("Creating {}", parent.display());
    fs.create_dir_all(parent)
        .with_context(|| format!("Failed to create {}", parent.display()))
}

/// Write hosts file bytes to `out`.
pub fn write_hosts(out: &Path, bytes: &[u8], fs: &dyn FileSystem) -> Result<()> {
    match fs.write_atomic(out, bytes) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => bail!(
            "Could not write to file {} - you may need to run this program with admin privileges",
            out.display()
        ),
        Err(e) => Err(e).with_context(|| format!("Could not write to file {}", out.display())),
    }
}
