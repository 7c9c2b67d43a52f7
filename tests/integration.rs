//! Integration tests driving the shadowhosts binary.
//!
//! Sources point at a closed local port, so no test touches the network.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run shadowhosts with the given arguments from `cwd`
fn run_shadowhosts(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shadowhosts"))
        .args(args)
        .current_dir(cwd)
        .env("HOME", cwd)
        .env("APPDATA", cwd)
        .output()
        .expect("Failed to execute shadowhosts")
}

/// A URL nothing is listening on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/hosts.txt", port)
}

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("test-config.toml");
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_shadowhosts(&["--help"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--genconfig"));
    assert!(stdout.contains("--mkdir"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    let output = run_shadowhosts(&["--version"], dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("shadowhosts"));
}

#[test]
fn test_genconfig_to_explicit_path() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("nested/dir/config.toml");
    let output = run_shadowhosts(
        &["--genconfig", "--out", out.to_str().unwrap()],
        dir.path(),
    );
    assert!(output.status.success(), "{:?}", output);

    let content = std::fs::read_to_string(&out).unwrap();
    assert!(content.contains("[DANGEROUS]"));
    let config = shadowhosts::Config::from_toml(&content).unwrap();
    assert_eq!(config, shadowhosts::Config::default());
}

#[test]
fn test_genconfig_to_user_dir() {
    let dir = TempDir::new().unwrap();
    let output = run_shadowhosts(&["--genconfig"], dir.path());
    assert!(output.status.success(), "{:?}", output);
    if cfg!(unix) {
        assert!(dir.path().join(".config/shadowhosts/config.toml").exists());
    }
}

#[test]
fn test_generate_with_all_sources_down() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        &format!(
            r#"
sources = ["{}"]
blacklist = ["evil.example.com"]
whitelist = ["tracker.example.com"]

[redirect]
"localhost" = "127.0.0.1"
"#,
            closed_port_url()
        ),
    );
    let out = dir.path().join("hosts");

    let output = run_shadowhosts(
        &["--config", &config, "--out", out.to_str().unwrap()],
        dir.path(),
    );
    assert!(output.status.success(), "{:?}", output);

    let hosts = std::fs::read_to_string(&out).unwrap();
    assert_eq!(hosts, "0.0.0.0 evil.example.com\n127.0.0.1 localhost\n");
}

#[test]
fn test_dry_run_prints_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "sources = []\nblacklist = [\"Ads.Example.com\"]\n");
    let out = dir.path().join("hosts");

    let output = run_shadowhosts(
        &["--config", &config, "--out", out.to_str().unwrap(), "--dry-run"],
        dir.path(),
    );
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "0.0.0.0 ads.example.com\n"
    );
    assert!(!out.exists());
}

#[test]
fn test_missing_parent_requires_mkdir() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "sources = []\nblacklist = [\"a.test\"]\n");
    let out = dir.path().join("missing/parent/hosts");

    let output = run_shadowhosts(
        &["--config", &config, "--out", out.to_str().unwrap()],
        dir.path(),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--mkdir"));

    let output = run_shadowhosts(
        &["--config", &config, "--out", out.to_str().unwrap(), "--mkdir"],
        dir.path(),
    );
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "0.0.0.0 a.test\n");
}

#[test]
fn test_invalid_redirect_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        "sources = []\n[redirect]\n\"nas.lan\" = \"not-an-ip\"\n",
    );
    let out = dir.path().join("hosts");

    let output = run_shadowhosts(
        &["--config", &config, "--out", out.to_str().unwrap()],
        dir.path(),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid redirect target"));
    assert!(!out.exists());
}

#[test]
fn test_explicit_config_missing() {
    let dir = TempDir::new().unwrap();
    let output = run_shadowhosts(&["--config", "does-not-exist.toml"], dir.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_portable_config_discovered() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "sources = []\nblacklist = [\"portable.test\"]\n",
    )
    .unwrap();

    let output = run_shadowhosts(&["--dry-run"], dir.path());
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "0.0.0.0 portable.test\n"
    );
}
