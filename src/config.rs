//! Configuration loading, discovery and validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::aggregator::Directives;
use crate::error::ConfigError;
use crate::fs_abstraction::FileSystem;
use crate::parser::{is_valid_hostname, normalize_hostname};

pub const PROGRAM_NAME: &str = "shadowhosts";
pub const CONFIG_NAME: &str = "config.toml";

/// Template written by `--genconfig`
pub const DEFAULT_CONFIG: &str = r#"# [DANGEROUS] Uncomment to allow redirection entries from remote sources
#allow_redirect = true

# Add additional sources of domains to block here
sources = [
	"https://adaway.org/hosts.txt",
	"https://hosts-file.net/ad_servers.txt",
	"https://pgl.yoyo.org/adservers/serverlist.php?hostformat=hosts&showintro=0&mimetype=plaintext"
]

# Add additional domains to block here
blacklist = []

# Add domains to unblock from online sources here
whitelist = []

# Add redirection rules here, following the example
[redirect]
	# "localhost" = "127.0.0.1"
"#;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Accept remote entries that repoint sensitive names
    pub allow_redirect: bool,

    /// Remote hosts lists, merged in this order
    pub sources: Vec<String>,

    /// Hostnames to block regardless of remote lists
    pub blacklist: Vec<String>,

    /// Hostnames never to block
    pub whitelist: Vec<String>,

    /// Hostname → IP overrides
    pub redirect: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_redirect: false,
            sources: default_sources(),
            blacklist: Vec::new(),
            whitelist: Vec::new(),
            redirect: BTreeMap::new(),
        }
    }
}

fn default_sources() -> Vec<String> {
    vec![
        "https://adaway.org/hosts.txt".to_string(),
        "https://hosts-file.net/ad_servers.txt".to_string(),
        "https://pgl.yoyo.org/adservers/serverlist.php?hostformat=hosts&showintro=0&mimetype=plaintext"
            .to_string(),
    ]
}

impl Config {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let content = fs.read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        debug!(
            "Loaded {:?}: {} sources, {} blacklisted, {} whitelisted, {} redirects",
            path,
            config.sources.len(),
            config.blacklist.len(),
            config.whitelist.len(),
            config.redirect.len()
        );

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        for source in &self.sources {
            if source.starts_with("http://") {
                warn!("Source {} is fetched over plain HTTP", source);
            } else if !source.starts_with("https://") {
                return Err(ConfigError::InvalidSource(source.clone()));
            }
        }

        check_hostnames(&self.blacklist, "blacklist")?;
        check_hostnames(&self.whitelist, "whitelist")?;
        check_hostnames(self.redirect.keys(), "redirect")?;

        for (hostname, target) in &self.redirect {
            parse_redirect_target(hostname, target)?;
        }

        Ok(())
    }

    /// Normalized, typed directives for the merge
    pub fn directives(&self) -> Result<Directives, ConfigError> {
        self.validate()?;

        let redirect = self
            .redirect
            .iter()
            .map(|(hostname, target)| {
                Ok((normalize_hostname(hostname), parse_redirect_target(hostname, target)?))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        Ok(Directives {
            blacklist: self.blacklist.iter().map(|h| normalize_hostname(h)).collect(),
            whitelist: self.whitelist.iter().map(|h| normalize_hostname(h)).collect(),
            redirect,
            allow_redirect: self.allow_redirect,
        })
    }
}

fn check_hostnames<'a, I>(names: I, field: &'static str) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = &'a String>,
{
    for name in names {
        if !is_valid_hostname(&normalize_hostname(name)) {
            return Err(ConfigError::InvalidHostname(name.clone(), field));
        }
    }
    Ok(())
}

fn parse_redirect_target(hostname: &str, target: &str) -> Result<IpAddr, ConfigError> {
    target
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidRedirect {
            hostname: hostname.to_string(),
            target: target.to_string(),
        })
}

/// `<user config dir>/shadowhosts/config.toml`, if a user config dir is known.
///
/// `$HOME/.config` on Unix-likes, `%APPDATA%` on Windows.
pub fn user_config_path() -> Option<PathBuf> {
    let base = if cfg!(windows) {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(".config"))
    };
    base.map(|dir| dir.join(PROGRAM_NAME).join(CONFIG_NAME))
}

/// Portable config next to the working directory
pub fn portable_config_path() -> PathBuf {
    Path::new(".").join(CONFIG_NAME)
}

fn system_config_path() -> Option<PathBuf> {
    if cfg!(unix) {
        Some(Path::new("/etc").join(PROGRAM_NAME).join(CONFIG_NAME))
    } else {
        None
    }
}

/// Locate the configuration file.
///
/// Search order: explicit path, `./config.toml`, the user config dir,
/// then `/etc/shadowhosts/config.toml` on Unix-likes.
pub fn find_config_file(
    explicit: Option<&Path>,
    fs: &dyn FileSystem,
) -> Result<PathBuf, ConfigError> {
    locate_config(explicit, user_config_path(), system_config_path(), fs)
}

fn locate_config(
    explicit: Option<&Path>,
    user: Option<PathBuf>,
    system: Option<PathBuf>,
    fs: &dyn FileSystem,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if !fs.exists(path) {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        return Ok(path.to_path_buf());
    }

    std::iter::once(Some(portable_config_path()))
        .chain([user, system])
        .flatten()
        .find(|candidate| fs.exists(candidate))
        .ok_or(ConfigError::NotFound)
}

/// Write the default configuration, creating parent directories
pub fn generate_config(out: &Path, fs: &dyn FileSystem) -> std::io::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)?;
    }
    fs.write_atomic(out, DEFAULT_CONFIG.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_abstraction::MockFileSystem;

    #[test]
    fn test_default_template_matches_default_config() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.allow_redirect);
        assert_eq!(config.sources.len(), 3);
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
allow_redirect = true
sources = ["https://a.test/hosts"]
blacklist = ["Evil.Example.com"]
whitelist = ["tracker.example.com"]

[redirect]
"localhost" = "127.0.0.1"
"nas.lan" = "192.168.1.10"
"#;
        let config = Config::from_toml(content).unwrap();
        assert!(config.allow_redirect);
        assert_eq!(config.redirect.len(), 2);

        let directives = config.directives().unwrap();
        assert_eq!(directives.blacklist, vec!["evil.example.com"]);
        assert_eq!(
            directives.redirect.get("nas.lan"),
            Some(&"192.168.1.10".parse::<IpAddr>().unwrap())
        );
        assert!(directives.allow_redirect);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = Config::from_toml("blacklist = [\"a.test\"]").unwrap();
        assert_eq!(config.sources, default_sources());
        assert!(config.redirect.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::from_toml("allow_redirects = true").is_err());
    }

    #[test]
    fn test_invalid_redirect_ip_rejected() {
        let config = Config {
            redirect: BTreeMap::from([("localhost".to_string(), "127.0.0.300".to_string())]),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRedirect { .. })
        ));
        assert!(config.directives().is_err());
    }

    #[test]
    fn test_invalid_hostname_rejected() {
        let config = Config {
            blacklist: vec!["bad host".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHostname(_, "blacklist"))
        ));
    }

    #[test]
    fn test_fully_qualified_names_accepted() {
        let config = Config {
            blacklist: vec!["Ads.Example.com.".to_string()],
            redirect: BTreeMap::from([("nas.lan.".to_string(), "192.168.1.10".to_string())]),
            ..Default::default()
        };
        let directives = config.directives().unwrap();
        assert_eq!(directives.blacklist, vec!["ads.example.com"]);
        assert!(directives.redirect.contains_key("nas.lan"));
    }

    #[test]
    fn test_source_scheme_validation() {
        let config = Config {
            sources: vec!["ftp://lists.test/hosts".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSource(_))));

        let config = Config {
            sources: vec!["http://lists.test/hosts".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_reads_through_fs() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_to_string()
            .withf(|p| p == Path::new("/cfg/config.toml"))
            .returning(|_| Ok("sources = []\nblacklist = [\"a.test\"]".to_string()));

        let config = Config::load(Path::new("/cfg/config.toml"), &fs).unwrap();
        assert!(config.sources.is_empty());
        assert_eq!(config.blacklist, vec!["a.test"]);
    }

    #[test]
    fn test_load_parse_error() {
        let mut fs = MockFileSystem::new();
        fs.expect_read_to_string()
            .returning(|_| Ok("sources = [".to_string()));
        assert!(matches!(
            Config::load(Path::new("config.toml"), &fs),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_locate_explicit_missing() {
        let mut fs = MockFileSystem::new();
        fs.expect_exists().returning(|_| false);
        assert!(matches!(
            locate_config(Some(Path::new("/nope.toml")), None, None, &fs),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_locate_prefers_portable() {
        let mut fs = MockFileSystem::new();
        fs.expect_exists().returning(|_| true);
        let found = locate_config(
            None,
            Some(PathBuf::from("/home/u/.config/shadowhosts/config.toml")),
            None,
            &fs,
        )
        .unwrap();
        assert_eq!(found, portable_config_path());
    }

    #[test]
    fn test_locate_falls_back_to_system() {
        let mut fs = MockFileSystem::new();
        fs.expect_exists()
            .returning(|p| p == Path::new("/etc/shadowhosts/config.toml"));
        let found = locate_config(
            None,
            Some(PathBuf::from("/home/u/.config/shadowhosts/config.toml")),
            Some(PathBuf::from("/etc/shadowhosts/config.toml")),
            &fs,
        )
        .unwrap();
        assert_eq!(found, PathBuf::from("/etc/shadowhosts/config.toml"));
    }

    #[test]
    fn test_locate_not_found() {
        let mut fs = MockFileSystem::new();
        fs.expect_exists().returning(|_| false);
        assert!(matches!(
            locate_config(None, None, None, &fs),
            Err(ConfigError::NotFound)
        ));
    }

    #[test]
    fn test_generate_config_creates_parent() {
        let mut fs = MockFileSystem::new();
        fs.expect_create_dir_all()
            .withf(|p| p == Path::new("/tmp/x"))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_write_atomic()
            .withf(|p, c| p == Path::new("/tmp/x/config.toml") && c == DEFAULT_CONFIG.as_bytes())
            .times(1)
            .returning(|_, _| Ok(()));

        generate_config(Path::new("/tmp/x/config.toml"), &fs).unwrap();
    }

    #[test]
    fn test_user_config_path_ends_with_program() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with(Path::new(PROGRAM_NAME).join(CONFIG_NAME)));
        }
    }
}
