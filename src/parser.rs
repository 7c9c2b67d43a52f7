//! Hosts-format line parsing for remote lists.
//!
//! Remote lists are noisy: comments, banners, stray HTML, lines with several
//! hostnames. Each line is tokenized into a [`ParsedLine`] and anything that
//! isn't `<ip> <hostname>...` is skipped without aborting the parse.

use std::net::{IpAddr, Ipv4Addr};

/// Target written for blacklisted hostnames.
pub const BLOCKING_SENTINEL: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Longest hostname accepted (RFC 1035 presentation form).
const MAX_HOSTNAME_LEN: usize = 253;

/// A single hostname → target mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    pub hostname: String,
    pub target: IpAddr,
}

impl HostEntry {
    /// Create an entry, normalizing the hostname.
    pub fn new(hostname: &str, target: IpAddr) -> Self {
        Self {
            hostname: normalize_hostname(hostname),
            target,
        }
    }

    /// Create an entry pointing at the blocking sentinel.
    pub fn blocked(hostname: &str) -> Self {
        Self::new(hostname, BLOCKING_SENTINEL)
    }
}

/// Result of tokenizing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// `<target> <hostname>...` with at least one usable hostname
    Entry {
        target: IpAddr,
        hostnames: Vec<String>,
    },
    /// Empty or comment-only
    Blank,
    /// Anything else
    Malformed,
}

/// Line counts for one parsed text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub entries: usize,
    pub blank: usize,
    pub malformed: usize,
}

/// Trim and lower-case a hostname for use as a merge key.
///
/// A single trailing dot is dropped so `example.com.` and `example.com`
/// share a key.
pub fn normalize_hostname(name: &str) -> String {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name).to_lowercase()
}

/// Check that a token can be a hostname.
///
/// Accepts ASCII letters, digits, `-`, `_` and `.`; rejects empty labels.
pub fn is_valid_hostname(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Whether a target address means "unreachable" rather than a real redirect.
///
/// Unspecified and loopback addresses both count: lists use `0.0.0.0`,
/// `127.0.0.1` and `::1` interchangeably for blocking.
pub fn is_blocking_target(ip: &IpAddr) -> bool {
    ip.is_unspecified() || ip.is_loopback()
}

/// Cut a line at its first unescaped `#`.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1] != b'\\') {
            return &line[..i];
        }
    }
    line
}

/// Tokenize a single line of hosts-format text.
pub fn tokenize_line(line: &str) -> ParsedLine {
    let content = strip_comment(line).trim();
    if content.is_empty() {
        return ParsedLine::Blank;
    }

    let mut tokens = content.split_whitespace();
    let target = match tokens.next().and_then(|t| t.parse::<IpAddr>().ok()) {
        Some(ip) => ip,
        None => return ParsedLine::Malformed,
    };

    let hostnames: Vec<String> = tokens
        .map(normalize_hostname)
        .filter(|h| is_valid_hostname(h))
        .collect();

    if hostnames.is_empty() {
        return ParsedLine::Malformed;
    }

    ParsedLine::Entry { target, hostnames }
}

/// Parse hosts-format text, returning entries and line counts.
pub fn parse_hosts_text_with_summary(text: &str) -> (Vec<HostEntry>, ParseSummary) {
    let mut entries = Vec::new();
    let mut summary = ParseSummary::default();

    // reqwest leaves a UTF-8 byte-order mark in place
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for line in text.lines() {
        match tokenize_line(line) {
            ParsedLine::Entry { target, hostnames } => {
                summary.entries += hostnames.len();
                entries.extend(
                    hostnames
                        .into_iter()
                        .map(|hostname| HostEntry { hostname, target }),
                );
            }
            ParsedLine::Blank => summary.blank += 1,
            ParsedLine::Malformed => summary.malformed += 1,
        }
    }

    (entries, summary)
}

/// Parse hosts-format text into entries, skipping anything unusable.
pub fn parse_hosts_text(text: &str) -> Vec<HostEntry> {
    parse_hosts_text_with_summary(text).0
}
