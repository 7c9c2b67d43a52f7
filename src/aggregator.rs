//! Merging remote entries with local directives.
//!
//! Precedence, weakest first:
//!
//! 1. remote entries, in source order, last occurrence wins
//! 2. blacklist (forced to the blocking sentinel)
//! 3. whitelist (removed from the table)
//! 4. redirect (forced to the configured address)
//!
//! Remote entries that point a sensitive hostname somewhere other than a
//! blocking target are dropped before step 1 unless `allow_redirect` is set.

use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::{debug, info, warn};

use crate::fetcher::SourceFetch;
use crate::parser::{
    is_blocking_target, normalize_hostname, parse_hosts_text_with_summary, HostEntry,
};
use crate::serializer::serialize;
use crate::utils::format_count;

/// Names a remote list must never repoint without `allow_redirect`.
pub const SENSITIVE_HOSTNAMES: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "ip6-localhost",
    "ip6-loopback",
    "broadcasthost",
    "local",
];

/// Local, trusted directives from the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub blacklist: Vec<String>,
    pub whitelist: Vec<String>,
    pub redirect: BTreeMap<String, IpAddr>,
    pub allow_redirect: bool,
}

impl Directives {
    /// Whether a remote entry for `hostname` needs `allow_redirect` to
    /// carry a non-blocking target.
    pub fn is_sensitive(&self, hostname: &str) -> bool {
        SENSITIVE_HOSTNAMES.iter().any(|name| *name == hostname)
            || self.redirect.contains_key(hostname)
    }
}

/// Final hostname → target mapping, one entry per hostname.
///
/// Iteration is ordered by hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedTable {
    entries: BTreeMap<String, IpAddr>,
}

impl MergedTable {
    pub fn get(&self, hostname: &str) -> Option<IpAddr> {
        self.entries.get(hostname).copied()
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.entries.contains_key(hostname)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, IpAddr)> {
        self.entries.iter().map(|(h, ip)| (h.as_str(), *ip))
    }

    fn insert(&mut self, hostname: String, target: IpAddr) {
        self.entries.insert(hostname, target);
    }

    fn remove(&mut self, hostname: &str) -> bool {
        self.entries.remove(hostname).is_some()
    }
}

impl FromIterator<HostEntry> for MergedTable {
    fn from_iter<I: IntoIterator<Item = HostEntry>>(iter: I) -> Self {
        let mut table = MergedTable::default();
        for entry in iter {
            table.insert(normalize_hostname(&entry.hostname), entry.target);
        }
        table
    }
}

/// Counters gathered while merging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Remote entries accepted into the seed (before deduplication)
    pub remote_entries: usize,
    /// Remote entries dropped by the redirect policy
    pub rejected_redirects: usize,
    pub blacklisted: usize,
    /// Hostnames actually removed by the whitelist
    pub whitelisted: usize,
    pub redirected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub table: MergedTable,
    pub stats: MergeStats,
}

/// Merge remote entries with local directives.
///
/// `remote` holds one `(source, entries)` pair per successfully fetched
/// source, in configuration order. Never fails: anything questionable is
/// dropped.
pub fn merge(remote: &[(String, Vec<HostEntry>)], directives: &Directives) -> MergeOutcome {
    let mut table = MergedTable::default();
    let mut stats = MergeStats::default();

    let redirect: BTreeMap<String, IpAddr> = directives
        .redirect
        .iter()
        .map(|(h, ip)| (normalize_hostname(h), *ip))
        .collect();
    let policy = Directives {
        redirect,
        ..Directives::default()
    };

    for (source, entries) in remote {
        let mut rejected = 0;
        for entry in entries {
            let hostname = normalize_hostname(&entry.hostname);
            if !directives.allow_redirect
                && !is_blocking_target(&entry.target)
                && policy.is_sensitive(&hostname)
            {
                rejected += 1;
                continue;
            }
            table.insert(hostname, entry.target);
            stats.remote_entries += 1;
        }
        if rejected > 0 {
            warn!(
                "Ignored {} redirect entries from {} (set allow_redirect to accept them)",
                rejected, source
            );
        }
        stats.rejected_redirects += rejected;
    }

    for hostname in &directives.blacklist {
        let HostEntry { hostname, target } = HostEntry::blocked(hostname);
        table.insert(hostname, target);
        stats.blacklisted += 1;
    }

    for hostname in &directives.whitelist {
        if table.remove(&normalize_hostname(hostname)) {
            stats.whitelisted += 1;
        }
    }

    for (hostname, target) in &policy.redirect {
        table.insert(hostname.clone(), *target);
        stats.redirected += 1;
    }

    MergeOutcome { table, stats }
}

/// Everything produced by one build
#[derive(Debug, Clone)]
pub struct HostsBuild {
    pub table: MergedTable,
    pub stats: MergeStats,
    pub bytes: Vec<u8>,
    pub sources_ok: usize,
    pub sources_failed: usize,
}

/// Parse every successful fetch, merge with the directives and serialize.
///
/// Failed sources contribute nothing; with no usable source at all the
/// result holds only the local directives.
pub fn build_hosts(fetches: &[SourceFetch], directives: &Directives) -> HostsBuild {
    let mut remote = Vec::with_capacity(fetches.len());
    let mut sources_failed = 0;

    for fetch in fetches {
        match &fetch.result {
            Ok(body) => {
                let (entries, summary) = parse_hosts_text_with_summary(body);
                info!(
                    "Parsed {} - {} entries",
                    fetch.source,
                    format_count(summary.entries)
                );
                if summary.malformed > 0 {
                    debug!(
                        "Skipped {} malformed lines in {}",
                        summary.malformed, fetch.source
                    );
                }
                remote.push((fetch.source.clone(), entries));
            }
            Err(_) => sources_failed += 1,
        }
    }

    if !fetches.is_empty() && remote.is_empty() {
        warn!("No source could be fetched, using local directives only");
    }

    let MergeOutcome { table, stats } = merge(&remote, directives);
    info!(
        "Merged {} remote entries into {} hosts ({} blacklisted, {} whitelisted, {} redirected)",
        format_count(stats.remote_entries),
        format_count(table.len()),
        stats.blacklisted,
        stats.whitelisted,
        stats.redirected
    );

    let bytes = serialize(&table);
    HostsBuild {
        sources_ok: remote.len(),
        sources_failed,
        table,
        stats,
        bytes,
    }
}
