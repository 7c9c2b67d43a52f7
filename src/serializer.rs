//! Hosts file rendering.

use std::fmt::Write;

use crate::aggregator::MergedTable;

/// Render a table as hosts-file bytes.
///
/// One `<target> <hostname>` line per entry, sorted by hostname, `\n`
/// terminated on every platform. The same table always produces the same
/// bytes.
pub fn serialize(table: &MergedTable) -> Vec<u8> {
    let mut out = String::with_capacity(table.len() * 32);
    for (hostname, target) in table.iter() {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{} {}", target, hostname);
    }
    out.into_bytes()
}
