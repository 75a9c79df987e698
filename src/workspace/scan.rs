//! Proto source discovery
//!
//! Candidate directories come from configuration and may be absent, empty,
//! or free of Protobuf files entirely; only directories whose subtree holds
//! at least one `.proto` entry become staged modules.

use std::fs;
use std::path::Path;

/// Returns true if any entry under `dir`, recursively, carries a `.proto`
/// extension. The match is exact and case-sensitive: `a.PROTO` does not
/// count.
///
/// A missing or unreadable directory yields false rather than an error; the
/// caller treats such candidates the same as candidates without protos.
pub fn contains_protos(dir: &Path) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|ext| ext == "proto").unwrap_or(false) {
            return true;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir && contains_protos(&path) {
            return true;
        }
    }

    false
}
