//! Membership snapshot reading
//!
//! Parses the authoritative hostfile and the SSH reachability config into
//! node identifier sets. Every call re-reads its source; nothing is cached.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SurgeError};

static WORKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"worker-([0-9]+)").expect("worker pattern compiles"));

static REACHABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Host worker-([0-9]+)").expect("reachable pattern compiles"));

/// Extract all `worker-<N>` identifiers from a raw hostfile blob.
pub fn parse_workers(text: &str) -> BTreeSet<u32> {
    extract_ids(&WORKER_PATTERN, text)
}

/// Extract all `Host worker-<N>` identifiers from a raw SSH config blob.
pub fn parse_reachable(text: &str) -> BTreeSet<u32> {
    extract_ids(&REACHABLE_PATTERN, text)
}

fn extract_ids(pattern: &Regex, text: &str) -> BTreeSet<u32> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Reads membership and reachability snapshots from their external sources.
///
/// Both sources are collaborator-owned files; the reader never writes them
/// and never retries a failed read. Retry cadence belongs to the watcher.
#[derive(Debug, Clone)]
pub struct MembershipReader {
    hostfile: PathBuf,
    ssh_config: PathBuf,
}

impl MembershipReader {
    /// Create a reader over the given hostfile and SSH config paths
    pub fn new(hostfile: impl Into<PathBuf>, ssh_config: impl Into<PathBuf>) -> Self {
        Self {
            hostfile: hostfile.into(),
            ssh_config: ssh_config.into(),
        }
    }

    /// Read the current authoritative membership snapshot
    pub fn read_membership(&self) -> Result<BTreeSet<u32>> {
        Ok(parse_workers(&read_source(&self.hostfile)?))
    }

    /// Read the current reachability snapshot
    pub fn read_reachability(&self) -> Result<BTreeSet<u32>> {
        Ok(parse_reachable(&read_source(&self.ssh_config)?))
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| SurgeError::SourceUnavailable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}
