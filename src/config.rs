//! Elastic configuration
//!
//! Source locations and watch cadence, with environment-variable overrides
//! written by the launcher before process start.

use std::path::PathBuf;
use std::time::Duration;

use crate::elastic::watcher::WatchMode;
use crate::DEFAULT_POLL_INTERVAL_SECS;

/// Enables elastic behavior when set to the literal `true` (case-insensitive)
pub const ELASTIC_ENV: &str = "SURGE_ELASTIC";
/// Overrides the hostfile path
pub const HOSTFILE_ENV: &str = "SURGE_HOSTFILE";
/// Overrides the SSH config path
pub const SSH_CONFIG_ENV: &str = "SURGE_SSH_CONFIG";
/// Overrides the poll interval, in whole seconds
pub const POLL_INTERVAL_ENV: &str = "SURGE_POLL_INTERVAL_SECS";
/// Selects the watch strategy: `poll` (default) or `events`
pub const WATCH_MODE_ENV: &str = "SURGE_WATCH_MODE";

/// Configuration for the change watcher
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    /// Authoritative membership source
    pub hostfile: PathBuf,
    /// Reachability-config source
    pub ssh_config: PathBuf,
    /// Cadence of the polling strategy
    pub poll_interval: Duration,
    /// Watch strategy
    pub watch_mode: WatchMode,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/root".into());
        Self {
            hostfile: PathBuf::from("/job/hostfile"),
            ssh_config: PathBuf::from(home).join(".ssh").join("config"),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            watch_mode: WatchMode::Poll,
        }
    }
}

impl ElasticConfig {
    /// Build the configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let hostfile = std::env::var(HOSTFILE_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.hostfile);
        let ssh_config = std::env::var(SSH_CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.ssh_config);
        let poll_interval = std::env::var(POLL_INTERVAL_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);
        let watch_mode = std::env::var(WATCH_MODE_ENV)
            .map(|raw| parse_watch_mode(&raw))
            .unwrap_or(defaults.watch_mode);

        Self {
            hostfile,
            ssh_config,
            poll_interval,
            watch_mode,
        }
    }
}

fn parse_watch_mode(raw: &str) -> WatchMode {
    match raw.to_ascii_lowercase().as_str() {
        "events" | "notify" => WatchMode::Events,
        _ => WatchMode::Poll,
    }
}

/// True when the launcher marked this job as elastic.
///
/// Anything other than a case-insensitive `true`, including absence, leaves
/// the watcher disabled.
pub fn elastic_enabled() -> bool {
    std::env::var(ELASTIC_ENV)
        .map(|raw| raw.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ElasticConfig::default();
        assert_eq!(config.hostfile, PathBuf::from("/job/hostfile"));
        assert!(config.ssh_config.ends_with(".ssh/config"));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.watch_mode, WatchMode::Poll);
    }

    #[test]
    fn test_parse_watch_mode() {
        assert_eq!(parse_watch_mode("events"), WatchMode::Events);
        assert_eq!(parse_watch_mode("EVENTS"), WatchMode::Events);
        assert_eq!(parse_watch_mode("notify"), WatchMode::Events);
        assert_eq!(parse_watch_mode("poll"), WatchMode::Poll);
        assert_eq!(parse_watch_mode("garbage"), WatchMode::Poll);
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var(HOSTFILE_ENV, "/tmp/hosts");
        std::env::set_var(SSH_CONFIG_ENV, "/tmp/ssh_config");
        std::env::set_var(POLL_INTERVAL_ENV, "30");
        std::env::set_var(WATCH_MODE_ENV, "events");

        let config = ElasticConfig::from_env();
        assert_eq!(config.hostfile, PathBuf::from("/tmp/hosts"));
        assert_eq!(config.ssh_config, PathBuf::from("/tmp/ssh_config"));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.watch_mode, WatchMode::Events);

        std::env::remove_var(HOSTFILE_ENV);
        std::env::remove_var(SSH_CONFIG_ENV);
        std::env::remove_var(POLL_INTERVAL_ENV);
        std::env::remove_var(WATCH_MODE_ENV);
    }

    #[test]
    fn test_elastic_gate() {
        std::env::remove_var(ELASTIC_ENV);
        assert!(!elastic_enabled());

        std::env::set_var(ELASTIC_ENV, "True");
        assert!(elastic_enabled());

        std::env::set_var(ELASTIC_ENV, "1");
        assert!(!elastic_enabled());

        std::env::remove_var(ELASTIC_ENV);
    }
}
