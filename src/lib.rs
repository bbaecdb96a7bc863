//! Surge Core - Elastic scaling runtime for distributed training
//!
//! This crate provides the Rust core for coordinating:
//! - Membership change detection over collaborator-provided sources
//! - Deterministic relaunch-owner election without a consensus protocol
//! - Coordinated job relaunch and process-epoch termination
//!
//! The training loop itself is an external collaborator: it shares a
//! [`CoordinationState`] with the change watcher and polls a
//! [`elastic::StepGate`] each step.

pub mod config;
pub mod elastic;
pub mod error;
pub mod hosts;
pub mod metrics;
pub mod runtime;

pub use config::{elastic_enabled, ElasticConfig};
pub use elastic::{classify, CoordinationState, ScaleClass, WatchMode};
pub use error::SurgeError;
pub use runtime::WatcherHandle;

/// Default interval between membership polls, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
