//! Elastic membership detection and coordinated relaunch
//!
//! Watches the membership sources, classifies changes, and drives the
//! per-process relaunch protocol once a scale event is final.

pub mod command;
pub mod diff;
pub mod relaunch;
pub mod shim;
pub mod state;
pub mod watcher;

pub use command::RestartCommand;
pub use diff::{classify, ScaleClass};
pub use relaunch::{EnvRankSource, OsProcessControl, RelaunchCoordinator};
pub use shim::{ScaleDirection, StepDecision, StepGate};
pub use state::CoordinationState;
pub use watcher::{ChangeWatcher, WatchMode};
