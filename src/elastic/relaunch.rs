//! Relaunch coordination
//!
//! Once a scale classification is final, every rank runs the same routine:
//! the owning rank decodes the restart command and spawns it fire-and-forget,
//! then every rank (owner included) ends its own process with SIGTERM. A
//! cooperative return is not an option because the training loop may be
//! blocked in collective communication.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{error, info, warn};

use super::command::RestartCommand;
use super::state::CoordinationState;
use crate::error::{Result, SurgeError};
use crate::metrics::standard;

/// Environment variable exposing this process's rank, written by the launcher
pub const RANK_ENV: &str = "RANK";

/// The external rank-assignment layer, as seen by the coordinator
pub trait RankSource: Send + Sync {
    /// The current rank identifier of this process
    fn current_rank(&self) -> Result<u32>;
}

/// Rank source backed by the launcher-provided `RANK` variable
#[derive(Debug, Default)]
pub struct EnvRankSource;

impl RankSource for EnvRankSource {
    fn current_rank(&self) -> Result<u32> {
        let raw = std::env::var(RANK_ENV).map_err(|_| SurgeError::RankLookupFailure {
            reason: format!("{RANK_ENV} is not set"),
        })?;
        raw.trim()
            .parse()
            .map_err(|err| SurgeError::RankLookupFailure {
                reason: format!("invalid rank {raw:?}: {err}"),
            })
    }
}

/// Process-level side effects of a relaunch
pub trait ProcessControl: Send + Sync {
    /// Spawn the restart command as an independent process, fire-and-forget
    fn spawn(&self, command: &RestartCommand) -> Result<()>;
    /// Unconditionally end the current process epoch
    fn terminate(&self);
}

/// Production process control: spawn via the OS, terminate via self-SIGTERM
#[derive(Debug, Default)]
pub struct OsProcessControl;

impl ProcessControl for OsProcessControl {
    fn spawn(&self, command: &RestartCommand) -> Result<()> {
        let [program, args @ ..] = command.argv() else {
            return Err(SurgeError::SpawnFailure {
                reason: "argv is empty".into(),
            });
        };
        std::process::Command::new(program)
            .args(args)
            .spawn()
            .map(|_| ())
            .map_err(|err| SurgeError::SpawnFailure {
                reason: err.to_string(),
            })
    }

    fn terminate(&self) {
        // Supervision of the spawned job belongs to the process manager; this
        // process must not outlive its membership epoch.
        if let Err(err) = kill(Pid::this(), Signal::SIGTERM) {
            error!(error = %err, "failed to signal own pid");
        }
    }
}

/// Per-process relaunch behavior for a finalized coordination state
pub struct RelaunchCoordinator {
    rank_source: Box<dyn RankSource>,
    process: Box<dyn ProcessControl>,
}

impl RelaunchCoordinator {
    /// Coordinator over the launcher-provided rank and the real OS
    pub fn new() -> Self {
        Self::with_parts(Box::new(EnvRankSource), Box::new(OsProcessControl))
    }

    /// Coordinator with explicit rank and process seams
    pub fn with_parts(rank_source: Box<dyn RankSource>, process: Box<dyn ProcessControl>) -> Self {
        Self {
            rank_source,
            process,
        }
    }

    /// Run the relaunch protocol for this process.
    ///
    /// Rank lookup, decode, and spawn failures are logged and swallowed:
    /// whatever happens, the process terminates, because a relaunch failure
    /// must never leave a stale process running inside an outdated epoch.
    pub fn coordinate(&self, state: &CoordinationState) {
        match self.rank_source.current_rank() {
            Ok(rank) if state.relaunch_rank() == Some(rank) => {
                match RestartCommand::from_env() {
                    Ok(command) => {
                        info!(rank, argv = ?command.argv(), "relaunching job");
                        match self.process.spawn(&command) {
                            Ok(()) => standard::RELAUNCHES_SPAWNED.inc(),
                            Err(err) => error!(rank, error = %err, "relaunch spawn failed"),
                        }
                    }
                    Err(err) => error!(rank, error = %err, "restart command unusable"),
                }
            }
            Ok(rank) => {
                info!(rank, owner = ?state.relaunch_rank(), "not the relaunch owner");
            }
            Err(err) => {
                warn!(error = %err, "rank lookup failed, terminating anyway");
            }
        }

        info!("ending process epoch");
        self.process.terminate();
    }
}

impl Default for RelaunchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
