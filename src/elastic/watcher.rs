//! Membership change watching
//!
//! One background task per process drives the diff on a cadence and owns the
//! baseline snapshot. Two strategies with identical semantics: fixed-interval
//! polling, and filesystem-change events debounced until both sources have
//! reported. Both funnel into the same read/classify/act cycle.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use super::diff::{classify, ScaleClass};
use super::relaunch::RelaunchCoordinator;
use super::state::CoordinationState;
use crate::config::ElasticConfig;
use crate::error::{Result, SurgeError};
use crate::hosts::MembershipReader;
use crate::metrics::standard;
use crate::runtime::WatcherHandle;

/// Strategy driving the watch cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Re-read both sources on a fixed interval
    Poll,
    /// React to filesystem-change notifications on both sources
    Events,
}

/// Which external source a filesystem event touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceEvent {
    Hostfile,
    SshConfig,
}

/// Outcome of one watch cycle
enum CycleOutcome {
    /// Confirmed stable; the observed set is the new baseline
    Stable,
    /// Reachability has not caught up; re-evaluate next cycle
    Provisional,
    /// A scale event fired; the watcher's participation is over
    Terminal,
}

/// Watches the membership sources and owns the baseline snapshot.
///
/// The watcher is the only writer of the shared [`CoordinationState`] and the
/// only component that initiates a transition out of the stable state. Its
/// lifetime is the process lifetime; the returned handle exists for orderly
/// non-elastic teardown, never for joining before a scale-triggered exit.
pub struct ChangeWatcher {
    config: ElasticConfig,
    reader: MembershipReader,
    state: Arc<CoordinationState>,
    relaunch: RelaunchCoordinator,
    baseline: BTreeSet<u32>,
}

impl ChangeWatcher {
    /// Capture the initial baseline and spawn the watch task.
    ///
    /// Fails with `SourceUnavailable` if the hostfile cannot be read at
    /// startup; there is no membership to watch without a baseline.
    pub fn spawn(
        config: ElasticConfig,
        state: Arc<CoordinationState>,
        relaunch: RelaunchCoordinator,
    ) -> Result<WatcherHandle> {
        let reader = MembershipReader::new(&config.hostfile, &config.ssh_config);
        let baseline = reader.read_membership()?;

        info!(
            nodes = baseline.len(),
            mode = ?config.watch_mode,
            "change watcher starting"
        );
        standard::CLUSTER_SIZE.set(baseline.len() as i64);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let watcher = Self {
            config,
            reader,
            state,
            relaunch,
            baseline,
        };

        let join = match watcher.config.watch_mode {
            WatchMode::Poll => tokio::spawn(watcher.run_poll(shutdown_rx)),
            WatchMode::Events => {
                let (event_tx, event_rx) = mpsc::unbounded_channel();
                let fs_watcher = watcher.subscribe(event_tx)?;
                tokio::spawn(watcher.run_events(fs_watcher, event_rx, shutdown_rx))
            }
        };

        Ok(WatcherHandle::new(join, shutdown_tx))
    }

    async fn run_poll(mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("change watcher shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    match self.cycle() {
                        Ok(CycleOutcome::Terminal) => return,
                        Ok(_) => {}
                        Err(err) => debug!(error = %err, "watch cycle skipped"),
                    }
                }
            }
        }
    }

    async fn run_events(
        mut self,
        _fs_watcher: RecommendedWatcher,
        mut events: mpsc::UnboundedReceiver<SourceEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("change watcher shutting down");
                    return;
                }
                event = events.recv() => {
                    let Some(event) = event else { return };
                    match event {
                        SourceEvent::Hostfile => self.state.note_hostfile_change(),
                        SourceEvent::SshConfig => self.state.note_config_change(),
                    }

                    // A membership change and its reachability update arrive
                    // as separate writes; hold off until both have reported.
                    if !self.state.sources_dirty() {
                        continue;
                    }

                    match self.cycle() {
                        Ok(CycleOutcome::Terminal) => return,
                        Ok(CycleOutcome::Stable) => self.state.clear_dirty(),
                        // Provisional and failed cycles keep the flags set so
                        // the next event re-evaluates.
                        Ok(CycleOutcome::Provisional) => {}
                        Err(err) => debug!(error = %err, "watch cycle skipped"),
                    }
                }
            }
        }
    }

    /// Register filesystem watches for both sources.
    ///
    /// Watches the parent directories so rewrite-and-rename updates are seen,
    /// and filters events back to the two file names.
    fn subscribe(&self, tx: mpsc::UnboundedSender<SourceEvent>) -> Result<RecommendedWatcher> {
        let hostfile_name = self.config.hostfile.file_name().map(OsString::from);
        let config_name = self.config.ssh_config.file_name().map(OsString::from);

        let mut fs_watcher = notify::recommended_watcher(
            move |res: std::result::Result<Event, notify::Error>| {
                let Ok(event) = res else { return };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                for path in &event.paths {
                    let Some(name) = path.file_name() else { continue };
                    if Some(name) == hostfile_name.as_deref() {
                        let _ = tx.send(SourceEvent::Hostfile);
                    } else if Some(name) == config_name.as_deref() {
                        let _ = tx.send(SourceEvent::SshConfig);
                    }
                }
            },
        )
        .map_err(|err| SurgeError::Internal {
            message: format!("file watcher setup: {err}"),
        })?;

        let hostfile_target = watch_target(&self.config.hostfile);
        let config_target = watch_target(&self.config.ssh_config);

        fs_watcher
            .watch(&hostfile_target, RecursiveMode::NonRecursive)
            .map_err(|err| SurgeError::Internal {
                message: format!("watching {}: {err}", hostfile_target.display()),
            })?;
        if config_target != hostfile_target {
            fs_watcher
                .watch(&config_target, RecursiveMode::NonRecursive)
                .map_err(|err| SurgeError::Internal {
                    message: format!("watching {}: {err}", config_target.display()),
                })?;
        }

        Ok(fs_watcher)
    }

    /// One read/classify/act pass over the sources.
    fn cycle(&mut self) -> Result<CycleOutcome> {
        standard::WATCH_CYCLES.inc();

        let observed = self.reader.read_membership()?;
        let reachability = self.reader.read_reachability()?;

        match classify(&self.baseline, &observed, &reachability) {
            ScaleClass::Unconfirmed => {
                debug!(
                    observed = observed.len(),
                    reachable = reachability.len(),
                    "membership change unconfirmed"
                );
                Ok(CycleOutcome::Provisional)
            }
            ScaleClass::Unchanged => {
                if observed != self.baseline {
                    info!(nodes = observed.len(), "membership replaced at equal cardinality");
                }
                // Confirmed stable: the observed set becomes the baseline,
                // replaced wholesale.
                self.baseline = observed;
                standard::CLUSTER_SIZE.set(self.baseline.len() as i64);
                Ok(CycleOutcome::Stable)
            }
            ScaleClass::ScaleUp { owner } => {
                warn!(owner, nodes = observed.len(), "scale-up detected");
                standard::SCALE_UP_EVENTS.inc();
                standard::CLUSTER_SIZE.set(observed.len() as i64);
                self.state.mark_scale_up(owner);
                // Every rank is re-launched by the external cluster launcher
                // once capacity is added; this process only stops
                // participating and lets the training loop unwind.
                Ok(CycleOutcome::Terminal)
            }
            ScaleClass::ScaleDown { owner } => {
                warn!(owner, nodes = observed.len(), "scale-down detected");
                standard::SCALE_DOWN_EVENTS.inc();
                standard::CLUSTER_SIZE.set(observed.len() as i64);
                self.state.mark_scale_down(owner);
                // No external launcher will restore capacity; the owner must
                // re-issue the job itself.
                self.relaunch.coordinate(&self.state);
                Ok(CycleOutcome::Terminal)
            }
        }
    }
}

fn watch_target(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => path.to_path_buf(),
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}
