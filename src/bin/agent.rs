//! Elastic agent binary
//!
//! Wires the change watcher to the environment-provided configuration and
//! drives a placeholder step loop through the gate. The training engine
//! replaces the loop body; this binary documents the wiring.

use std::sync::Arc;
use std::time::Duration;

use surge_core::elastic::{ChangeWatcher, RelaunchCoordinator, StepDecision, StepGate};
use surge_core::{elastic_enabled, CoordinationState, ElasticConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting Surge elastic agent");

    if !elastic_enabled() {
        warn!("elastic mode disabled, nothing to watch");
        return Ok(());
    }

    let config = ElasticConfig::from_env();
    info!(
        hostfile = %config.hostfile.display(),
        ssh_config = %config.ssh_config.display(),
        "watching membership sources"
    );

    let state = Arc::new(CoordinationState::new());
    let handle = ChangeWatcher::spawn(config, state.clone(), RelaunchCoordinator::new())?;

    let gate = StepGate::new(state);
    let mut step: u64 = 0;

    // Placeholder training loop. A real engine performs its step work here
    // and checks the gate between steps.
    loop {
        match gate.check() {
            StepDecision::Continue => {
                step += 1;
                info!(step, "training step");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            StepDecision::Yield(direction) => {
                info!(?direction, step, "scale event pending, yielding");
                break;
            }
        }
    }

    // The watcher is never joined here; on scale-down it has already ended
    // the process epoch, and on scale-up the external launcher re-issues
    // every rank.
    drop(handle);
    Ok(())
}
