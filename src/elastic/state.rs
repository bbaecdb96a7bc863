//! Shared coordination state
//!
//! One instance per process, created at start and shared between the change
//! watcher (sole writer) and the training loop (reader). The scale flags and
//! relaunch rank are monotone: set at most once, never reverted within a
//! process epoch. Atomic visibility is all the synchronization there is.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

const RANK_UNSET: i64 = -1;

/// Coordination state recording a pending scale event and its owner.
///
/// The rank is stored before the scale flag is raised; flag writes use
/// `Release` and flag reads `Acquire`, so a reader that observes a flag also
/// observes the rank that goes with it.
#[derive(Debug)]
pub struct CoordinationState {
    scale_up: AtomicBool,
    scale_down: AtomicBool,
    relaunch_rank: AtomicI64,
    // Transient flags, used only by the event-driven watch path to pair a
    // hostfile change with its trailing reachability update.
    hostfile_changed: AtomicBool,
    config_changed: AtomicBool,
}

impl CoordinationState {
    /// Create a fresh state with no pending scale event
    pub fn new() -> Self {
        Self {
            scale_up: AtomicBool::new(false),
            scale_down: AtomicBool::new(false),
            relaunch_rank: AtomicI64::new(RANK_UNSET),
            hostfile_changed: AtomicBool::new(false),
            config_changed: AtomicBool::new(false),
        }
    }

    /// Record a scale-up event owned by `owner`. Terminal for this epoch.
    pub fn mark_scale_up(&self, owner: u32) {
        self.relaunch_rank.store(owner as i64, Ordering::Relaxed);
        self.scale_up.store(true, Ordering::Release);
    }

    /// Record a scale-down event owned by `owner`. Terminal for this epoch.
    pub fn mark_scale_down(&self, owner: u32) {
        self.relaunch_rank.store(owner as i64, Ordering::Relaxed);
        self.scale_down.store(true, Ordering::Release);
    }

    /// True once a scale-up has been recorded
    pub fn scale_up(&self) -> bool {
        self.scale_up.load(Ordering::Acquire)
    }

    /// True once a scale-down has been recorded
    pub fn scale_down(&self) -> bool {
        self.scale_down.load(Ordering::Acquire)
    }

    /// True once either scale flag has been recorded
    pub fn scale_pending(&self) -> bool {
        self.scale_up() || self.scale_down()
    }

    /// The rank that owns the relaunch, once a scale event is recorded
    pub fn relaunch_rank(&self) -> Option<u32> {
        match self.relaunch_rank.load(Ordering::Relaxed) {
            RANK_UNSET => None,
            rank => Some(rank as u32),
        }
    }

    /// Note a hostfile change event (event-driven watch path only)
    pub fn note_hostfile_change(&self) {
        self.hostfile_changed.store(true, Ordering::Relaxed);
    }

    /// Note a reachability-config change event (event-driven watch path only)
    pub fn note_config_change(&self) {
        self.config_changed.store(true, Ordering::Relaxed);
    }

    /// True once both sources have reported a change since the last stable cycle
    pub fn sources_dirty(&self) -> bool {
        self.hostfile_changed.load(Ordering::Relaxed) && self.config_changed.load(Ordering::Relaxed)
    }

    /// Clear the transient change flags after a confirmed stable cycle
    pub fn clear_dirty(&self) {
        self.hostfile_changed.store(false, Ordering::Relaxed);
        self.config_changed.store(false, Ordering::Relaxed);
    }
}

impl Default for CoordinationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_stable() {
        let state = CoordinationState::new();
        assert!(!state.scale_pending());
        assert_eq!(state.relaunch_rank(), None);
        assert!(!state.sources_dirty());
    }

    #[test]
    fn test_rank_visible_with_flag() {
        let state = CoordinationState::new();
        state.mark_scale_down(4);
        assert!(state.scale_down());
        assert!(!state.scale_up());
        assert_eq!(state.relaunch_rank(), Some(4));
    }

    #[test]
    fn test_scale_flags_are_monotone() {
        let state = CoordinationState::new();
        state.mark_scale_up(0);
        // No operation on this type can lower a raised flag; re-marking keeps
        // the epoch terminal.
        state.mark_scale_up(0);
        state.note_hostfile_change();
        state.note_config_change();
        state.clear_dirty();
        assert!(state.scale_up());
        assert!(state.scale_pending());
    }

    #[test]
    fn test_dirty_flags_pair_and_clear() {
        let state = CoordinationState::new();
        state.note_hostfile_change();
        assert!(!state.sources_dirty());
        state.note_config_change();
        assert!(state.sources_dirty());
        state.clear_dirty();
        assert!(!state.sources_dirty());
    }

    #[test]
    fn test_rank_zero_is_distinct_from_unset() {
        let state = CoordinationState::new();
        assert_eq!(state.relaunch_rank(), None);
        state.mark_scale_down(0);
        assert_eq!(state.relaunch_rank(), Some(0));
    }
}
