//! Membership change classification
//!
//! Pure comparison of an observed membership snapshot against the baseline,
//! gated on the reachability config having caught up. Every rank computes
//! this independently over the same sources, so the relaunch owner falls out
//! of a deterministic tie-break instead of an election protocol.

use std::collections::BTreeSet;

/// Outcome of comparing an observed snapshot against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleClass {
    /// Membership cardinality is unchanged; an equal-cardinality identifier
    /// swap is deliberately not a scale event
    Unchanged,
    /// Reachability config has not caught up with the observed membership;
    /// the change is provisional and must not be acted on yet
    Unconfirmed,
    /// Membership grew; `owner` is the rank responsible for coordination
    ScaleUp { owner: u32 },
    /// Membership shrank; `owner` must re-issue the job command
    ScaleDown { owner: u32 },
}

impl ScaleClass {
    /// Returns true if this classification ends the current process epoch
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScaleClass::ScaleUp { .. } | ScaleClass::ScaleDown { .. })
    }

    /// The relaunch owner, if this is a scale classification
    pub fn owner(&self) -> Option<u32> {
        match self {
            ScaleClass::ScaleUp { owner } | ScaleClass::ScaleDown { owner } => Some(*owner),
            _ => None,
        }
    }
}

/// Classify an observed membership snapshot against the baseline.
///
/// The owner is the minimum identifier in the observed set: a pure function
/// of the new membership, so every rank that recomputes the diff converges
/// on the same owner without message exchange.
pub fn classify(
    baseline: &BTreeSet<u32>,
    observed: &BTreeSet<u32>,
    reachability: &BTreeSet<u32>,
) -> ScaleClass {
    if reachability != observed {
        return ScaleClass::Unconfirmed;
    }

    if observed.len() == baseline.len() {
        return ScaleClass::Unchanged;
    }

    // An empty observed set has no electable owner; treat it as provisional
    // and re-evaluate next cycle.
    let Some(&owner) = observed.first() else {
        return ScaleClass::Unconfirmed;
    };

    if observed.len() > baseline.len() {
        ScaleClass::ScaleUp { owner }
    } else {
        ScaleClass::ScaleDown { owner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[u32]) -> BTreeSet<u32> {
        values.iter().copied().collect()
    }

    #[test]
    fn test_owner_accessor() {
        assert_eq!(ScaleClass::ScaleUp { owner: 3 }.owner(), Some(3));
        assert_eq!(ScaleClass::ScaleDown { owner: 1 }.owner(), Some(1));
        assert_eq!(ScaleClass::Unchanged.owner(), None);
        assert_eq!(ScaleClass::Unconfirmed.owner(), None);
    }

    #[test]
    fn test_terminal_classes() {
        assert!(ScaleClass::ScaleUp { owner: 0 }.is_terminal());
        assert!(ScaleClass::ScaleDown { owner: 0 }.is_terminal());
        assert!(!ScaleClass::Unchanged.is_terminal());
        assert!(!ScaleClass::Unconfirmed.is_terminal());
    }

    #[test]
    fn test_empty_observed_has_no_owner() {
        let baseline = ids(&[1, 2, 3]);
        let empty = ids(&[]);
        assert_eq!(classify(&baseline, &empty, &empty), ScaleClass::Unconfirmed);
    }
}
