//! Link failure simulation.
//!
//! A failure is a link removal that tolerates a missing link: it reports
//! instead of failing. Installed entries over the failed link are left to the
//! controller's stale-flow policy.

use crate::error::ControllerError;
use crate::topology::{LinkKey, TopologyStore, Weight};

/// Result of a simulated failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The link existed and was removed
    Failed { link: LinkKey, weight: Weight },
    /// No such link; nothing changed
    NotFound,
}

impl FailureOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Remove the `src`-`dst` link from `topology` if it exists
pub fn simulate_failure(topology: &mut TopologyStore, src: &str, dst: &str) -> FailureOutcome {
    if !topology.has_edge(src, dst) {
        log::debug!("failure: link {}-{} not present", src, dst);
        return FailureOutcome::NotFound;
    }
    match topology.remove_link(src, dst) {
        Ok(weight) => FailureOutcome::Failed {
            link: LinkKey::new(src, dst),
            weight,
        },
        Err(ControllerError::LinkNotFound { .. }) => FailureOutcome::NotFound,
        Err(other) => {
            log::warn!("failure: unexpected error removing {}-{}: {}", src, dst, other);
            FailureOutcome::NotFound
        }
    }
}
