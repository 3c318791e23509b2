//! Convergence criterion and uniqueness verdict.

use std::collections::BTreeSet;

use sw_core::TargetId;

use crate::ClaimLedger;

/// `true` once enough agents are tracking.
///
/// With at least as many targets as agents every expected agent must track
/// something; otherwise every target must be tracked by someone.
pub fn convergence_reached(tracking: usize, expected_agents: usize, expected_targets: usize) -> bool {
    if expected_agents <= expected_targets {
        tracking == expected_agents
    } else {
        tracking >= expected_targets
    }
}

/// Did every agent end up on a different target?
///
/// Judged over the whole episode, not just the final poll:
///
/// - if the number of claims equals the number of targets moved in, pass iff
///   the claims are exactly those targets, each once;
/// - else if it equals `agent_count` (live agents), pass iff no target was
///   claimed twice, which covers runs where crashes leave targets unclaimed;
/// - anything else fails: some agent switched targets or some target was
///   shared.
pub fn uniqueness_verdict(ledger: &ClaimLedger, targets_moved: &[TargetId], agent_count: usize) -> bool {
    let mut claims = ledger.all_claims();
    claims.sort_unstable();

    if claims.len() == targets_moved.len() {
        let mut moved = targets_moved.to_vec();
        moved.sort_unstable();
        claims == moved
    } else if claims.len() == agent_count {
        claims.iter().collect::<BTreeSet<_>>().len() == claims.len()
    } else {
        false
    }
}
