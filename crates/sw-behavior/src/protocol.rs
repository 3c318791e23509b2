//! Nearest-target claiming with distance-based conflict resolution.
//!
//! # One cycle
//!
//! 1. The agent starts the cycle claiming nothing; `previous_target` is its
//!    memory of what it held.
//! 2. **Nothing sensed** ends the sensing episode: the yielded set, the
//!    memory and the streak are cleared.
//! 3. **Conflict check** (only while holding something): each peer whose
//!    fresh claim equals the held target is a contest.  The farther agent
//!    yields; equal distances go to the lower agent id.  The first contest
//!    this agent loses ends the check and drops the claim.  The held target
//!    joins the yielded set either way, so it is never picked up again as a
//!    fresh candidate this episode.
//! 4. **Reclaim**: a held target that no peer has contested for more than
//!    `reclaim_after` cycles stays claimed even if the sensor momentarily
//!    lost it.
//! 5. **Candidates**: a still-sensed held target is re-affirmed.  An agent
//!    holding nothing takes the nearest sensed target strictly inside the
//!    sensing range that it has not yielded and (coordinated mode) that no
//!    peer blocks.  Ties keep the earlier target in sensed order.
//! 6. **Effects**: a waypoint when the claim is new or its target moved, a
//!    claim broadcast every coordinated cycle, then neighbor aging, then an
//!    indicator update (and a return to standby when the claim was lost) if
//!    the claim changed.

use sw_agent::{AgentState, NeighborView};
use sw_core::TargetId;
use sw_transport::Claim;
use tracing::{debug, trace};

use crate::{CycleInputs, Decision, DecisionModel, Intent, ProtocolConfig};

/// The fleet's claim protocol.
#[derive(Debug, Clone, Default)]
pub struct ClaimProtocol {
    config: ProtocolConfig,
}

impl ClaimProtocol {
    pub fn new(config: ProtocolConfig) -> Self {
        Self { config }
    }

    /// Step 3.  Returns `true` if this agent lost a contest.
    fn resolve_conflicts(&self, state: &mut AgentState, neighbors: &mut NeighborView, held: TargetId) -> bool {
        let my_distance = state.current_distance.unwrap_or(self.config.sensing_range);
        let mut contested = false;

        for record in neighbors.iter_mut() {
            if record.last_target() != Some(held) {
                continue;
            }
            contested = true;
            state.seen.insert(held);
            state.contention_streak = 0;

            if (record.last_distance, record.peer) < (my_distance, state.id) {
                debug!(
                    agent = %state.id, peer = %record.peer, target = %held,
                    mine = my_distance, theirs = record.last_distance,
                    "yielding contested target"
                );
                return true;
            }
            trace!(agent = %state.id, peer = %record.peer, target = %held, "peer yields");
            record.mark_yielded();
        }

        if !contested {
            state.contention_streak = state.contention_streak.saturating_add(1);
        }
        false
    }

    /// Step 5.  Returns `true` if a waypoint toward the claim may be needed.
    fn evaluate_candidates(&self, state: &mut AgentState, neighbors: &NeighborView, inputs: &CycleInputs) -> bool {
        let coordinated = self.config.mode.is_coordinated();
        let mut bound = self.config.sensing_range;
        let mut track = false;

        for &target in &inputs.sensed {
            if state.previous_target == Some(target) {
                state.current_target = Some(target);
                if let Some(d) = inputs.distance_to(target) {
                    state.current_distance = Some(d);
                }
                track = true;
                continue;
            }
            if state.previous_target.is_some() || state.seen.contains(target) {
                continue;
            }
            if coordinated && neighbors.is_claimed(target) {
                trace!(agent = %state.id, target = %target, "already claimed by a peer");
                continue;
            }
            let Some(d) = inputs.distance_to(target) else {
                continue;
            };
            if d < bound {
                bound = d;
                state.current_target = Some(target);
                state.current_distance = Some(d);
                track = true;
            }
        }
        track
    }
}

impl DecisionModel for ClaimProtocol {
    fn decide(
        &self,
        state:     &mut AgentState,
        neighbors: &mut NeighborView,
        inputs:    &CycleInputs,
    ) -> Decision {
        let mut decision = Decision::default();
        let coordinated = self.config.mode.is_coordinated();
        let held = state.previous_target;
        state.current_target = None;

        if inputs.is_empty() {
            state.seen.clear();
            state.release();
            state.contention_streak = 0;
        } else {
            if let Some(target) = held {
                if self.resolve_conflicts(state, neighbors, target) {
                    state.previous_target = None;
                }
            }

            if let (Some(limit), Some(target)) = (self.config.reclaim_after, state.previous_target) {
                if state.contention_streak > limit {
                    state.current_target = Some(target);
                }
            }

            if self.evaluate_candidates(state, neighbors, inputs) {
                let pos = state.current_target.and_then(|t| inputs.target_position(t));
                if let Some(pos) = pos.filter(|p| state.last_waypoint != Some(*p)) {
                    decision.push(Intent::SetWaypoint(pos));
                    state.last_waypoint = Some(pos);
                }
            }
        }

        if coordinated {
            let distance = match state.current_target {
                Some(_) => state.current_distance.unwrap_or_default(),
                None    => 0.0,
            };
            decision.push(Intent::Broadcast(Claim::new(state.id, state.current_target, distance)));
            neighbors.age();
        }

        state.previous_target = state.current_target;
        if state.current_target != held {
            debug!(agent = %state.id, from = ?held, to = ?state.current_target, "claim changed");
            decision.push(Intent::Record(state.current_target));
            if state.current_target.is_none() {
                state.last_waypoint = None;
                decision.push(Intent::Release);
            }
        }

        state.cycles += 1;
        decision
    }

    fn config(&self) -> &ProtocolConfig {
        &self.config
    }
}
