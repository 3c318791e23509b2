//! One agent's own claim state.

use std::collections::BTreeSet;

use sw_core::{AgentId, Position, TargetId};

// ── SeenTargets ───────────────────────────────────────────────────────────────

/// Targets this agent has contested and yielded during the current sensing
/// episode.  Cleared when the sensor feed reports nothing in range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeenTargets(BTreeSet<TargetId>);

impl SeenTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `target` was not already present.
    pub fn insert(&mut self, target: TargetId) -> bool {
        self.0.insert(target)
    }

    #[inline]
    pub fn contains(&self, target: TargetId) -> bool {
        self.0.contains(&target)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.0.iter().copied()
    }
}

// ── AgentState ────────────────────────────────────────────────────────────────

/// Claim state of a single agent, mutated only by its decision cycle.
///
/// `None` targets mean "tracking nothing".
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    pub id: AgentId,

    /// Target claimed this cycle.
    pub current_target: Option<TargetId>,

    /// Target claimed at the end of the previous cycle.  Acts as tracking
    /// memory: a still-sensed previous target is re-affirmed rather than
    /// re-competed for.
    pub previous_target: Option<TargetId>,

    /// Distance to the claimed target when it was last evaluated.  `None`
    /// while nothing has ever been claimed.
    pub current_distance: Option<f64>,

    /// Consecutive cycles with no peer reasserting `previous_target`.
    pub contention_streak: u32,

    /// Targets yielded during the current sensing episode.
    pub seen: SeenTargets,

    /// Last waypoint handed to the actuator while tracking.
    pub last_waypoint: Option<Position>,

    /// Completed decision cycles.
    pub cycles: u64,
}

impl AgentState {
    /// Fresh state: no claim, no memory.
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            current_target:    None,
            previous_target:   None,
            current_distance:  None,
            contention_streak: 0,
            seen:              SeenTargets::new(),
            last_waypoint:     None,
            cycles:            0,
        }
    }

    /// `true` while the agent claims a target.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.current_target.is_some()
    }

    /// Drop every claim and the hysteresis memory.
    pub fn release(&mut self) {
        self.current_target = None;
        self.previous_target = None;
        self.last_waypoint = None;
    }
}
