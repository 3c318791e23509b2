//! Everything one decision cycle reads from the outside world.

use std::collections::HashMap;

use sw_core::{Position, TargetId};

/// A cycle's sensor reading plus the positions needed to score it.
///
/// Built by the runtime before the agent lock is taken, so `decide` never
/// calls a service.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleInputs {
    /// Visible targets in the order the sensor feed returned them.
    pub sensed: Vec<TargetId>,

    /// The deciding agent's own position.
    pub own_position: Position,

    /// Position of every target in `sensed`.
    pub target_positions: HashMap<TargetId, Position>,
}

impl CycleInputs {
    pub fn new(
        sensed:           Vec<TargetId>,
        own_position:     Position,
        target_positions: HashMap<TargetId, Position>,
    ) -> Self {
        Self { sensed, own_position, target_positions }
    }

    /// A cycle with nothing in range.
    pub fn empty(own_position: Position) -> Self {
        Self::new(Vec::new(), own_position, HashMap::new())
    }

    /// Build from `(target, position)` pairs in sensed order.
    pub fn from_sensed(own_position: Position, sensed: impl IntoIterator<Item = (TargetId, Position)>) -> Self {
        let mut order = Vec::new();
        let mut positions = HashMap::new();
        for (target, pos) in sensed {
            order.push(target);
            positions.insert(target, pos);
        }
        Self::new(order, own_position, positions)
    }

    #[inline]
    pub fn target_position(&self, target: TargetId) -> Option<Position> {
        self.target_positions.get(&target).copied()
    }

    /// Distance from the agent to `target`, if its position is known.
    #[inline]
    pub fn distance_to(&self, target: TargetId) -> Option<f64> {
        self.target_position(target).map(|p| self.own_position.distance(p))
    }

    pub fn is_empty(&self) -> bool {
        self.sensed.is_empty()
    }
}
