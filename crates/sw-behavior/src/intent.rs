//! Side effects a decision asks the runtime to perform.

use sw_core::{Position, TargetId};
use sw_transport::Claim;

/// One side effect produced by [`DecisionModel::decide`][crate::DecisionModel::decide].
///
/// The runtime applies intents in order after releasing the agent lock.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Fly toward this point (the claimed target's position).
    SetWaypoint(Position),

    /// Publish this claim on the transport.
    Broadcast(Claim),

    /// Update the agent's indicator on the session.
    Record(Option<TargetId>),

    /// Return to the standby position.
    Release,
}

/// Ordered intents from one cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decision {
    pub intents: Vec<Intent>,
}

impl Decision {
    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter()
    }

    /// `true` if the agent was sent back to standby.
    pub fn released(&self) -> bool {
        self.intents.iter().any(|i| matches!(i, Intent::Release))
    }

    /// The waypoint issued this cycle, if any.
    pub fn waypoint(&self) -> Option<Position> {
        self.intents.iter().find_map(|i| match i {
            Intent::SetWaypoint(p) => Some(*p),
            _ => None,
        })
    }

    /// The claim broadcast this cycle, if any.
    pub fn broadcast(&self) -> Option<&Claim> {
        self.intents.iter().find_map(|i| match i {
            Intent::Broadcast(c) => Some(c),
            _ => None,
        })
    }

    /// The indicator update issued this cycle, if any.
    pub fn recorded(&self) -> Option<Option<TargetId>> {
        self.intents.iter().find_map(|i| match i {
            Intent::Record(t) => Some(*t),
            _ => None,
        })
    }
}

impl IntoIterator for Decision {
    type Item = Intent;
    type IntoIter = std::vec::IntoIter<Intent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.into_iter()
    }
}
