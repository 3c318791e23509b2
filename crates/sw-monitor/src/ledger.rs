//! What the monitor has seen each agent track during one scenario.

use std::collections::BTreeMap;
use std::fmt;

use sw_core::{AgentId, TargetId};

/// Per-agent history of claimed targets.
///
/// Built from successive polls of every agent's indicator.  A target is
/// appended only when the polled value changes to it; polls that read
/// "none" update the current value but never enter the history, so an agent
/// going `11 → none → 11` has history `[11, 11]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClaimLedger {
    history:   BTreeMap<AgentId, Vec<TargetId>>,
    last_seen: BTreeMap<AgentId, Option<TargetId>>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one polled value.  Returns `true` if it differs from the
    /// previous poll of the same agent.
    pub fn observe(&mut self, agent: AgentId, target: Option<TargetId>) -> bool {
        let last = self.last_seen.entry(agent).or_insert(None);
        if *last == target {
            return false;
        }
        *last = target;
        if let Some(t) = target {
            self.history.entry(agent).or_default().push(t);
        }
        true
    }

    /// Agents whose latest poll showed a target.
    pub fn tracking_count(&self) -> usize {
        self.last_seen.values().filter(|t| t.is_some()).count()
    }

    /// Latest polled value for `agent`.
    pub fn current(&self, agent: AgentId) -> Option<TargetId> {
        self.last_seen.get(&agent).copied().flatten()
    }

    /// Every target `agent` was seen claiming, in order.
    pub fn history(&self, agent: AgentId) -> &[TargetId] {
        self.history.get(&agent).map_or(&[], Vec::as_slice)
    }

    /// Agents with a non-empty history, ascending.
    pub fn pairs(&self) -> impl Iterator<Item = (AgentId, &[TargetId])> {
        self.history.iter().map(|(&a, ts)| (a, ts.as_slice()))
    }

    /// Every claim across all agents, flattened.  Duplicates are kept.
    pub fn all_claims(&self) -> Vec<TargetId> {
        self.history.values().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// `{1: [11], 2: [12, 14]}`
impl fmt::Display for ClaimLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (agent, targets)) in self.history.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: [", agent.0)?;
            for (j, t) in targets.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", t.0)?;
            }
            f.write_str("]")?;
        }
        f.write_str("}")
    }
}
