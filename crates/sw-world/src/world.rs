//! The in-memory session.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sw_behavior::{SensorFeed, ServiceError, ServiceResult, SessionControl, WaypointActuator};
use sw_core::{AgentId, NodeId, Position, TargetId};
use tracing::trace;

use crate::{TargetIndex, WorldError, WorldResult};

// ── Per-agent slot ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct AgentSlot {
    position:  Position,
    standby:   Position,
    waypoint:  Option<Position>,
    indicator: Option<TargetId>,
}

#[derive(Default)]
struct WorldInner {
    agents:      BTreeMap<AgentId, AgentSlot>,
    targets:     BTreeMap<TargetId, Position>,
    index:       TargetIndex,
    unreachable: HashSet<NodeId>,
}

impl WorldInner {
    fn contains(&self, node: NodeId) -> bool {
        self.agents.contains_key(&AgentId(node.0)) || self.targets.contains_key(&TargetId(node.0))
    }

    fn reachable(&self, node: NodeId) -> ServiceResult<()> {
        if self.unreachable.contains(&node) {
            return Err(ServiceError::Unavailable(format!("node {node} unreachable")));
        }
        Ok(())
    }

    fn agent(&self, agent: AgentId) -> ServiceResult<&AgentSlot> {
        self.reachable(agent.into())?;
        self.agents.get(&agent).ok_or(ServiceError::UnknownNode(agent.into()))
    }

    fn agent_mut(&mut self, agent: AgentId) -> ServiceResult<&mut AgentSlot> {
        self.reachable(agent.into())?;
        self.agents.get_mut(&agent).ok_or(ServiceError::UnknownNode(agent.into()))
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Shared in-memory session: every agent runtime and the monitor hold an
/// `Arc<World>`.
///
/// Agent and target ids share the session's node-number space, so a number
/// can belong to at most one of them.
#[derive(Default)]
pub struct World {
    inner: Mutex<WorldInner>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, WorldInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Place an agent.  Its standby position is where it starts.
    pub fn add_agent(&self, id: AgentId, pos: Position) -> WorldResult<()> {
        let node = NodeId::from(id);
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return Err(WorldError::InvalidPosition(node));
        }
        let mut inner = self.lock();
        if inner.contains(node) {
            return Err(WorldError::DuplicateNode(node));
        }
        inner.agents.insert(id, AgentSlot { position: pos, standby: pos, waypoint: None, indicator: None });
        Ok(())
    }

    pub fn add_target(&self, id: TargetId, pos: Position) -> WorldResult<()> {
        let node = NodeId::from(id);
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return Err(WorldError::InvalidPosition(node));
        }
        let mut inner = self.lock();
        if inner.contains(node) {
            return Err(WorldError::DuplicateNode(node));
        }
        inner.targets.insert(id, pos);
        inner.index.insert(id, pos);
        Ok(())
    }

    // ── Fault injection ───────────────────────────────────────────────────

    /// While unreachable, every call naming `node` fails with
    /// [`ServiceError::Unavailable`].
    pub fn set_unreachable(&self, node: impl Into<NodeId>, unreachable: bool) {
        let node = node.into();
        let mut inner = self.lock();
        if unreachable {
            inner.unreachable.insert(node);
        } else {
            inner.unreachable.remove(&node);
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────

    pub fn agents(&self) -> Vec<AgentId> {
        self.lock().agents.keys().copied().collect()
    }

    pub fn targets(&self) -> Vec<TargetId> {
        self.lock().targets.keys().copied().collect()
    }

    /// Last waypoint commanded for `agent`.
    pub fn waypoint(&self, agent: AgentId) -> Option<Position> {
        self.lock().agents.get(&agent).and_then(|s| s.waypoint)
    }

    /// Indicator value, bypassing fault injection.
    pub fn indicator(&self, agent: AgentId) -> Option<TargetId> {
        self.lock().agents.get(&agent).and_then(|s| s.indicator)
    }

    /// Position of any node, bypassing fault injection.
    pub fn position_of(&self, node: impl Into<NodeId>) -> Option<Position> {
        let node = node.into();
        let inner = self.lock();
        inner
            .agents
            .get(&AgentId(node.0))
            .map(|s| s.position)
            .or_else(|| inner.targets.get(&TargetId(node.0)).copied())
    }
}

// ── Ports ─────────────────────────────────────────────────────────────────────

#[async_trait]
impl SessionControl for World {
    async fn position(&self, node: NodeId) -> ServiceResult<Position> {
        let inner = self.lock();
        inner.reachable(node)?;
        inner
            .agents
            .get(&AgentId(node.0))
            .map(|s| s.position)
            .or_else(|| inner.targets.get(&TargetId(node.0)).copied())
            .ok_or(ServiceError::UnknownNode(node))
    }

    async fn set_position(&self, node: NodeId, pos: Position) -> ServiceResult<()> {
        let mut inner = self.lock();
        inner.reachable(node)?;
        let target = TargetId(node.0);
        if let Some(old) = inner.targets.get(&target).copied() {
            inner.targets.insert(target, pos);
            inner.index.relocate(target, old, pos);
            trace!(%target, x = pos.x, y = pos.y, "target moved");
            return Ok(());
        }
        match inner.agents.get_mut(&AgentId(node.0)) {
            Some(slot) => {
                slot.position = pos;
                Ok(())
            }
            None => Err(ServiceError::UnknownNode(node)),
        }
    }

    async fn record_target(&self, agent: AgentId, target: Option<TargetId>) -> ServiceResult<()> {
        self.lock().agent_mut(agent)?.indicator = target;
        Ok(())
    }

    async fn recorded_target(&self, agent: AgentId) -> ServiceResult<Option<TargetId>> {
        Ok(self.lock().agent(agent)?.indicator)
    }
}

#[async_trait]
impl SensorFeed for World {
    async fn visible_targets(&self, agent: AgentId, zone: f64, range: f64) -> ServiceResult<Vec<TargetId>> {
        let inner = self.lock();
        let center = inner.agent(agent)?.position;
        Ok(inner
            .index
            .within(center, range)
            .into_iter()
            .filter(|t| inner.targets.get(t).is_some_and(|p| p.x <= zone))
            .collect())
    }
}

#[async_trait]
impl WaypointActuator for World {
    async fn set_waypoint(&self, agent: AgentId, pos: Position) -> ServiceResult<()> {
        self.lock().agent_mut(agent)?.waypoint = Some(pos);
        Ok(())
    }

    async fn standby_position(&self, agent: AgentId) -> ServiceResult<Position> {
        Ok(self.lock().agent(agent)?.standby)
    }
}
