//! Narrow contracts for the collaborators a decision cycle talks to.
//!
//! All three are request/response and may fail; see [`ServiceError`].

use std::sync::Arc;

use async_trait::async_trait;
use sw_core::{AgentId, NodeId, Position, TargetId};

use crate::ServiceResult;

/// The emulation session's control API.
#[async_trait]
pub trait SessionControl: Send + Sync {
    async fn position(&self, node: NodeId) -> ServiceResult<Position>;

    async fn set_position(&self, node: NodeId, pos: Position) -> ServiceResult<()>;

    /// Publish the agent's tracked target on its per-agent indicator.
    async fn record_target(&self, agent: AgentId, target: Option<TargetId>) -> ServiceResult<()>;

    /// Read back the indicator.  This is what the convergence monitor polls.
    async fn recorded_target(&self, agent: AgentId) -> ServiceResult<Option<TargetId>>;
}

/// Which targets an agent can currently see.
#[async_trait]
pub trait SensorFeed: Send + Sync {
    /// Targets within `range` of `agent` whose x coordinate lies inside the
    /// covered zone.  May legitimately be empty.
    async fn visible_targets(&self, agent: AgentId, zone: f64, range: f64) -> ServiceResult<Vec<TargetId>>;
}

/// Movement commands.  Fire-and-forget from the engine's perspective.
#[async_trait]
pub trait WaypointActuator: Send + Sync {
    async fn set_waypoint(&self, agent: AgentId, pos: Position) -> ServiceResult<()>;

    /// Where an idle agent parks.
    async fn standby_position(&self, agent: AgentId) -> ServiceResult<Position>;
}

/// The three ports bundled for one agent runtime.
#[derive(Clone)]
pub struct Services {
    pub session:  Arc<dyn SessionControl>,
    pub sensor:   Arc<dyn SensorFeed>,
    pub actuator: Arc<dyn WaypointActuator>,
}

impl Services {
    pub fn new(
        session:  Arc<dyn SessionControl>,
        sensor:   Arc<dyn SensorFeed>,
        actuator: Arc<dyn WaypointActuator>,
    ) -> Self {
        Self { session, sensor, actuator }
    }

    /// All three ports served by one backend.
    pub fn shared<W>(backend: Arc<W>) -> Self
    where
        W: SessionControl + SensorFeed + WaypointActuator + 'static,
    {
        Self {
            session:  backend.clone(),
            sensor:   backend.clone(),
            actuator: backend,
        }
    }
}
