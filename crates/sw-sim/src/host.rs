//! The surface a scenario driver needs from a running fleet.

use std::time::Duration;

use async_trait::async_trait;
use sw_core::{AgentId, CoordinationMode};

use crate::SimResult;

/// A fleet the convergence monitor can drive.
///
/// Time is whatever the host says it is: virtual ticks for the lockstep
/// [`Sim`][crate::Sim], tokio time for the concurrent
/// [`Fleet`][crate::Fleet].
#[async_trait]
pub trait ScenarioHost: Send {
    /// Let the fleet run for `span`.
    async fn advance(&mut self, span: Duration);

    /// Time since the host started.
    fn elapsed(&self) -> Duration;

    /// Kill an agent without any announcement.  Its indicator keeps
    /// whatever it last recorded.
    fn crash(&mut self, agent: AgentId) -> SimResult<()>;

    /// Bring a crashed agent back with fresh state.
    async fn restart(&mut self, agent: AgentId) -> SimResult<()>;

    /// Every agent in the roster, live or not, ascending.
    fn agents(&self) -> Vec<AgentId>;

    /// Agents currently running, ascending.
    fn live_agents(&self) -> Vec<AgentId>;

    fn mode(&self) -> CoordinationMode;
}
