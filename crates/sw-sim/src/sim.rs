//! The lockstep driver.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sw_agent::SharedAgent;
use sw_behavior::{DecisionModel, Services};
use sw_core::{AgentId, CoordinationMode, CycleClock, Tick};
use sw_transport::{Medium, Subscriber};
use tracing::info;

use crate::{AgentRuntime, CycleObserver, CycleOutcome, RuntimeConfig, ScenarioHost, SimError, SimResult};

struct LockstepAgent<M: DecisionModel> {
    runtime: AgentRuntime<M>,
    /// Claims delivered since the agent's last cycle.  `None` when
    /// uncoordinated.
    inbox:   Option<Box<dyn Subscriber>>,
}

/// Deterministic tick loop over a whole fleet.
///
/// Each tick, every live agent in ascending id order:
///
/// 1. drains claims delivered to it since its last cycle, then
/// 2. runs one decision cycle.
///
/// Claims an agent broadcasts are therefore seen by higher-id agents in the
/// same tick and by lower-id agents on the next one.  Time is virtual:
/// `advance(d)` runs `ceil(d / tick)` ticks as fast as the ports answer.
///
/// With a [`MemoryBus`][sw_transport::MemoryBus] medium and a seeded world
/// the whole run is reproducible.
///
/// Create via [`FleetBuilder::build_sim`][crate::FleetBuilder::build_sim].
pub struct Sim<M: DecisionModel> {
    pub config: RuntimeConfig,

    /// Virtual clock; one tick per fleet-wide round of cycles.
    pub clock: CycleClock,

    model:    Arc<M>,
    services: Services,
    medium:   Option<Arc<dyn Medium>>,
    observer: Arc<dyn CycleObserver>,
    roster:   Vec<AgentId>,
    live:     BTreeMap<AgentId, LockstepAgent<M>>,
}

impl<M: DecisionModel> Sim<M> {
    pub(crate) fn new(
        config:   RuntimeConfig,
        model:    Arc<M>,
        services: Services,
        medium:   Option<Arc<dyn Medium>>,
        observer: Arc<dyn CycleObserver>,
        roster:   Vec<AgentId>,
    ) -> Self {
        Self {
            clock: CycleClock::new(config.tick),
            config,
            model,
            services,
            medium,
            observer,
            roster,
            live: BTreeMap::new(),
        }
    }

    /// Bring up every roster agent.
    pub(crate) async fn start(&mut self) {
        for id in self.roster.clone() {
            self.spawn(id).await;
        }
    }

    async fn spawn(&mut self, id: AgentId) {
        let agent = SharedAgent::new(id);
        let (publisher, inbox) = match (&self.medium, self.config.protocol.mode) {
            (Some(medium), CoordinationMode::Coordinated) => {
                let link = medium.join();
                (Some(link.publisher), Some(link.subscriber))
            }
            _ => (None, None),
        };
        let runtime = AgentRuntime::new(
            agent,
            Arc::clone(&self.model),
            self.services.clone(),
            publisher,
            Arc::clone(&self.observer),
        );
        runtime.boot().await;
        self.live.insert(id, LockstepAgent { runtime, inbox });
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Run one tick across all live agents.  Returns how many cycles were
    /// skipped.
    pub async fn step(&mut self) -> usize {
        let tick = self.clock.current_tick;
        let mut skipped = 0;
        for member in self.live.values_mut() {
            if let Some(inbox) = member.inbox.as_mut() {
                while let Some(claim) = inbox.try_recv() {
                    member.runtime.apply_claim(&claim);
                }
            }
            if let CycleOutcome::Skipped(_) = member.runtime.run_cycle(tick).await {
                skipped += 1;
            }
        }
        self.clock.advance();
        skipped
    }

    /// Run exactly `n` ticks.
    pub async fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.step().await;
        }
    }

    pub fn tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Shared state of a live agent.
    pub fn agent(&self, id: AgentId) -> Option<&SharedAgent> {
        self.live.get(&id).map(|m| m.runtime.agent())
    }
}

#[async_trait]
impl<M: DecisionModel> ScenarioHost for Sim<M> {
    async fn advance(&mut self, span: Duration) {
        let n = self.clock.ticks_for(span);
        self.run_ticks(n).await;
    }

    fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    fn crash(&mut self, agent: AgentId) -> SimResult<()> {
        if !self.roster.contains(&agent) {
            return Err(SimError::UnknownAgent(agent));
        }
        if self.live.remove(&agent).is_none() {
            return Err(SimError::NotLive(agent));
        }
        info!(%agent, tick = %self.clock.current_tick, "agent crashed");
        self.observer.on_crash(agent);
        Ok(())
    }

    async fn restart(&mut self, agent: AgentId) -> SimResult<()> {
        if !self.roster.contains(&agent) {
            return Err(SimError::UnknownAgent(agent));
        }
        if self.live.contains_key(&agent) {
            return Err(SimError::AlreadyLive(agent));
        }
        self.spawn(agent).await;
        info!(%agent, tick = %self.clock.current_tick, "agent restarted");
        self.observer.on_restart(agent);
        Ok(())
    }

    fn agents(&self) -> Vec<AgentId> {
        self.roster.clone()
    }

    fn live_agents(&self) -> Vec<AgentId> {
        self.live.keys().copied().collect()
    }

    fn mode(&self) -> CoordinationMode {
        self.config.protocol.mode
    }
}
