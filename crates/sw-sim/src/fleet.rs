//! The concurrent driver: one tokio task per agent.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sw_agent::SharedAgent;
use sw_behavior::{DecisionModel, Services};
use sw_core::{AgentId, CoordinationMode, Tick};
use sw_transport::Medium;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use crate::{AgentRuntime, CycleObserver, RuntimeConfig, ScenarioHost, SimError, SimResult, receive_claims};

/// Tasks backing one live agent.  Dropping aborts them.
struct AgentTasks {
    agent:    SharedAgent,
    cycle:    JoinHandle<()>,
    receiver: Option<JoinHandle<()>>,
}

impl Drop for AgentTasks {
    fn drop(&mut self) {
        self.cycle.abort();
        if let Some(receiver) = &self.receiver {
            receiver.abort();
        }
    }
}

/// A fleet of independently scheduled agents.
///
/// Every live agent has a cycle task on a `tokio::time::interval` of
/// `config.tick` and, in coordinated mode, a receiver task applying peer
/// claims as they arrive.  The two contend for the agent's lock exactly as
/// two threads of one deployed agent process would.
///
/// Crashing an agent aborts both tasks: no departure is announced.  Must be
/// used inside a tokio runtime.
///
/// Create via [`FleetBuilder::spawn_fleet`][crate::FleetBuilder::spawn_fleet].
pub struct Fleet<M: DecisionModel> {
    pub config: RuntimeConfig,

    model:    Arc<M>,
    services: Services,
    medium:   Option<Arc<dyn Medium>>,
    observer: Arc<dyn CycleObserver>,
    roster:   Vec<AgentId>,
    live:     BTreeMap<AgentId, AgentTasks>,
    started:  Instant,
}

impl<M: DecisionModel> Fleet<M> {
    pub(crate) fn new(
        config:   RuntimeConfig,
        model:    Arc<M>,
        services: Services,
        medium:   Option<Arc<dyn Medium>>,
        observer: Arc<dyn CycleObserver>,
        roster:   Vec<AgentId>,
    ) -> Self {
        Self {
            config,
            model,
            services,
            medium,
            observer,
            roster,
            live: BTreeMap::new(),
            started: Instant::now(),
        }
    }

    pub(crate) async fn start(&mut self) {
        self.started = Instant::now();
        for id in self.roster.clone() {
            self.spawn(id).await;
        }
    }

    async fn spawn(&mut self, id: AgentId) {
        let agent = SharedAgent::new(id);
        let (publisher, receiver) = match (&self.medium, self.config.protocol.mode) {
            (Some(medium), CoordinationMode::Coordinated) => {
                let link = medium.join();
                let task = tokio::spawn(receive_claims(agent.clone(), link.subscriber, Arc::clone(&self.observer)));
                (Some(link.publisher), Some(task))
            }
            _ => (None, None),
        };
        let runtime = AgentRuntime::new(
            agent.clone(),
            Arc::clone(&self.model),
            self.services.clone(),
            publisher,
            Arc::clone(&self.observer),
        );
        runtime.boot().await;
        let cycle = tokio::spawn(drive(runtime, self.config.tick));
        self.live.insert(id, AgentTasks { agent, cycle, receiver });
    }

    /// Shared state of a live agent.
    pub fn agent(&self, id: AgentId) -> Option<&SharedAgent> {
        self.live.get(&id).map(|t| &t.agent)
    }

    /// Stop every agent.
    pub fn shutdown(&mut self) {
        self.live.clear();
    }
}

/// Cycle loop for one agent.  Runs until aborted.
pub(crate) async fn drive<M: DecisionModel>(runtime: AgentRuntime<M>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick = Tick::ZERO;
    loop {
        interval.tick().await;
        runtime.run_cycle(tick).await;
        tick = tick.next();
    }
}

#[async_trait]
impl<M: DecisionModel> ScenarioHost for Fleet<M> {
    async fn advance(&mut self, span: Duration) {
        tokio::time::sleep(span).await;
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn crash(&mut self, agent: AgentId) -> SimResult<()> {
        if !self.roster.contains(&agent) {
            return Err(SimError::UnknownAgent(agent));
        }
        if self.live.remove(&agent).is_none() {
            return Err(SimError::NotLive(agent));
        }
        info!(%agent, "agent crashed");
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
        info!(%agent, "agent restarted");
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
