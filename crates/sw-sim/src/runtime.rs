//! One agent's decision cycle and claim receiver.

use std::collections::HashMap;
use std::sync::Arc;

use sw_agent::SharedAgent;
use sw_behavior::{CycleInputs, Decision, DecisionModel, Intent, ServiceError, ServiceResult, Services};
use sw_core::{AgentId, Tick};
use sw_transport::{Claim, Publisher, Subscriber};
use tracing::{debug, trace, warn};

use crate::CycleObserver;

/// What became of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The model decided; these intents were applied.
    Decided(Decision),
    /// Fetching inputs failed; agent state was left untouched.
    Skipped(ServiceError),
}

/// Everything one agent needs to run its decision cycle.
pub struct AgentRuntime<M: DecisionModel> {
    agent:     SharedAgent,
    model:     Arc<M>,
    services:  Services,
    /// `None` in uncoordinated mode.
    publisher: Option<Arc<dyn Publisher>>,
    observer:  Arc<dyn CycleObserver>,
}

impl<M: DecisionModel> AgentRuntime<M> {
    pub fn new(
        agent:     SharedAgent,
        model:     Arc<M>,
        services:  Services,
        publisher: Option<Arc<dyn Publisher>>,
        observer:  Arc<dyn CycleObserver>,
    ) -> Self {
        Self { agent, model, services, publisher, observer }
    }

    pub fn id(&self) -> AgentId {
        self.agent.id()
    }

    pub fn agent(&self) -> &SharedAgent {
        &self.agent
    }

    /// Start-of-life announcement: park at standby and clear the indicator.
    ///
    /// Failures are logged; the first cycles will set things right.
    pub async fn boot(&self) {
        let id = self.id();
        if let Err(e) = self.release(id).await {
            warn!(agent = %id, error = %e, "boot redeploy failed");
        }
        if let Err(e) = self.services.session.record_target(id, None).await {
            warn!(agent = %id, error = %e, "boot indicator reset failed");
        }
    }

    /// Receiver-side update: apply one peer claim under the lock.
    pub fn apply_claim(&self, claim: &Claim) -> bool {
        let applied = self.agent.apply_claim(claim);
        if applied {
            self.observer.on_claim(self.id(), claim);
        }
        applied
    }

    /// Gather the sensor reading and every position the cycle needs.
    pub async fn fetch_inputs(&self) -> ServiceResult<CycleInputs> {
        let id = self.id();
        let config = self.model.config();
        let sensed = self
            .services
            .sensor
            .visible_targets(id, config.covered_zone, config.sensing_range)
            .await?;
        let own = self.services.session.position(id.into()).await?;

        let mut positions = HashMap::with_capacity(sensed.len());
        for &target in &sensed {
            positions.insert(target, self.services.session.position(target.into()).await?);
        }
        Ok(CycleInputs::new(sensed, own, positions))
    }

    /// Run one full cycle: fetch, decide under the lock, apply.
    pub async fn run_cycle(&self, tick: Tick) -> CycleOutcome {
        let id = self.id();
        let inputs = match self.fetch_inputs().await {
            Ok(inputs) => inputs,
            Err(e) => {
                warn!(agent = %id, %tick, error = %e, "cycle skipped");
                self.observer.on_cycle_skipped(id, tick, &e);
                return CycleOutcome::Skipped(e);
            }
        };

        let decision = self
            .agent
            .with(|cell| self.model.decide(&mut cell.state, &mut cell.neighbors, &inputs));

        self.apply(&decision).await;
        self.observer.on_cycle_end(id, tick, &decision);
        CycleOutcome::Decided(decision)
    }

    /// Perform a decision's side effects in order.  Each is fire-and-forget:
    /// a failure is logged and the rest still run.
    async fn apply(&self, decision: &Decision) {
        let id = self.id();
        for intent in decision.iter() {
            let result = match intent {
                Intent::SetWaypoint(pos) => self.services.actuator.set_waypoint(id, *pos).await,
                Intent::Record(target) => {
                    debug!(agent = %id, target = ?target, "indicator");
                    self.services.session.record_target(id, *target).await
                }
                Intent::Release => self.release(id).await,
                Intent::Broadcast(claim) => {
                    if let Some(publisher) = &self.publisher {
                        if let Err(e) = publisher.publish(claim).await {
                            debug!(agent = %id, error = %e, "broadcast failed");
                        }
                    }
                    Ok(())
                }
            };
            if let Err(e) = result {
                warn!(agent = %id, error = %e, ?intent, "side effect failed");
            }
        }
    }

    async fn release(&self, id: AgentId) -> ServiceResult<()> {
        let standby = self.services.actuator.standby_position(id).await?;
        trace!(agent = %id, x = standby.x, y = standby.y, "redeploy");
        self.services.actuator.set_waypoint(id, standby).await
    }
}

/// Receiver loop: apply every claim heard on `subscriber` to `agent` until
/// the channel closes.
pub async fn receive_claims(
    agent:          SharedAgent,
    mut subscriber: Box<dyn Subscriber>,
    observer:       Arc<dyn CycleObserver>,
) {
    while let Some(claim) = subscriber.recv().await {
        if agent.apply_claim(&claim) {
            observer.on_claim(agent.id(), &claim);
        }
    }
    debug!(agent = %agent.id(), "claim channel closed");
}
