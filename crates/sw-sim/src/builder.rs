//! Fluent builder for either fleet driver.

use std::collections::BTreeSet;
use std::sync::Arc;

use sw_behavior::{DecisionModel, Services};
use sw_core::AgentId;
use sw_transport::Medium;

use crate::{CycleObserver, Fleet, NoopObserver, RuntimeConfig, Sim, SimError, SimResult};

/// Validated builder inputs, in driver constructor order.
type Parts<M> = (RuntimeConfig, Arc<M>, Services, Option<Arc<dyn Medium>>, Arc<dyn CycleObserver>, Vec<AgentId>);

/// Builds a [`Sim`] or a [`Fleet`].
///
/// # Required inputs
///
/// - [`RuntimeConfig`]: tick interval and protocol parameters
/// - `M: DecisionModel`: the decision logic shared by every agent
/// - `.agents(..)`: a non-empty roster of unique ids
/// - `.services(..)`: the collaborator ports
///
/// # Optional inputs
///
/// | Method          | Default                                        |
/// |-----------------|------------------------------------------------|
/// | `.medium(m)`    | none; required when the mode is coordinated   |
/// | `.observer(o)`  | `NoopObserver`                                 |
///
/// A medium supplied for an uncoordinated fleet is ignored.
pub struct FleetBuilder<M: DecisionModel> {
    config:   RuntimeConfig,
    model:    M,
    roster:   Vec<AgentId>,
    services: Option<Services>,
    medium:   Option<Arc<dyn Medium>>,
    observer: Arc<dyn CycleObserver>,
}

impl<M: DecisionModel> FleetBuilder<M> {
    pub fn new(config: RuntimeConfig, model: M) -> Self {
        Self {
            config,
            model,
            roster:   Vec::new(),
            services: None,
            medium:   None,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn agents(mut self, roster: impl IntoIterator<Item = AgentId>) -> Self {
        self.roster = roster.into_iter().collect();
        self
    }

    pub fn services(mut self, services: Services) -> Self {
        self.services = Some(services);
        self
    }

    pub fn medium(mut self, medium: Arc<dyn Medium>) -> Self {
        self.medium = Some(medium);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn CycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn validate(self) -> SimResult<Parts<M>> {
        self.config.validate()?;

        if self.roster.is_empty() {
            return Err(SimError::Config("fleet roster is empty".into()));
        }
        let mut seen = BTreeSet::new();
        for &id in &self.roster {
            if id == AgentId::INVALID {
                return Err(SimError::Config("roster contains the invalid agent id".into()));
            }
            if !seen.insert(id) {
                return Err(SimError::Config(format!("agent {id} listed twice")));
            }
        }
        let roster: Vec<AgentId> = seen.into_iter().collect();

        let services = self
            .services
            .ok_or_else(|| SimError::Config("no services supplied".into()))?;

        let medium = if self.config.protocol.mode.is_coordinated() {
            Some(self.medium.ok_or(SimError::MissingMedium)?)
        } else {
            None
        };

        Ok((self.config, Arc::new(self.model), services, medium, self.observer, roster))
    }

    /// Build a lockstep [`Sim`] and boot every agent.
    pub async fn build_sim(self) -> SimResult<Sim<M>> {
        let (config, model, services, medium, observer, roster) = self.validate()?;
        let mut sim = Sim::new(config, model, services, medium, observer, roster);
        sim.start().await;
        Ok(sim)
    }

    /// Build a concurrent [`Fleet`] and spawn every agent.  Must be called
    /// inside a tokio runtime.
    pub async fn spawn_fleet(self) -> SimResult<Fleet<M>> {
        let (config, model, services, medium, observer, roster) = self.validate()?;
        let mut fleet = Fleet::new(config, model, services, medium, observer, roster);
        fleet.start().await;
        Ok(fleet)
    }
}
