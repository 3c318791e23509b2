//! Runs scenarios end to end against a [`ScenarioHost`].

use std::sync::Arc;
use std::time::Duration;

use sw_behavior::SessionControl;
use sw_core::{AgentId, CoordinationMode, SimRng, TargetId};
use sw_sim::ScenarioHost;
use tracing::{info, warn};

use crate::{ClaimLedger, ConvergenceMonitor, Layout, MonitorError, MonitorResult, Scenario, uniqueness_verdict};

/// Outcome of one scenario.
#[derive(Clone, Debug)]
pub struct ScenarioRecord {
    pub id:        String,
    pub name:      String,
    /// Whether the fleet exchanged claims.
    pub mode:      CoordinationMode,
    /// Host time when the timer started.
    pub started:   Duration,
    /// Host time when the timer stopped.
    pub stopped:   Duration,
    pub ledger:    ClaimLedger,
    pub crashed:   Vec<AgentId>,
    pub converged: bool,
    pub unique:    bool,
}

/// What the timed section of a run produced.
struct Verdict {
    stopped:   Duration,
    ledger:    ClaimLedger,
    converged: bool,
    unique:    bool,
}

impl ScenarioRecord {
    pub fn latency(&self) -> Duration {
        self.stopped.saturating_sub(self.started)
    }
}

/// Moves targets, injects crashes, and judges the result.
///
/// Each run:
///
/// 1. start the timer and crash the planned agents;
/// 2. move the scenario's targets into range, pausing `stagger` after each;
/// 3. await convergence with `roster - crashed` expected agents;
/// 4. stop the timer, judge uniqueness, wait `settle`;
/// 5. park every roster target out of range, restart the crashed agents,
///    wait `cooldown`.
///
/// Step 5 parks and restarts even when an earlier step failed; the error is
/// returned afterwards.
pub struct ScenarioDriver {
    session: Arc<dyn SessionControl>,
    monitor: ConvergenceMonitor,
    layout:  Layout,
    /// Every target in the session, parked in this order.
    targets: Vec<TargetId>,
    rng:     SimRng,
}

impl ScenarioDriver {
    pub fn new(
        session: Arc<dyn SessionControl>,
        monitor: ConvergenceMonitor,
        layout:  Layout,
        targets: Vec<TargetId>,
        seed:    u64,
    ) -> Self {
        Self { session, monitor, layout, targets, rng: SimRng::new(seed) }
    }

    /// Move every roster target to its parking slot.
    pub async fn park_targets(&self) -> MonitorResult<()> {
        for (i, &target) in self.targets.iter().enumerate() {
            self.session.set_position(target.into(), self.layout.slot_out(i)).await?;
        }
        Ok(())
    }

    pub async fn run<H: ScenarioHost + ?Sized>(&mut self, host: &mut H, scenario: &Scenario) -> MonitorResult<ScenarioRecord> {
        let roster = host.agents();
        let crashed = scenario.crash.resolve(&host.live_agents(), &mut self.rng);
        if crashed.len() >= roster.len() {
            return Err(MonitorError::Scenario {
                id:     scenario.id.clone(),
                reason: format!("cannot crash {} of {} agents", crashed.len(), roster.len()),
            });
        }
        info!(id = %scenario.id, name = %scenario.name, targets = scenario.targets.len(), "scenario start");

        let mode = host.mode();
        let started = host.elapsed();
        let mut down = Vec::with_capacity(crashed.len());
        let timed = self.timed(host, scenario, &crashed, &mut down).await;

        // ── Teardown ──────────────────────────────────────────────────────
        // Runs even when the timed section failed: no agent stays down.
        if timed.is_ok() {
            host.advance(scenario.settle).await;
        }
        let parked = self.park_targets().await;
        let restarted = restart_all(host, &down).await;
        let verdict = timed?;
        parked?;
        restarted?;
        host.advance(scenario.cooldown).await;

        let record = ScenarioRecord {
            id: scenario.id.clone(),
            name: scenario.name.clone(),
            mode,
            started,
            stopped: verdict.stopped,
            ledger: verdict.ledger,
            crashed,
            converged: verdict.converged,
            unique: verdict.unique,
        };
        if record.unique {
            info!(id = %record.id, latency_ms = record.latency().as_millis() as u64, pairs = %record.ledger, "scenario passed");
        } else {
            warn!(id = %record.id, pairs = %record.ledger, "scenario failed uniqueness");
        }
        Ok(record)
    }

    /// Crash, introduce targets, await convergence.  Every agent crashed so
    /// far is pushed to `down`, including when a later step fails.
    async fn timed<H: ScenarioHost + ?Sized>(
        &self,
        host:     &mut H,
        scenario: &Scenario,
        crashed:  &[AgentId],
        down:     &mut Vec<AgentId>,
    ) -> MonitorResult<Verdict> {
        for &agent in crashed {
            host.crash(agent)?;
            down.push(agent);
        }
        for (i, &target) in scenario.targets.iter().enumerate() {
            self.session.set_position(target.into(), self.layout.slot_in(i)).await?;
            if !scenario.stagger.is_zero() {
                host.advance(scenario.stagger).await;
            }
        }

        let expected_agents = host.agents().len() - crashed.len();
        let max_polls = self.monitor.config().max_polls;
        let outcome = self
            .monitor
            .await_convergence(host, expected_agents, scenario.targets.len(), max_polls)
            .await;
        let unique = uniqueness_verdict(&outcome.ledger, &scenario.targets, expected_agents);
        Ok(Verdict { stopped: host.elapsed(), ledger: outcome.ledger, converged: outcome.converged, unique })
    }

    /// Run scenarios back to back.  Stops at the first driver error.
    pub async fn run_suite<H: ScenarioHost + ?Sized>(
        &mut self,
        host:      &mut H,
        scenarios: &[Scenario],
    ) -> MonitorResult<Vec<ScenarioRecord>> {
        let mut records = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            records.push(self.run(host, scenario).await?);
        }
        Ok(records)
    }
}

/// Restart every agent in `agents`, attempting all of them.  Returns the
/// first failure.
async fn restart_all<H: ScenarioHost + ?Sized>(host: &mut H, agents: &[AgentId]) -> MonitorResult<()> {
    let mut first = None;
    for &agent in agents {
        if let Err(e) = host.restart(agent).await {
            warn!(agent = %agent, error = %e, "restart failed");
            first.get_or_insert(e);
        }
    }
    match first {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
