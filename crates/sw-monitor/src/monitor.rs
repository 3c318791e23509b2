//! Polling oracle: has the fleet settled?

use std::sync::Arc;
use std::time::Duration;

use sw_behavior::SessionControl;
use sw_sim::ScenarioHost;
use tracing::{debug, info, warn};

use crate::{ClaimLedger, convergence_reached};

/// Default interval between polls.
pub const DEFAULT_POLL: Duration = Duration::from_millis(100);

/// Default number of polls before giving up.
pub const DEFAULT_MAX_POLLS: u32 = 2500;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorConfig {
    pub poll:      Duration,
    pub max_polls: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { poll: DEFAULT_POLL, max_polls: DEFAULT_MAX_POLLS }
    }
}

/// Result of one [`ConvergenceMonitor::await_convergence`] call.
///
/// Non-convergence is an outcome, not an error: the partial ledger is still
/// returned.
#[derive(Clone, Debug)]
pub struct Convergence {
    /// Host time spent polling.
    pub elapsed:   Duration,
    pub ledger:    ClaimLedger,
    pub converged: bool,
    pub polls:     u32,
}

/// Reads every agent's indicator through session control, once per poll.
pub struct ConvergenceMonitor {
    session: Arc<dyn SessionControl>,
    config:  MonitorConfig,
}

impl ConvergenceMonitor {
    pub fn new(session: Arc<dyn SessionControl>, config: MonitorConfig) -> Self {
        Self { session, config }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Let the host run one poll interval at a time until the tracking count
    /// satisfies [`convergence_reached`], or `max_polls` polls have passed.
    ///
    /// Every roster agent is polled, crashed ones included; a crashed agent's
    /// indicator holds whatever it last recorded.  An agent whose indicator
    /// cannot be read keeps its previous value for that poll.
    pub async fn await_convergence<H: ScenarioHost + ?Sized>(
        &self,
        host:             &mut H,
        expected_agents:  usize,
        expected_targets: usize,
        max_polls:        u32,
    ) -> Convergence {
        let started = host.elapsed();
        let roster = host.agents();
        let mut ledger = ClaimLedger::new();
        let mut polls = 0;
        let mut converged = false;

        while polls < max_polls {
            host.advance(self.config.poll).await;
            polls += 1;

            for &agent in &roster {
                match self.session.recorded_target(agent).await {
                    Ok(target) => {
                        if ledger.observe(agent, target) {
                            debug!(%agent, target = ?target, poll = polls, "indicator changed");
                        }
                    }
                    Err(e) => debug!(%agent, error = %e, "indicator unreadable"),
                }
            }

            if convergence_reached(ledger.tracking_count(), expected_agents, expected_targets) {
                converged = true;
                break;
            }
        }

        let elapsed = host.elapsed().saturating_sub(started);
        if converged {
            info!(polls, elapsed_ms = elapsed.as_millis() as u64, "fleet converged");
        } else {
            warn!(polls, tracking = ledger.tracking_count(), expected_agents, "time expired");
        }
        Convergence { elapsed, ledger, converged, polls }
    }
}
