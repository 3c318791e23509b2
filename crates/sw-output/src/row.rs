//! Plain data written by report backends.

use sw_monitor::ScenarioRecord;

/// One scenario, flattened for output.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRow {
    pub id:           String,
    pub name:         String,
    /// `coordinated` or `uncoordinated`.
    pub mode:         &'static str,
    pub latency_secs: f64,
    /// Timer start, seconds since the fleet started.
    pub start_secs:   f64,
    /// Timer stop, seconds since the fleet started.
    pub stop_secs:    f64,
    /// Agent → claimed targets, e.g. `{1: [11], 2: [12]}`.
    pub pairs:        String,
    /// Space-separated ids of agents crashed for the scenario.
    pub crashed:      String,
    pub converged:    bool,
    pub unique:       bool,
}

impl From<&ScenarioRecord> for ScenarioRow {
    fn from(r: &ScenarioRecord) -> Self {
        Self {
            id:           r.id.clone(),
            name:         r.name.clone(),
            mode:         r.mode.as_str(),
            latency_secs: r.latency().as_secs_f64(),
            start_secs:   r.started.as_secs_f64(),
            stop_secs:    r.stopped.as_secs_f64(),
            pairs:        r.ledger.to_string(),
            crashed:      r.crashed.iter().map(|a| a.0.to_string()).collect::<Vec<_>>().join(" "),
            converged:    r.converged,
            unique:       r.unique,
        }
    }
}

/// Pass/fail tally over a suite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    /// Scenarios whose assignments were all unique.
    pub unique:    u32,
    /// Scenarios with a shared or switched target.
    pub duplicate: u32,
}

impl SuiteSummary {
    pub fn record(&mut self, row: &ScenarioRow) {
        if row.unique {
            self.unique += 1;
        } else {
            self.duplicate += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.unique + self.duplicate
    }
}
