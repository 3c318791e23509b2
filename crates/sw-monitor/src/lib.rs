//! `sw-monitor` — the test oracle for a running fleet.
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`scenario`] | [`Scenario`], [`CrashPlan`], target [`Layout`], [`standard_suite`] |
//! | [`ledger`]   | [`ClaimLedger`]: per-agent claim history over one scenario  |
//! | [`monitor`]  | [`ConvergenceMonitor`]: polls indicators until the fleet settles |
//! | [`verdict`]  | [`convergence_reached`], [`uniqueness_verdict`]             |
//! | [`driver`]   | [`ScenarioDriver`]: crash, introduce, await, judge, tear down |
//! | [`loader`]   | CSV suite files                                             |
//!
//! The monitor only ever sees what an outside observer could: each agent's
//! recorded indicator, read through [`SessionControl`][sw_behavior::SessionControl].
//! It drives time through [`ScenarioHost`][sw_sim::ScenarioHost], so the same
//! scenarios run against the lockstep and the concurrent driver.
//!
//! ```rust,ignore
//! let monitor = ConvergenceMonitor::new(world.clone(), MonitorConfig::default());
//! let mut driver = ScenarioDriver::new(world.clone(), monitor, Layout::default(), targets.clone(), seed);
//! let records = driver.run_suite(&mut sim, &standard_suite(&targets, seed)).await?;
//! ```

pub mod driver;
pub mod error;
pub mod ledger;
pub mod loader;
pub mod monitor;
pub mod scenario;
pub mod verdict;

#[cfg(test)]
mod tests;

pub use driver::{ScenarioDriver, ScenarioRecord};
pub use error::{MonitorError, MonitorResult};
pub use ledger::ClaimLedger;
pub use loader::{load_suite_path, load_suite_reader};
pub use monitor::{Convergence, ConvergenceMonitor, DEFAULT_MAX_POLLS, DEFAULT_POLL, MonitorConfig};
pub use scenario::{CrashPlan, Layout, Scenario, standard_suite};
pub use verdict::{convergence_reached, uniqueness_verdict};
