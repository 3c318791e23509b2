//! `sw-sim` — runs a fleet of agents.
//!
//! # One agent
//!
//! An [`AgentRuntime`] owns one agent's lock-guarded state and its ports.
//! Each decision cycle:
//!
//! ```text
//!   ① Fetch   — sensor feed + positions, without the lock.
//!               Any service error skips the cycle; state is untouched.
//!   ② Decide  — DecisionModel::decide under the lock.
//!   ③ Apply   — waypoint, broadcast, indicator, standby; lock released.
//! ```
//!
//! In coordinated mode a receiver applies peer claims to the same cell
//! between cycles.
//!
//! # Two drivers
//!
//! | Driver    | Scheduling                                                  |
//! |-----------|-------------------------------------------------------------|
//! | [`Sim`]   | Lockstep, virtual time.  Each tick, every live agent in id order drains its inbox then runs one cycle.  Deterministic. |
//! | [`Fleet`] | One tokio task per agent on an interval, plus one receiver task per agent.  Real (or paused) tokio time. |
//!
//! Both implement [`ScenarioHost`], the surface the convergence monitor
//! drives: advance time, crash and restart agents.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let world = Arc::new(World::new());
//! let mut sim = FleetBuilder::new(RuntimeConfig::default(), ClaimProtocol::default())
//!     .agents(agent_ids)
//!     .services(Services::shared(world.clone()))
//!     .medium(Arc::new(MemoryBus::default()))
//!     .build_sim()
//!     .await?;
//! sim.run_ticks(1_000).await;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod fleet;
pub mod host;
pub mod observer;
pub mod runtime;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::FleetBuilder;
pub use config::RuntimeConfig;
pub use error::{SimError, SimResult};
pub use fleet::Fleet;
pub use host::ScenarioHost;
pub use observer::{CycleObserver, NoopObserver};
pub use runtime::{AgentRuntime, CycleOutcome, receive_claims};
pub use sim::Sim;
