//! `sw-core` — foundational types for the `rust_swarm` tracking fleet.
//!
//! This crate is a dependency of every other `sw-*` crate.  It intentionally
//! has no `sw-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `TargetId`, `NodeId`                       |
//! | [`geo`]         | `Position`, planar distance                           |
//! | [`time`]        | `Tick`, `CycleClock`                                  |
//! | [`rng`]         | `SimRng` (scenario shuffles, lossy transport)         |
//! | [`mode`]        | `CoordinationMode` enum                               |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Position;
pub use ids::{AgentId, NodeId, TargetId};
pub use mode::CoordinationMode;
pub use rng::SimRng;
pub use time::{CycleClock, Tick};
