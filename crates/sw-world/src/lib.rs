//! `sw-world` — an in-process stand-in for the emulation session.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`world`]  | `World`: node positions, indicators, waypoints, fault injection |
//! | [`index`]  | `TargetIndex`: R-tree over target positions                    |
//! | [`error`]  | `WorldError`, `WorldResult<T>`                                 |
//!
//! `World` implements all three collaborator ports from sw-behavior
//! (`SessionControl`, `SensorFeed`, `WaypointActuator`), so a whole fleet and
//! its convergence monitor can share one `Arc<World>`.
//!
//! Agents do not move on their own: a waypoint is recorded, not flown.

pub mod error;
pub mod index;
pub mod world;


pub use error::{WorldError, WorldResult};
pub use index::TargetIndex;
pub use world::World;
