//! `sw-agent` — the state one agent owns.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`state`]     | `AgentState` (claims, hysteresis, streak), `SeenTargets`  |
//! | [`neighbor`]  | `NeighborView`, `NeighborRecord`, `PeerClaim`             |
//! | [`cell`]      | `AgentCell`, `SharedAgent` (the single per-agent lock)    |
//!
//! # Ownership
//!
//! Each agent owns exactly one `AgentCell`.  The decision cycle mutates it
//! once per tick; in coordinated mode a receiver task also applies incoming
//! claims to its `NeighborView`.  Both go through [`SharedAgent::with`], which
//! holds the lock only for the duration of the closure.

pub mod cell;
pub mod neighbor;
pub mod state;


pub use cell::{AgentCell, SharedAgent};
pub use neighbor::{NeighborRecord, NeighborView, PeerClaim};
pub use state::{AgentState, SeenTargets};
