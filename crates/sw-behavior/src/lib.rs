//! `sw-behavior` — the per-agent decision engine and its collaborator ports.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`ports`]    | `SessionControl`, `SensorFeed`, `WaypointActuator`, `Services`    |
//! | [`config`]   | `ProtocolConfig` (range, zone, reclaim threshold, mode)           |
//! | [`inputs`]   | `CycleInputs`: sensed list and positions fetched for one cycle   |
//! | [`intent`]   | `Intent`, `Decision`                                              |
//! | [`model`]    | `DecisionModel` trait                                             |
//! | [`protocol`] | `ClaimProtocol`: nearest-target claiming with conflict resolution |
//! | [`error`]    | `ServiceError`, `ServiceResult<T>`                                |
//!
//! # Design notes
//!
//! A decision cycle is split in three phases by the runtime in sw-sim:
//!
//! 1. **Fetch** (async, unlocked): query the sensor feed and every position
//!    the cycle needs through the ports, producing a [`CycleInputs`].
//!
//! 2. **Decide** (sync, under the agent lock): call
//!    [`DecisionModel::decide`], which mutates `AgentState` and
//!    `NeighborView` and returns a [`Decision`].  No I/O happens here.
//!
//! 3. **Apply** (async, unlocked): perform the decision's intents against
//!    the ports and the transport.
//!
//! A failure in phase 1 skips the cycle with state untouched.

pub mod config;
pub mod error;
pub mod inputs;
pub mod intent;
pub mod model;
pub mod ports;
pub mod protocol;


pub use config::ProtocolConfig;
pub use error::{ServiceError, ServiceResult};
pub use inputs::CycleInputs;
pub use intent::{Decision, Intent};
pub use model::DecisionModel;
pub use ports::{SensorFeed, Services, SessionControl, WaypointActuator};
pub use protocol::ClaimProtocol;
