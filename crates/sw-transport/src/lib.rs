//! `sw-transport` — claim broadcast between agents.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`wire`]    | `Claim`, text wire codec                                        |
//! | [`channel`] | `Publisher` / `Subscriber` / `Medium` traits, `Link`, stats     |
//! | [`memory`]  | `MemoryBus`: in-process fan-out with optional seeded loss       |
//! | [`udp`]     | `UdpMulticast`: one multicast socket shared by local agents     |
//! | [`error`]   | `TransportError`, `TransportResult<T>`                          |
//!
//! # Delivery model
//!
//! Every channel is best-effort, unordered, and at-most-once per send: no
//! retries, no acknowledgements.  Malformed datagrams are dropped at the
//! subscriber and counted; a subscriber that falls behind skips what it
//! missed.  The claim protocol tolerates all of this because each claim is a
//! complete, self-contained state.
//!
//! Uncoordinated fleets simply never build a transport.

pub mod channel;
pub mod error;
pub mod memory;
pub mod udp;
pub mod wire;


pub use channel::{Link, Medium, Publisher, StatsSnapshot, Subscriber, TransportStats};
pub use error::{TransportError, TransportResult};
pub use memory::{FanoutSubscriber, MemoryBus};
pub use udp::{MulticastConfig, UdpMulticast};
pub use wire::Claim;
