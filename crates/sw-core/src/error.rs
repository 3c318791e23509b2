//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where they need to surface it.

use thiserror::Error;

use crate::NodeId;

/// The top-level error type for `sw-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("unknown coordination mode {0:?} (expected coordinated, uncoordinated, udp or none)")]
    UnknownMode(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `sw-core`.
pub type CoreResult<T> = Result<T, CoreError>;
