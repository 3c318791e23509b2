use sw_core::{AgentId, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("fleet configuration error: {0}")]
    Config(String),

    #[error("agent {0} is not in the fleet roster")]
    UnknownAgent(AgentId),

    #[error("agent {0} is already running")]
    AlreadyLive(AgentId),

    #[error("agent {0} is not running")]
    NotLive(AgentId),

    #[error("coordinated mode needs a broadcast medium")]
    MissingMedium,

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
