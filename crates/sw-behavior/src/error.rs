use sw_core::NodeId;
use thiserror::Error;

/// Failure of an external collaborator call.
///
/// Always transient from the protocol's point of view: the runtime skips the
/// current cycle and retries on the next tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("node {0} is not part of the session")]
    UnknownNode(NodeId),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
