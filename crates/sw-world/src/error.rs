use sw_core::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("node {0} is already part of the world")]
    DuplicateNode(NodeId),

    #[error("node {0} has a non-finite position")]
    InvalidPosition(NodeId),
}

pub type WorldResult<T> = Result<T, WorldError>;
