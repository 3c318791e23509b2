use sw_behavior::ServiceError;
use sw_sim::SimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("session control failed: {0}")]
    Service(#[from] ServiceError),

    #[error("suite parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario {id}: {reason}")]
    Scenario { id: String, reason: String },
}

pub type MonitorResult<T> = Result<T, MonitorError>;
