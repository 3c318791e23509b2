use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("malformed claim datagram: {0}")]
    Malformed(String),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;
