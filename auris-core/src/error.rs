use thiserror::Error;

/// All errors produced by auris-core.
#[derive(Debug, Error)]
pub enum AurisError {
    #[error("engine is already running")]
    AlreadyRunning,

    #[error("engine is not running")]
    NotRunning,

    #[error("window queue is full — pipeline cannot keep up")]
    IngestionBackpressure,

    #[error("window channel closed — pipeline is gone")]
    IngestionClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AurisError>;
