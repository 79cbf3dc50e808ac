use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slot occupied: {0}")]
    SlotOccupied(String),

    #[error("Backend fetch failed: {0}")]
    Fetch(#[from] eyre::Report),

    #[error("Backend request timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

pub type AgendaResult<T> = Result<T, AgendaError>;
