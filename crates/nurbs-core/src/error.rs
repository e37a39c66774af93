use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplineError {
    #[error("Precondition violation: {0}")]
    Precondition(String),

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Singular system: unresolvable zero pivot in row {pivot_row}")]
    SingularSystem { pivot_row: usize },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

pub type Result<T> = std::result::Result<T, SplineError>;
