use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unbounded operation: {0}")]
    UnboundedOperation(String),

    #[error("Invalid reconfiguration: {0}")]
    InvalidReconfiguration(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>), // every violation found by a single build()

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}
