use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Store(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("session error: {0}")]
    Session(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
