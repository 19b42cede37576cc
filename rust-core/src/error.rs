use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("environment variable `{key}` has unparseable value `{value}`")]
    InvalidEnv { key: String, value: String },

    #[error("invalid input for `{symbol}`: {reason}")]
    InvalidInput { symbol: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
