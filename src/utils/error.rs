use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("non-retryable HTTP status: {status}")]
    StatusError { status: u16 },

    #[error("response decode failed: {0}")]
    DecodeError(#[from] serde_json::Error),

    #[error("request failed after {attempts} attempts")]
    ExhaustedError { attempts: u32 },

    #[error("fetch cancelled by shutdown signal")]
    CancelledError,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;
