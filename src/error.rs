// Error types for the program cache.
// Covers catalog API errors, token issuance, cache IO, and configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgramCacheError {
    #[error("Catalog API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Catalog rejected the access token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Service account {0} does not exist")]
    UnknownServiceAccount(String),

    #[error("Failed to issue access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<figment::Error> for ProgramCacheError {
    fn from(err: figment::Error) -> Self {
        ProgramCacheError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProgramCacheError>;
