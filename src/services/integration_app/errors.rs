use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("No token available from integration client")]
    MissingToken,
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },
    #[error("Integration API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Integration API returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl ConnectionError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ConnectionError::Upstream { status, .. } => Some(*status),
            ConnectionError::Http(err) => err.status(),
            _ => None,
        }
    }
}
