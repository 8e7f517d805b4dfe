use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format: {0}")]
    Format(String),

    #[error("invalid token: signature check failed")]
    Signature,

    #[error("cannot interpret payload: {0}")]
    Payload(String),

    #[error("payload is missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("this is the sample token; use your own token")]
    SampleToken,

    #[error("token expired: expired at {expired_at}, current time is {now}")]
    Expired {
        expired_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("key storage error at {}: {reason}", .path.display())]
    KeyStorage { path: PathBuf, reason: String },

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

impl TokenError {
    pub(crate) fn key_storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TokenError::KeyStorage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
