use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the account API on rejected requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown profile field: {0}")]
    Unknown(String),
    #[error("profile field is read-only: {0}")]
    ReadOnly(String),
}
