use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport failure: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid client settings: {0}")]
    Settings(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
