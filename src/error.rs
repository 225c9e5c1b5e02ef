use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),
    #[error("document store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("document store rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
