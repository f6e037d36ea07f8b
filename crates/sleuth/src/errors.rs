use thiserror::Error;

/// Errors raised while the model backend produces a chat stream.
///
/// These propagate untouched through the translation layer; the HTTP
/// handlers map them to client-visible statuses.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Rate limited by model backend: {0}")]
    RateLimited(String),

    #[error("Backend request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend returned {status}: {detail}")]
    Api { status: u16, detail: String },
}

pub type BackendResult<T> = Result<T, BackendError>;
