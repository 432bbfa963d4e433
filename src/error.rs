/// Failure to obtain a snapshot from the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Service unreachable or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    /// Response is not a recognised leaderboard payload.
    #[error("invalid leaderboard payload: {0}")]
    Payload(String),
}

impl FetchError {
    pub fn payload(msg: impl ToString) -> Self {
        Self::Payload(msg.to_string())
    }
}

/// Failure to resolve a display handle. Never shown as an error; callers
/// fall back to the truncated wallet.
#[derive(Debug, thiserror::Error)]
pub enum HandleLookupError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid handle payload: {0}")]
    Payload(String),
    /// Lookup service answered but reported its own failure. It may still
    /// have served a handle alongside the error.
    #[error("lookup service: {message}")]
    Upstream {
        message: String,
        handle: Option<String>,
    },
}

impl HandleLookupError {
    /// Handle the service sent together with its error, if any.
    pub fn served_handle(&self) -> Option<&str> {
        match self {
            Self::Upstream { handle, .. } => handle.as_deref().filter(|h| !h.trim().is_empty()),
            _ => None,
        }
    }
}
