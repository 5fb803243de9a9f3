/// Failures surfaced by the estimation core.
///
/// None of these are fatal: callers either fall back to local computation,
/// present an empty result set, or keep the in-memory state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Prediction service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Prediction service rejected the request: {0}")]
    Rejected(String),

    #[error("Prediction service sent an unusable response: {0}")]
    MalformedResponse(String),

    #[error("Failed to persist history: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error("Stored history is unreadable: {0}")]
    CorruptState(String),
}

impl Error {
    /// Whether the error came from talking to a remote backend.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Rejected(_) | Error::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
