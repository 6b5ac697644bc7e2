use persistence::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    #[error("Failed to encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),
}

impl LeaderboardError {
    /// True when the caller sent a bad request, as opposed to a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type LeaderboardResult<T> = Result<T, LeaderboardError>;
