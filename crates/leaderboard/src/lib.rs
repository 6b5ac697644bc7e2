//! Leaderboard — a bounded, score-ranked list of entries kept in one document
//!
//! Provides:
//! - `ScoreEntry` / `Submission` types and request-body validation
//! - Top-N ranking (ascending score, lower is better)
//! - `LeaderboardStore`, the read / submit service over a `DocumentStore`

pub mod error;
pub mod ranking;
pub mod store;
pub mod types;

pub use error::{LeaderboardError, LeaderboardResult};
pub use ranking::{insert_ranked, sort_entries, DEFAULT_CAPACITY};
pub use store::LeaderboardStore;
pub use types::{ScoreEntry, Submission};
