//! Top-N ranking: ascending by score, stable on ties

use crate::types::ScoreEntry;

/// Number of entries retained after each insert
pub const DEFAULT_CAPACITY: usize = 10;

/// Sort best-first. Equal scores keep their existing relative order.
pub fn sort_entries(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| a.score.total_cmp(&b.score));
}

/// Append `entry`, re-rank, and keep the best `capacity` entries
pub fn insert_ranked(
    mut entries: Vec<ScoreEntry>,
    entry: ScoreEntry,
    capacity: usize,
) -> Vec<ScoreEntry> {
    entries.push(entry);
    sort_entries(&mut entries);
    entries.truncate(capacity);
    entries
}
