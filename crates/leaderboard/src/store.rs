//! LeaderboardStore — read / submit over a single persisted document
//!
//! Each call loads the whole document, and `submit` writes the whole document
//! back. Nothing is cached between calls. Without `serialize_writes`, two
//! overlapping submits can both read the same snapshot and the later write
//! wins (lost update).

use crate::error::LeaderboardResult;
use crate::ranking::{insert_ranked, sort_entries, DEFAULT_CAPACITY};
use crate::types::{ScoreEntry, Submission};
use chrono::Utc;
use persistence::DocumentStore;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub struct LeaderboardStore {
    document: Arc<dyn DocumentStore>,
    capacity: usize,
    write_lock: Option<Mutex<()>>,
}

impl LeaderboardStore {
    pub fn new(document: Arc<dyn DocumentStore>) -> Self {
        Self {
            document,
            capacity: DEFAULT_CAPACITY,
            write_lock: None,
        }
    }

    /// Number of entries retained after each submit
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Hold a mutex across each submit's read-modify-write.
    ///
    /// Only guards submits going through this instance.
    pub fn serialize_writes(mut self) -> Self {
        self.write_lock = Some(Mutex::new(()));
        self
    }

    /// All stored entries, best first. Missing or unreadable data reads as empty.
    pub async fn list(&self) -> Vec<ScoreEntry> {
        let mut entries = self.load().await;
        sort_entries(&mut entries);
        entries
    }

    /// Validate a raw request body, then submit it
    pub async fn submit_json(&self, body: &Value) -> LeaderboardResult<()> {
        let submission = Submission::from_json(body)?;
        self.submit(submission).await
    }

    /// Insert a new entry stamped with the current time and keep the top N
    pub async fn submit(&self, submission: Submission) -> LeaderboardResult<()> {
        submission.validate()?;

        let _guard = match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let current = self.load().await;
        let entry = submission.into_entry(Utc::now().timestamp_millis());
        let (name, score) = (entry.name.clone(), entry.score);

        let ranked = insert_ranked(current, entry, self.capacity);
        let body = serde_json::to_string_pretty(&ranked)?;

        if let Err(e) = self.document.write(&body).await {
            error!(
                document = %self.document.describe(),
                error = %e,
                "Failed to persist leaderboard"
            );
            return Err(e.into());
        }

        info!(name = %name, score, retained = ranked.len(), "Score submitted");
        Ok(())
    }

    async fn load(&self) -> Vec<ScoreEntry> {
        let body = match self.document.read().await {
            Ok(Some(body)) => body,
            Ok(None) => {
                debug!(document = %self.document.describe(), "No leaderboard yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(
                    document = %self.document.describe(),
                    error = %e,
                    "Leaderboard unreadable, treating as empty"
                );
                return Vec::new();
            }
        };

        let raw = match serde_json::from_str::<Vec<Value>>(&body) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    document = %self.document.describe(),
                    error = %e,
                    "Leaderboard is not a JSON array, treating as empty"
                );
                return Vec::new();
            }
        };

        // A malformed entry is dropped on its own; the rest of the board survives
        raw.into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<ScoreEntry>(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(
                        document = %self.document.describe(),
                        index,
                        error = %e,
                        "Skipping malformed leaderboard entry"
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LeaderboardError;
    use async_trait::async_trait;
    use persistence::{FileDocument, MemoryDocument, StorageError, StorageResult};
    use serde_json::json;

    fn memory_store() -> (Arc<MemoryDocument>, LeaderboardStore) {
        let doc = Arc::new(MemoryDocument::new());
        let store = LeaderboardStore::new(doc.clone());
        (doc, store)
    }

    fn seeded(scores: impl Iterator<Item = i64>) -> String {
        let entries: Vec<ScoreEntry> = scores
            .map(|s| ScoreEntry {
                name: format!("p{s}"),
                score: s as f64,
                timestamp: 1_700_000_000_000 + s,
            })
            .collect();
        serde_json::to_string(&entries).unwrap()
    }

    fn score_list(entries: &[ScoreEntry]) -> Vec<f64> {
        entries.iter().map(|e| e.score).collect()
    }

    /// Reads succeed, writes always fail
    struct ReadOnlyDocument(MemoryDocument);

    #[async_trait]
    impl DocumentStore for ReadOnlyDocument {
        async fn read(&self) -> StorageResult<Option<String>> {
            self.0.read().await
        }

        async fn write(&self, _body: &str) -> StorageResult<()> {
            Err(StorageError::Query("disk full".into()))
        }

        fn describe(&self) -> String {
            "read-only".into()
        }
    }

    /// Yields after each read so concurrent submits interleave
    struct YieldingDocument(MemoryDocument);

    #[async_trait]
    impl DocumentStore for YieldingDocument {
        async fn read(&self) -> StorageResult<Option<String>> {
            let body = self.0.read().await;
            tokio::task::yield_now().await;
            body
        }

        async fn write(&self, body: &str) -> StorageResult<()> {
            self.0.write(body).await
        }

        fn describe(&self) -> String {
            "yielding".into()
        }
    }

    #[tokio::test]
    async fn test_list_missing_document_is_empty() {
        let (_, store) = memory_store();
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_corrupt_document_is_empty() {
        let store = LeaderboardStore::new(Arc::new(MemoryDocument::with_body("{not json")));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_unreadable_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a directory as a file fails with an I/O error
        let store = LeaderboardStore::new(Arc::new(FileDocument::new(dir.path())));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_resorts_stored_order() {
        let body = json!([
            {"name": "c", "score": 30, "timestamp": 3},
            {"name": "a", "score": 10, "timestamp": 1},
            {"name": "b", "score": 20, "timestamp": 2},
        ])
        .to_string();
        let store = LeaderboardStore::new(Arc::new(MemoryDocument::with_body(body)));
        assert_eq!(score_list(&store.list().await), vec![10.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let store = LeaderboardStore::new(Arc::new(MemoryDocument::with_body(seeded(
            [5, 3, 9].into_iter(),
        ))));
        assert_eq!(store.list().await, store.list().await);
    }

    #[tokio::test]
    async fn test_submit_into_empty_store() {
        let (_, store) = memory_store();
        let before = Utc::now().timestamp_millis();
        store.submit(Submission::new("Ava", 42.0)).await.unwrap();
        let after = Utc::now().timestamp_millis();

        let entries = store.list().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Ava");
        assert_eq!(entries[0].score, 42.0);
        assert!(entries[0].timestamp >= before && entries[0].timestamp <= after);

        store.submit(Submission::new("Bo", 10.0)).await.unwrap();
        let names: Vec<String> = store.list().await.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Bo".to_string(), "Ava".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_persists_sorted_document() {
        let (doc, store) = memory_store();
        store.submit(Submission::new("a", 3.0)).await.unwrap();
        store.submit(Submission::new("b", 1.0)).await.unwrap();

        let raw = doc.read().await.unwrap().unwrap();
        let stored: Vec<ScoreEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(score_list(&stored), vec![1.0, 3.0]);
    }

    #[tokio::test]
    async fn test_worse_eleventh_entry_is_dropped() {
        let doc = Arc::new(MemoryDocument::with_body(seeded(1..=10)));
        let store = LeaderboardStore::new(doc.clone());
        let before = store.list().await;

        store.submit(Submission::new("Z", 11.0)).await.unwrap();

        let after = store.list().await;
        assert_eq!(after.len(), 10);
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_better_entry_evicts_current_worst() {
        let doc = Arc::new(MemoryDocument::with_body(seeded(2..=11)));
        let store = LeaderboardStore::new(doc);

        store.submit(Submission::new("New", 1.0)).await.unwrap();

        let entries = store.list().await;
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].name, "New");
        assert!(!entries.iter().any(|e| e.score == 11.0));
        assert_eq!(
            score_list(&entries),
            (1..=10).map(|s| s as f64).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_length_never_exceeds_capacity() {
        let (_, store) = memory_store();
        for i in (0..25).rev() {
            store
                .submit(Submission::new(format!("p{i}"), i as f64))
                .await
                .unwrap();
            let entries = store.list().await;
            assert!(entries.len() <= DEFAULT_CAPACITY);
            assert!(entries.windows(2).all(|w| w[0].score <= w[1].score));
        }
        assert_eq!(score_list(&store.list().await)[0], 0.0);
    }

    #[tokio::test]
    async fn test_custom_capacity() {
        let store = LeaderboardStore::new(Arc::new(MemoryDocument::new())).with_capacity(3);
        for s in [5.0, 4.0, 3.0, 2.0] {
            store.submit(Submission::new("p", s)).await.unwrap();
        }
        assert_eq!(score_list(&store.list().await), vec![2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_invalid_json_submission_leaves_document_unchanged() {
        let body = seeded(1..=3);
        let doc = Arc::new(MemoryDocument::with_body(body.clone()));
        let store = LeaderboardStore::new(doc.clone());

        let err = store
            .submit_json(&json!({"name": null, "score": "abc"}))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaderboardError::InvalidInput(_)));

        let err = store.submit_json(&json!({})).await.unwrap_err();
        assert!(err.is_client_error());

        assert_eq!(doc.read().await.unwrap(), Some(body));
    }

    #[tokio::test]
    async fn test_non_finite_score_rejected_and_board_kept() {
        let (doc, store) = memory_store();
        store.submit(Submission::new("a", 1.0)).await.unwrap();
        store.submit(Submission::new("b", 2.0)).await.unwrap();
        let before = doc.read().await.unwrap();

        for score in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store.submit(Submission::new("x", score)).await.unwrap_err();
            assert!(matches!(err, LeaderboardError::InvalidInput(_)));
        }
        assert_eq!(doc.read().await.unwrap(), before);

        store.submit(Submission::new("d", 4.0)).await.unwrap();
        let names: Vec<String> = store.list().await.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "b", "d"]);
    }

    #[tokio::test]
    async fn test_fractional_timestamp_entries_survive_submit() {
        let body = r#"[{"name":"a","score":1,"timestamp":1700000000000.5},{"name":"b","score":2,"timestamp":1}]"#;
        let store = LeaderboardStore::new(Arc::new(MemoryDocument::with_body(body)));
        assert_eq!(store.list().await.len(), 2);

        store.submit(Submission::new("c", 3.0)).await.unwrap();
        let names: Vec<String> = store.list().await.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_malformed_entry_is_skipped_not_whole_board() {
        let body = json!([
            {"name": "x", "score": null, "timestamp": 1},
            {"name": "a", "score": 1, "timestamp": 2},
            {"score": 0},
            "garbage",
            {"name": "b", "score": 2},
        ])
        .to_string();
        let doc = Arc::new(MemoryDocument::with_body(body));
        let store = LeaderboardStore::new(doc.clone());

        assert_eq!(score_list(&store.list().await), vec![1.0, 2.0]);

        store.submit(Submission::new("c", 3.0)).await.unwrap();
        let stored: Vec<ScoreEntry> =
            serde_json::from_str(&doc.read().await.unwrap().unwrap()).unwrap();
        assert_eq!(score_list(&stored), vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_submit_json_accepts_valid_body() {
        let (_, store) = memory_store();
        store
            .submit_json(&json!({"name": "Ava", "score": 42}))
            .await
            .unwrap();
        assert_eq!(store.list().await[0].name, "Ava");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let body = seeded(1..=2);
        let store = LeaderboardStore::new(Arc::new(ReadOnlyDocument(MemoryDocument::with_body(
            body,
        ))));

        let err = store.submit(Submission::new("x", 0.0)).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::Persistence(_)));
        assert!(!err.is_client_error());
        assert_eq!(score_list(&store.list().await), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/leaderboard.json");
        let store = LeaderboardStore::new(Arc::new(FileDocument::new(&path)));
        store.submit(Submission::new("Ava", 42.0)).await.unwrap();

        // A fresh store over the same file sees the entry
        let reopened = LeaderboardStore::new(Arc::new(FileDocument::new(&path)));
        assert_eq!(reopened.list().await[0].name, "Ava");
    }

    #[tokio::test]
    async fn test_concurrent_submits_can_lose_an_update() {
        let store = LeaderboardStore::new(Arc::new(YieldingDocument(MemoryDocument::new())));

        let (a, b) = tokio::join!(
            store.submit(Submission::new("a", 1.0)),
            store.submit(Submission::new("b", 2.0)),
        );
        a.unwrap();
        b.unwrap();

        // Both read the empty snapshot; the second write overwrote the first
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_serialized_writes_keep_both_updates() {
        let store = LeaderboardStore::new(Arc::new(YieldingDocument(MemoryDocument::new())))
            .serialize_writes();

        let (a, b) = tokio::join!(
            store.submit(Submission::new("a", 1.0)),
            store.submit(Submission::new("b", 2.0)),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(score_list(&store.list().await), vec![1.0, 2.0]);
    }
}
