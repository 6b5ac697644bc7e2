//! Whole-document persistence media

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileDocument;
pub use memory::MemoryDocument;
pub use sqlite::SqliteDocument;

use crate::StorageResult;
use async_trait::async_trait;

/// A medium that stores exactly one document, read and written whole.
///
/// `write` replaces the document atomically: after a failed write the
/// previous document (or its absence) is still what `read` returns.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns `Ok(None)` when no document has been written yet
    async fn read(&self) -> StorageResult<Option<String>>;

    async fn write(&self, body: &str) -> StorageResult<()>;

    /// Human-readable location, used in log lines
    fn describe(&self) -> String;
}
