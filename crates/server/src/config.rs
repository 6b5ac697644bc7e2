//! Store configuration: CLI flags first, then environment, then defaults

use clap::ValueEnum;
use leaderboard::LeaderboardStore;
use persistence::{Database, DocumentStore, FileDocument, MemoryDocument, SqliteDocument};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub const DATA_PATH_ENV: &str = "LEADERBOARD_DATA_PATH";
pub const BACKEND_ENV: &str = "LEADERBOARD_BACKEND";

/// Row name of the leaderboard in the SQLite `documents` table
const SQLITE_DOCUMENT: &str = "leaderboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    File,
    Sqlite,
    Memory,
}

impl Backend {
    fn default_path(self) -> &'static str {
        match self {
            Backend::Sqlite => "data/leaderboard.db",
            Backend::File | Backend::Memory => "data/leaderboard.json",
        }
    }
}

fn parse_backend(s: &str) -> Option<Backend> {
    match s.to_lowercase().as_str() {
        "file" => Some(Backend::File),
        "sqlite" => Some(Backend::Sqlite),
        "memory" => Some(Backend::Memory),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: Backend,
    pub data_path: PathBuf,
    pub capacity: usize,
    pub serialize_writes: bool,
}

impl StoreConfig {
    pub fn resolve(
        backend: Option<Backend>,
        data_path: Option<PathBuf>,
        capacity: usize,
        serialize_writes: bool,
    ) -> Self {
        let backend = backend
            .or_else(|| {
                std::env::var(BACKEND_ENV)
                    .ok()
                    .and_then(|s| parse_backend(&s))
            })
            .unwrap_or(Backend::File);
        let data_path = data_path
            .or_else(|| std::env::var(DATA_PATH_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(backend.default_path()));

        Self {
            backend,
            data_path,
            capacity,
            serialize_writes,
        }
    }

    /// Where entries live, for log and banner output
    pub fn location(&self) -> String {
        match self.backend {
            Backend::Memory => "memory (not persisted)".to_string(),
            _ => self.data_path.display().to_string(),
        }
    }

    pub async fn open_store(&self) -> anyhow::Result<LeaderboardStore> {
        let document: Arc<dyn DocumentStore> = match self.backend {
            Backend::File => Arc::new(FileDocument::new(&self.data_path)),
            Backend::Memory => Arc::new(MemoryDocument::new()),
            Backend::Sqlite => {
                let db = Database::new(&self.data_path).await.map_err(|e| {
                    anyhow::anyhow!("Database initialization failed: {}", e)
                })?;
                Arc::new(SqliteDocument::new(db.pool_clone(), SQLITE_DOCUMENT))
            }
        };
        info!(
            document = %document.describe(),
            capacity = self.capacity,
            serialize_writes = self.serialize_writes,
            "Leaderboard store ready"
        );

        let store = LeaderboardStore::new(document).with_capacity(self.capacity);
        Ok(if self.serialize_writes {
            store.serialize_writes()
        } else {
            store
        })
    }
}
