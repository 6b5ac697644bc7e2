//! In-process document, used by tests and ephemeral servers

use super::DocumentStore;
use crate::StorageResult;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryDocument {
    body: RwLock<Option<String>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing document body
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: RwLock::new(Some(body.into())),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocument {
    async fn read(&self) -> StorageResult<Option<String>> {
        Ok(self.body.read().await.clone())
    }

    async fn write(&self, body: &str) -> StorageResult<()> {
        *self.body.write().await = Some(body.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
