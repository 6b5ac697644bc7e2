//! JSON document on the local filesystem

use super::DocumentStore;
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::debug;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Document stored at a fixed path.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so readers only ever see the old or the new document.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(".{}.tmp.{}.{}", file_name, std::process::id(), seq);
        match self.path.parent() {
            Some(parent) => parent.join(tmp_name),
            None => PathBuf::from(tmp_name),
        }
    }
}

/// Write and fsync, so the rename never exposes a truncated file after a crash
async fn write_synced(path: &Path, body: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(body.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await
}

#[async_trait]
impl DocumentStore for FileDocument {
    async fn read(&self) -> StorageResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    async fn write(&self, body: &str) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::io(parent, e))?;
            }
        }

        let tmp_path = self.tmp_path();

        if let Err(e) = write_synced(&tmp_path, body).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::io(&tmp_path, e));
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::io(&self.path, e));
        }

        debug!(path = %self.path.display(), bytes = body.len(), "Document written");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
