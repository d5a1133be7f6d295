//! File-backed storage: one `<key>.json` file per record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::KeyValueStorage;
use crate::error::StorageError;

/// Durable storage under a data directory.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// record, so a crash mid-write never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    max_bytes: usize,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. The directory is created on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    ///
    /// Characters outside `[A-Za-z0-9_-]` are replaced so a key can never
    /// escape the data directory.
    pub fn record_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if value.len() > self.max_bytes {
            return Err(StorageError::QuotaExceeded {
                size: value.len(),
                limit: self.max_bytes,
            });
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| io_error(key, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(key, e))?;

        tracing::debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}
