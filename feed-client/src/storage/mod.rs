//! Durable key-value storage for locally saved reports.
//!
//! A record is a whole JSON document stored under one key and always
//! rewritten in full. Business logic only sees [`KeyValueStorage`]; the
//! platform backend is injected.

mod file;

pub use file::FileStorage;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StorageError;

/// Trait for durable record storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read a whole record. Returns `Ok(None)` if it was never written.
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a whole record.
    ///
    /// Returns `QuotaExceeded` if the record would not fit.
    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage for testing.
///
/// Clones share the same records, so a test can keep a handle for
/// inspection after handing one to a store.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryStorageInner>>,
}

#[derive(Default)]
struct MemoryStorageInner {
    records: HashMap<String, String>,
    max_bytes: Option<usize>,
    fail_next_read: bool,
    fail_next_write: bool,
}

impl MemoryStorage {
    /// Create an empty storage with no quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage that rejects records larger than `max_bytes`.
    pub fn with_quota(max_bytes: usize) -> Self {
        let storage = Self::default();
        storage.inner.lock().unwrap().max_bytes = Some(max_bytes);
        storage
    }

    /// Raw record contents, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap().records.get(key).cloned()
    }

    /// Overwrite a raw record, bypassing the quota.
    pub fn set_raw(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap()
            .records
            .insert(key.to_string(), value.to_string());
    }

    /// Cause the next read to fail.
    pub fn fail_next_read(&self) {
        self.inner.lock().unwrap().fail_next_read = true;
    }

    /// Cause the next write to fail.
    pub fn fail_next_write(&self) {
        self.inner.lock().unwrap().fail_next_write = true;
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    /// Check if nothing was ever written.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().records.is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if std::mem::take(&mut inner.fail_next_read) {
            return Err(StorageError::Backend(format!("simulated read failure: {}", key)));
        }
        Ok(inner.records.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if std::mem::take(&mut inner.fail_next_write) {
            return Err(StorageError::Backend(format!("simulated write failure: {}", key)));
        }
        if let Some(limit) = inner.max_bytes {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    size: value.len(),
                    limit,
                });
            }
        }
        inner.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
