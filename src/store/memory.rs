//! In-process `Storage` implementation, used by tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::store::traits::Storage;

/// HashMap-backed store with switchable write failures.
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    write_limit: Mutex<Option<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `write` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Let only `limit` more writes through; the rest fail.
    pub fn fail_after(&self, limit: usize) {
        if let Ok(mut guard) = self.write_limit.lock() {
            *guard = Some(self.write_count() + limit);
        }
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored key.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let limit = self.write_limit.lock().ok().and_then(|guard| *guard);
        let exhausted = limit.is_some_and(|limit| self.write_count() >= limit);
        if self.fail_writes.load(Ordering::SeqCst) || exhausted {
            return Err(DatabaseError::Query(format!("write {key}: storage unavailable")));
        }
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
