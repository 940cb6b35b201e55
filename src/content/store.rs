//! Storage interface - async key/value and collection store
//!
//! The generic persistence seam consumed by the batch manager and picker.
//! Records carry a stable key, an opaque JSON value, and a stored-at stamp
//! so stores can expire by age. Failures propagate to the immediate caller;
//! callers tolerate empty reads by falling back to bundled defaults.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

/// Logical store names used by the content layer.
pub mod stores {
    /// Cached batch per content kind
    pub const BATCHES: &str = "batches";
    /// Insertion-ordered seen-id list per content kind
    pub const SEEN: &str = "seen";
    /// Last successful fetch stamp per content kind
    pub const FETCHED_AT: &str = "fetched_at";
    /// Last-shown stamp per content item id
    pub const SHOWN: &str = "shown";
}

/// A stored record: stable key, JSON value, write timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: Value,
    pub stored_at_ms: u64,
}

impl Record {
    pub fn new(key: impl Into<String>, value: Value, now_ms: u64) -> Self {
        Self {
            key: key.into(),
            value,
            stored_at_ms: now_ms,
        }
    }
}

/// Async storage port. Key uniqueness per store is the only schema rule.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Record>>;
    async fn get_all(&self, store: &str) -> Result<Vec<Record>>;
    async fn put(&self, store: &str, record: Record) -> Result<()>;
    async fn put_many(&self, store: &str, records: Vec<Record>) -> Result<()>;
    async fn delete_older_than(&self, store: &str, cutoff_ms: u64) -> Result<()>;
}

/// In-memory store. Used by tests and as a last-resort fallback when no
/// writable directory exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    // Insertion order preserved per store.
    stores: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upsert(records: &mut Vec<Record>, record: Record) {
    match records.iter_mut().find(|r| r.key == record.key) {
        Some(slot) => *slot = record,
        None => records.push(record),
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Record>> {
        let stores = self.stores.read().await;
        Ok(stores
            .get(store)
            .and_then(|records| records.iter().find(|r| r.key == key).cloned()))
    }

    async fn get_all(&self, store: &str) -> Result<Vec<Record>> {
        let stores = self.stores.read().await;
        Ok(stores.get(store).cloned().unwrap_or_default())
    }

    async fn put(&self, store: &str, record: Record) -> Result<()> {
        let mut stores = self.stores.write().await;
        upsert(stores.entry(store.to_string()).or_default(), record);
        Ok(())
    }

    async fn put_many(&self, store: &str, records: Vec<Record>) -> Result<()> {
        let mut stores = self.stores.write().await;
        let slot = stores.entry(store.to_string()).or_default();
        for record in records {
            upsert(slot, record);
        }
        Ok(())
    }

    async fn delete_older_than(&self, store: &str, cutoff_ms: u64) -> Result<()> {
        let mut stores = self.stores.write().await;
        if let Some(records) = stores.get_mut(store) {
            records.retain(|r| r.stored_at_ms >= cutoff_ms);
        }
        Ok(())
    }
}

/// File-backed store: one JSON document per logical store under a base
/// directory. Writes are serialized through a single lock; documents are
/// small (batches, id lists, stamps), so read-modify-write is fine.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    fn path(&self, store: &str) -> PathBuf {
        self.dir.join(format!("{store}.json"))
    }

    async fn read_store(&self, store: &str) -> Result<Vec<Record>> {
        let path = self.path(store);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse store document {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("read store document {}", path.display())),
        }
    }

    async fn write_store(&self, store: &str, records: &[Record]) -> Result<()> {
        let path = self.path(store);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create storage dir {}", self.dir.display()))?;
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write store document {}", path.display()))
    }
}

#[async_trait]
impl Storage for JsonFileStore {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Record>> {
        let records = self.read_store(store).await?;
        Ok(records.into_iter().find(|r| r.key == key))
    }

    async fn get_all(&self, store: &str) -> Result<Vec<Record>> {
        self.read_store(store).await
    }

    async fn put(&self, store: &str, record: Record) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_store(store).await?;
        upsert(&mut records, record);
        self.write_store(store, &records).await
    }

    async fn put_many(&self, store: &str, batch: Vec<Record>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_store(store).await?;
        for record in batch {
            upsert(&mut records, record);
        }
        self.write_store(store, &records).await
    }

    async fn delete_older_than(&self, store: &str, cutoff_ms: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_store(store).await?;
        records.retain(|r| r.stored_at_ms >= cutoff_ms);
        self.write_store(store, &records).await
    }
}
