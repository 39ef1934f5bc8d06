use async_trait::async_trait;
use dashmap::DashMap;
use kussx_core::store::{KvStore, Result};
use kussx_core::StorageError;

/// In-memory implementation of [`KvStore`] using DashMap.
///
/// DashMap shards its locks, so operations on different keys do not block
/// each other. `increment` holds the shard lock across its read-modify-write,
/// which makes it atomic per key.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    storage: DashMap<String, Vec<u8>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

/// Counters are stored as ASCII decimal, like Redis does.
fn parse_counter(key: &str, raw: &[u8]) -> Result<u64> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| text.parse::<u64>().ok())
        .ok_or_else(|| StorageError::InvalidData(format!("value at '{key}' is not an integer")))
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn increment(&self, key: &str) -> Result<u64> {
        let mut entry = self
            .storage
            .entry(key.to_owned())
            .or_insert_with(|| b"0".to_vec());

        let next = parse_counter(key, entry.value())?
            .checked_add(1)
            .ok_or_else(|| StorageError::InvalidData(format!("counter at '{key}' overflowed")))?;

        *entry = next.to_string().into_bytes();
        Ok(next)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.storage.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.storage.insert(key.to_owned(), value);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.storage.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove(key);
        Ok(())
    }
}
