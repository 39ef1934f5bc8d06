use crate::error::StorageError;
use async_trait::async_trait;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Store key of the shared allocation counter.
pub const COUNTER_KEY: &str = "shorten-counter";

/// The minimal key-value capability set the shortener depends on.
///
/// Implementations own their transport, connection handling and timeouts;
/// any failure there surfaces as a [`StorageError`].
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Atomically increments the integer at `key` and returns the new value.
    ///
    /// An absent key counts as zero.
    async fn increment(&self, key: &str) -> Result<u64>;

    /// Point read. Returns `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Unconditional overwrite.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Point existence check.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Removes `key`. It is not an error if the key does not exist.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    async fn increment(&self, key: &str) -> Result<u64> {
        (**self).increment(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
}
