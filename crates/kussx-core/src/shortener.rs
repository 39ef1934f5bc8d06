use crate::error::ShortenerError;
use crate::record::LinkRecord;
use crate::shortkey::ShortKey;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

/// The operations the HTTP layer dispatches to.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Allocates a fresh key for `url` and persists a new record under it.
    async fn create(&self, url: &str) -> Result<ShortKey>;

    /// Fetches the record stored under `key`.
    ///
    /// Fails with [`ShortenerError::NotFound`] if the key is absent.
    async fn resolve(&self, key: &ShortKey) -> Result<LinkRecord>;

    /// Looks a record up without any side effect. Same contract as
    /// [`resolve`](Shortener::resolve).
    async fn inspect(&self, key: &ShortKey) -> Result<LinkRecord> {
        self.resolve(key).await
    }

    /// Removes `key`. Succeeds whether or not the key existed.
    async fn delete(&self, key: &ShortKey) -> Result<()>;

    /// Writes `record` back under `key` with one more access counted.
    ///
    /// Read-increment-write, not atomic: concurrent calls for the same key
    /// may lose updates.
    async fn account_access(&self, key: &ShortKey, record: LinkRecord) -> Result<()>;

    /// Schedules [`account_access`](Shortener::account_access) out of band.
    ///
    /// Never blocks and never fails; failures are logged by the worker.
    fn record_access(&self, key: ShortKey, record: LinkRecord);
}
