use crate::access::{self, AccessRecorder};
use async_trait::async_trait;
use kussx_codec::KeyCodec;
use kussx_core::{KvStore, LinkRecord, ShortKey, Shortener, ShortenerError, COUNTER_KEY};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Tunables of a [`ShortLinkService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ServiceSettings {
    /// Counter values tried per `create` before giving up. At least one.
    #[builder(default = 5)]
    pub max_allocation_attempts: u32,
    #[builder(default = 4)]
    pub access_workers: usize,
    #[builder(default = 1024)]
    pub access_queue_capacity: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The [`Shortener`] implementation over a [`KvStore`].
///
/// Key uniqueness rests on the store's atomic increment of the shared
/// counter; the service itself holds no lock and no cached state. Access
/// counting is handed to an [`AccessRecorder`] owned by the service.
#[derive(Debug)]
pub struct ShortLinkService<S> {
    store: Arc<S>,
    codec: KeyCodec,
    max_allocation_attempts: u32,
    recorder: AccessRecorder,
}

impl<S: KvStore> ShortLinkService<S> {
    /// Builds the service and starts its access workers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(store: Arc<S>, codec: KeyCodec, settings: ServiceSettings) -> Self {
        let recorder = AccessRecorder::spawn(
            Arc::clone(&store),
            settings.access_workers,
            settings.access_queue_capacity,
        );

        Self {
            store,
            codec,
            max_allocation_attempts: settings.max_allocation_attempts.max(1),
            recorder,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    /// Stops the access workers once every queued access is written.
    pub async fn shutdown(&self) {
        self.recorder.shutdown().await;
    }

    fn validate_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ShortenerError::Validation(
                "URL cannot be empty".to_string(),
            ));
        }

        // Must fit in a `Location` header.
        if url.chars().any(|c| c.is_ascii_control()) {
            return Err(ShortenerError::Validation(
                "URL cannot contain control characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Draws counter values until one encodes to an unused key.
    async fn allocate(&self) -> Result<ShortKey> {
        for attempt in 1..=self.max_allocation_attempts {
            match self.try_allocate().await {
                Ok(key) => return Ok(key),
                Err(ShortenerError::KeyCollision(key)) => {
                    warn!(
                        key = %key,
                        attempt,
                        max_attempts = self.max_allocation_attempts,
                        "Allocated key already exists, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(ShortenerError::AllocationExhausted {
            attempts: self.max_allocation_attempts,
        })
    }

    async fn try_allocate(&self) -> Result<ShortKey> {
        let value = self.store.increment(COUNTER_KEY).await?;
        let key = self.codec.encode(value);
        trace!(counter = value, key = %key, "Allocated key");

        if key.is_reserved() || self.store.exists(key.as_str()).await? {
            return Err(ShortenerError::KeyCollision(key.to_string()));
        }
        Ok(key)
    }
}

#[async_trait]
impl<S: KvStore> Shortener for ShortLinkService<S> {
    async fn create(&self, url: &str) -> Result<ShortKey> {
        Self::validate_url(url)?;

        let key = self.allocate().await?;
        let record = LinkRecord::new(url);
        self.store.set(key.as_str(), record.to_bytes()?).await?;

        debug!(key = %key, url, "Created short link");
        Ok(key)
    }

    async fn resolve(&self, key: &ShortKey) -> Result<LinkRecord> {
        if key.is_reserved() {
            return Err(ShortenerError::NotFound(key.to_string()));
        }

        let bytes = self
            .store
            .get(key.as_str())
            .await?
            .ok_or_else(|| ShortenerError::NotFound(key.to_string()))?;

        Ok(LinkRecord::from_bytes(&bytes)?)
    }

    async fn delete(&self, key: &ShortKey) -> Result<()> {
        if key.is_reserved() {
            debug!(key = %key, "Ignoring delete of reserved key");
            return Ok(());
        }

        self.store.delete(key.as_str()).await?;
        debug!(key = %key, "Deleted short link");
        Ok(())
    }

    async fn account_access(&self, key: &ShortKey, record: LinkRecord) -> Result<()> {
        if key.is_reserved() {
            return Err(ShortenerError::NotFound(key.to_string()));
        }
        access::account_access(self.store.as_ref(), key, record).await
    }

    fn record_access(&self, key: ShortKey, record: LinkRecord) {
        if key.is_reserved() {
            return;
        }
        self.recorder.record(key, record);
    }
}
