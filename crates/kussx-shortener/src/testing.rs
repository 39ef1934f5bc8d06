use async_trait::async_trait;
use kussx_core::store::{KvStore, Result};
use kussx_core::StorageError;
use kussx_storage::InMemoryStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

/// An in-memory store whose operations can be made to fail or stall.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: InMemoryStore,
    pub(crate) fail_increment: AtomicBool,
    pub(crate) fail_get: AtomicBool,
    pub(crate) fail_set: AtomicBool,
    pub(crate) fail_delete: AtomicBool,
    pub(crate) sets: AtomicUsize,
    gate: Option<Gate>,
}

/// Holds every `exists` call until permits are released.
struct Gate {
    entered: Notify,
    release: Semaphore,
}

impl FlakyStore {
    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Gate {
                entered: Notify::new(),
                release: Semaphore::new(0),
            }),
            ..Self::default()
        }
    }

    /// Waits until some call is parked at the gate.
    pub(crate) async fn entered(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notified().await;
        }
    }

    pub(crate) fn open(&self) {
        if let Some(gate) = &self.gate {
            gate.release.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    fn check(flag: &AtomicBool, operation: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable(format!("{operation}: injected failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn increment(&self, key: &str) -> Result<u64> {
        Self::check(&self.fail_increment, "INCR")?;
        self.inner.increment(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Self::check(&self.fail_get, "GET")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        Self::check(&self.fail_set, "SET")?;
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            let permit = gate
                .release
                .acquire()
                .await
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
            permit.forget();
        }
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        Self::check(&self.fail_delete, "DEL")?;
        self.inner.delete(key).await
    }
}
