use kussx_core::{KvStore, LinkRecord, ShortKey, ShortenerError};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// A resolution whose access still has to be written back.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    pub key: ShortKey,
    pub record: LinkRecord,
}

/// Writes `record` back under `key` with one more access counted.
///
/// Fails with [`ShortenerError::NotFound`] if the key disappeared since it
/// was resolved. The existence check and the write are separate store calls,
/// so concurrent accounting for the same key may lose updates.
pub async fn account_access<S: KvStore + ?Sized>(
    store: &S,
    key: &ShortKey,
    record: LinkRecord,
) -> Result<(), ShortenerError> {
    if !store.exists(key.as_str()).await? {
        return Err(ShortenerError::NotFound(key.to_string()));
    }

    let record = record.accessed();
    store.set(key.as_str(), record.to_bytes()?).await?;
    trace!(key = %key, access = record.access, "Recorded access");
    Ok(())
}

/// A fixed pool of workers draining a bounded queue of [`AccessEvent`]s.
///
/// Producers never wait: when the queue is full the event is dropped.
/// Worker failures are logged and discarded.
pub struct AccessRecorder {
    sender: Mutex<Option<mpsc::Sender<AccessEvent>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl AccessRecorder {
    /// Starts `workers` tasks on the current Tokio runtime.
    ///
    /// Both `workers` and `capacity` are raised to at least one.
    pub fn spawn<S: KvStore>(store: Arc<S>, workers: usize, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..workers.max(1))
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&store), Arc::clone(&receiver))))
            .collect();

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Queues an access for `key`. Returns immediately.
    pub fn record(&self, key: ShortKey, record: LinkRecord) {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            warn!(key = %key, "Access recorder is shut down, dropping access");
            return;
        };

        match sender.try_send(AccessEvent { key, record }) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(key = %event.key, "Access queue is full, dropping access");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(key = %event.key, "Access queue is closed, dropping access");
            }
        }
    }

    /// Stops accepting events and waits until queued ones are written.
    ///
    /// Calling it more than once is harmless.
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "Access worker terminated abnormally");
            }
        }
    }
}

impl std::fmt::Debug for AccessRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessRecorder")
            .field("open", &self.sender.lock().is_some())
            .field("workers", &self.workers.lock().len())
            .finish()
    }
}

async fn run_worker<S: KvStore>(
    id: usize,
    store: Arc<S>,
    queue: Arc<tokio::sync::Mutex<mpsc::Receiver<AccessEvent>>>,
) {
    debug!(worker = id, "Access worker started");

    loop {
        let event = queue.lock().await.recv().await;
        let Some(event) = event else {
            break;
        };

        if let Err(e) = account_access(store.as_ref(), &event.key, event.record).await {
            warn!(worker = id, key = %event.key, error = %e, "Failed to record access");
        }
    }

    debug!(worker = id, "Access worker stopped");
}
