use async_trait::async_trait;
use kussx_core::store::{KvStore, Result};
use kussx_core::StorageError;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Connection parameters for [`RedisStore::connect`].
#[derive(Clone, TypedBuilder)]
pub struct RedisSettings {
    #[builder(default = "localhost".to_string(), setter(into))]
    pub host: String,
    #[builder(default = 6379)]
    pub port: u16,
    /// `AUTH` password. Empty or absent means no authentication.
    #[builder(default, setter(strip_option, into))]
    pub password: Option<String>,
    /// Upper bound for connecting and for every single command.
    #[builder(default = Duration::from_secs(2))]
    pub timeout: Duration,
}

impl RedisSettings {
    /// The `redis://` URL for these settings, password included.
    fn connection_url(&self) -> String {
        match self.password.as_deref() {
            Some(password) if !password.is_empty() => format!(
                "redis://:{}@{}:{}/",
                urlencoding::encode(password),
                self.host,
                self.port
            ),
            _ => format!("redis://{}:{}/", self.host, self.port),
        }
    }
}

impl std::fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A Redis-backed [`KvStore`].
///
/// Uses a single multiplexed connection shared by all clones; the connection
/// is released when the last clone is dropped.
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
    timeout: Duration,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        StorageError::Timeout(message)
    } else {
        StorageError::Operation(message)
    }
}

fn prefixed(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}")
}

impl RedisStore {
    /// Opens the connection described by `settings`.
    ///
    /// Fails with [`StorageError::Unavailable`] if the server cannot be
    /// reached within the configured timeout.
    pub async fn connect(settings: &RedisSettings) -> Result<Self> {
        debug!(host = %settings.host, port = settings.port, "Connecting to Redis");

        let client = redis::Client::open(settings.connection_url().as_str())
            .map_err(|e| StorageError::Unavailable(format!("invalid Redis address: {e}")))?;

        let conn = tokio::time::timeout(
            settings.timeout,
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            StorageError::Unavailable(format!(
                "no connection to {}:{} within {:?}",
                settings.host, settings.port, settings.timeout
            ))
        })?
        .map_err(|e| StorageError::Unavailable(format!("failed to connect to Redis: {e}")))?;

        Ok(Self::new(conn, settings.timeout))
    }

    /// Wraps an existing connection.
    pub fn new(conn: redis::aio::MultiplexedConnection, timeout: Duration) -> Self {
        Self {
            conn,
            key_prefix: String::new(),
            timeout,
        }
    }

    /// Namespaces every key under `key_prefix` (e.g. `"kussx:"`).
    pub fn with_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    fn key(&self, key: &str) -> String {
        prefixed(&self.key_prefix, key)
    }

    async fn run<T, F>(&self, operation: &str, command: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Redis command failed");
                Err(map_redis_error(operation, e))
            }
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "Redis command timed out");
                Err(StorageError::Timeout(format!(
                    "{operation}: no reply within {:?}",
                    self.timeout
                )))
            }
        }
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn increment(&self, key: &str) -> Result<u64> {
        let key = self.key(key);
        trace!(key = %key, "INCR");

        let mut conn = self.conn.clone();
        self.run("INCR", conn.incr::<_, _, u64>(&key, 1_u64)).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = self.key(key);
        trace!(key = %key, "GET");

        let mut conn = self.conn.clone();
        self.run("GET", conn.get::<_, Option<Vec<u8>>>(&key)).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let key = self.key(key);
        trace!(key = %key, "SET");

        let mut conn = self.conn.clone();
        self.run("SET", conn.set::<_, _, ()>(&key, value)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let key = self.key(key);
        trace!(key = %key, "EXISTS");

        let mut conn = self.conn.clone();
        self.run("EXISTS", conn.exists::<_, bool>(&key)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = self.key(key);
        trace!(key = %key, "DEL");

        let mut conn = self.conn.clone();
        self.run("DEL", conn.del::<_, ()>(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_url_without_password() {
        let settings = RedisSettings::builder().host("cache").port(6380).build();
        assert_eq!(settings.connection_url(), "redis://cache:6380/");
    }

    #[test]
    fn empty_password_means_no_auth() {
        let settings = RedisSettings::builder().password("").build();
        assert_eq!(settings.connection_url(), "redis://localhost:6379/");
    }

    #[test]
    fn password_is_url_encoded() {
        let settings = RedisSettings::builder().password("p@ss:word/1").build();
        assert_eq!(
            settings.connection_url(),
            "redis://:p%40ss%3Aword%2F1@localhost:6379/"
        );
    }

    #[test]
    fn debug_hides_password() {
        let settings = RedisSettings::builder().password("hunter2").build();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(prefixed("", "ab12"), "ab12");
        assert_eq!(prefixed("kussx:", "ab12"), "kussx:ab12");
    }
}
