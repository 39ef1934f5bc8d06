//! Key-value store backends for the kussx shortener.

pub mod memory;
pub mod redis;

pub use kussx_core::store::{KvStore, Result};
pub use kussx_core::StorageError;
pub use self::memory::InMemoryStore;
pub use self::redis::{RedisSettings, RedisStore};
