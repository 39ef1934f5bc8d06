//! Core types and traits for the kussx URL shortener.
//!
//! This crate holds the pieces shared by the codec, the storage backends,
//! the shortener service and the HTTP gateway: the public [`ShortKey`],
//! the persisted [`LinkRecord`], the [`KvStore`] contract and the
//! [`Shortener`] contract consumed by the HTTP layer.

pub mod error;
pub mod record;
pub mod shortener;
pub mod shortkey;
pub mod store;

pub use error::{CoreError, ShortenerError, StorageError};
pub use record::LinkRecord;
pub use shortener::Shortener;
pub use shortkey::ShortKey;
pub use store::{KvStore, COUNTER_KEY};
