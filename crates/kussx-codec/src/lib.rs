//! Salted, reversible mapping between counter values and short keys.

mod codec;
pub mod error;
mod salt;

pub use codec::{CodecSettings, KeyCodec};
pub use error::CodecError;
pub use salt::Salt;
