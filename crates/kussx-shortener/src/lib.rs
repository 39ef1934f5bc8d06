//! Short link allocation, resolution and access accounting.
//!
//! [`ShortLinkService`] turns values of a shared store counter into public
//! keys through the [`KeyCodec`](kussx_codec::KeyCodec) and implements the
//! [`Shortener`](kussx_core::Shortener) contract on top of any
//! [`KvStore`](kussx_core::KvStore). Access counting runs out of band on the
//! [`AccessRecorder`] worker pool.

pub mod access;
pub mod service;

#[cfg(test)]
mod testing;

pub use access::{account_access, AccessRecorder};
pub use service::{ServiceSettings, ShortLinkService};
