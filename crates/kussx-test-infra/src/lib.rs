//! Disposable infrastructure for integration tests.
//!
//! Fixtures start real containers through testcontainers and need a
//! reachable Docker daemon.

pub mod error;
pub mod redis;

pub use error::{Result, TestInfraError};
