//! HTTP surface of the kussx URL shortener.
//!
//! The router only translates between HTTP and the
//! [`Shortener`](kussx_core::Shortener) contract; everything else lives in
//! the service crates. Configuration and logging setup used by the `kussx`
//! binary live here too so they can be tested.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
