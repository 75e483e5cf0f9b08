//! Synthetic traffic generator library.
//!
//! Fires a batch of `parallel` GET requests against a base URL every
//! `interval` milliseconds, choosing between a favoured `index` URI and a set
//! of other URIs by weight, and keeps process-lifetime outcome statistics.
//! The configuration can be replaced at runtime through an authenticated
//! `PUT /config` without losing the statistics.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod traffic;

pub use config::{Config, ConfigStore};
pub use http::HttpServer;
pub use lifecycle::{App, Shutdown};
pub use traffic::{RequestStats, Scheduler};
