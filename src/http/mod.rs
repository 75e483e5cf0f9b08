//! Control-plane HTTP handling.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers)
//!     → admin router
//!         PUT /config → basic auth → Scheduler::reconfigure
//!         anything else → stats document
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
