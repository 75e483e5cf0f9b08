//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs, main.rs):
//!     Load config → build store/stats/dispatcher → start scheduler → serve control plane
//!
//! Shutdown:
//!     Signal received (signals.rs) → broadcast (shutdown.rs)
//!     → scheduler timer exits, control plane stops accepting → process exits
//! ```
//!
//! # Design Decisions
//! - No graceful drain of outstanding requests; the runtime drops them

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::App;
