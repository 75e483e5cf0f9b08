//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters mirrored from RequestStats)
//!     → console.rs (stats redraw per tick, debug mode only)
//! ```

pub mod console;
pub mod logging;
pub mod metrics;
