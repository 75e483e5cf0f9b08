//! Traffic dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler.rs timer tick
//!     → ConfigStore::current() (one snapshot per tick)
//!     → plan.rs (base URL, headers, timeout for this tick)
//!     → selector.rs (index vs other, source address) × parallel
//!     → stats.rs record_attempt
//!     → dispatcher.rs (spawned, not awaited)
//!     → stats.rs record_outcome
//! ```
//!
//! # Design Decisions
//! - Shared state is passed as Arc handles, never globals
//! - Every dispatch is an independent task; failures end there
//! - Timer replacement is the only cancellation; requests are never cancelled

pub mod dispatcher;
pub mod plan;
pub mod scheduler;
pub mod selector;
pub mod stats;

pub use dispatcher::{Dispatcher, Outcome, Target};
pub use plan::RequestPlan;
pub use scheduler::{Scheduler, SchedulerStatus, TickRunner};
pub use selector::{select, Selection, SelectionKind};
pub use stats::{RequestStats, StatsSnapshot};
