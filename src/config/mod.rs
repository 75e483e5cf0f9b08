//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     ← startup file (loader.rs: discover, parse JSON/TOML)
//!     ← PUT /config body or watched file edit
//!     → merge.rs (deep merge over the current document)
//!     → validation.rs (semantic checks)
//!     → store.rs (atomic swap of Arc<Config>)
//!     → scheduler reads one snapshot per tick
//! ```
//!
//! # Design Decisions
//! - A snapshot is immutable; changes produce a new Arc<Config>
//! - All fields have defaults to allow minimal configs
//! - Invalid merges are rejected and leave the store untouched
//! - Secrets never leave the store except through `current()`

pub mod loader;
pub mod merge;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{ClientAuth, Config};
pub use store::ConfigStore;
