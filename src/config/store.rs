//! The single active configuration.
//!
//! Readers take a lock-free `Arc<Config>` snapshot; writers merge a partial
//! document under a mutex and swap the result in atomically.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::config::loader::{apply_partial, ConfigError};
use crate::config::schema::Config;

/// Holds the active configuration and serialises updates to it.
pub struct ConfigStore {
    current: ArcSwap<Config>,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the active configuration, secrets included.
    pub fn current(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// The active configuration without `password` and `clientAuth`.
    pub fn public_view(&self) -> Value {
        self.current.load().redacted()
    }

    /// Deep-merge `partial` into the active configuration.
    ///
    /// The merged result is decoded and validated before it is swapped in;
    /// on error the active configuration is left as it was.
    pub fn merge(&self, partial: Value) -> Result<Arc<Config>, ConfigError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let merged = Arc::new(apply_partial(&self.current.load(), partial)?);
        self.current.store(merged.clone());
        Ok(merged)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
