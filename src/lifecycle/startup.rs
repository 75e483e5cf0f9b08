//! Startup orchestration.
//!
//! Builds the shared handles in dependency order: store and stats first,
//! then the dispatcher and tick runner, then the scheduler that owns the
//! timer. The control plane only sees the finished handles.

use std::sync::Arc;

use crate::admin::auth::Authorizer;
use crate::config::{Config, ConfigStore};
use crate::http::AppState;
use crate::lifecycle::Shutdown;
use crate::traffic::{Dispatcher, RequestStats, Scheduler, TickRunner};

/// Every long-lived component of the process.
#[derive(Clone)]
pub struct App {
    pub store: Arc<ConfigStore>,
    pub stats: Arc<RequestStats>,
    pub scheduler: Arc<Scheduler>,
    pub authorizer: Arc<Authorizer>,
    pub shutdown: Shutdown,
}

impl App {
    pub fn new(config: Config, debug_console: bool) -> Self {
        let shutdown = Shutdown::new();
        let store = Arc::new(ConfigStore::new(config));
        let stats = Arc::new(RequestStats::new());
        let dispatcher = Arc::new(Dispatcher::new(stats.clone()));
        let runner = Arc::new(TickRunner::new(
            store.clone(),
            stats.clone(),
            dispatcher,
            debug_console,
        ));
        let scheduler = Arc::new(Scheduler::new(runner, shutdown.clone()));

        Self {
            store,
            stats,
            scheduler,
            authorizer: Arc::new(Authorizer::new()),
            shutdown,
        }
    }

    /// State handed to the control-plane router.
    pub fn state(&self) -> AppState {
        AppState {
            store: self.store.clone(),
            stats: self.stats.clone(),
            scheduler: self.scheduler.clone(),
            authorizer: self.authorizer.clone(),
        }
    }
}
