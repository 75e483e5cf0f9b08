//! Timer-driven batch loop.
//!
//! # States
//! - Idle: no timer registered
//! - Running: a timer task fires every `interval` and starts a batch
//!
//! # State Transitions
//! ```text
//! Idle    → Running: start()
//! Running → Running: reconfigure(partial)  (merge, abort old timer, spawn new)
//! Running → Idle:    stop() or shutdown broadcast
//! ```
//!
//! Once shutdown has been triggered the scheduler stays Idle: `start` and
//! `reconfigure` no longer register a timer.
//!
//! A tick never waits for its requests. Each dispatch is its own task, so
//! batches overlap when the target is slower than `interval`, and aborting
//! the timer on reconfiguration leaves in-flight requests running; they
//! still record into the stats.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::{Config, ConfigError, ConfigStore};
use crate::lifecycle::Shutdown;
use crate::observability::{console, metrics};
use crate::traffic::dispatcher::{Dispatcher, Target};
use crate::traffic::plan::RequestPlan;
use crate::traffic::selector::select;
use crate::traffic::stats::RequestStats;

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    Idle,
    Running { interval: Duration, parallel: u32 },
}

enum TimerState {
    Idle,
    Running {
        handle: JoinHandle<()>,
        interval: Duration,
        parallel: u32,
    },
}

/// Runs one batch per tick.
pub struct TickRunner {
    store: Arc<ConfigStore>,
    stats: Arc<RequestStats>,
    dispatcher: Arc<Dispatcher>,
    debug_console: bool,
    ticks: AtomicU64,
}

impl TickRunner {
    pub fn new(
        store: Arc<ConfigStore>,
        stats: Arc<RequestStats>,
        dispatcher: Arc<Dispatcher>,
        debug_console: bool,
    ) -> Self {
        Self {
            store,
            stats,
            dispatcher,
            debug_console,
            ticks: AtomicU64::new(0),
        }
    }

    /// Start one batch and return the number of dispatches initiated.
    ///
    /// Reads the configuration once, so a batch is consistent even if a
    /// reconfiguration lands mid-tick. Must be called inside a tokio runtime.
    pub fn tick(&self) -> usize {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let config = self.store.current();

        let plan = match RequestPlan::from_config(&config) {
            Ok(plan) => Arc::new(plan),
            Err(e) => {
                tracing::error!(error = %e, "Skipping tick: unusable configuration");
                return 0;
            }
        };

        let mut initiated = 0;
        {
            let mut rng = rand::thread_rng();
            for _ in 0..config.parallel {
                let Some(selection) = select(&config, &mut rng) else {
                    tracing::warn!("No URI to select for this slot");
                    continue;
                };

                let target = Target {
                    url: plan.resolve(&selection.uri),
                    source: selection.source,
                };
                self.stats
                    .record_attempt(selection.kind, &target.url, target.source);

                let dispatcher = self.dispatcher.clone();
                let plan = plan.clone();
                tokio::spawn(async move {
                    dispatcher.dispatch(target, &plan).await;
                });
                initiated += 1;
            }
        }

        if self.debug_console {
            console::render(&self.stats.snapshot());
        }

        initiated
    }

    /// Ticks run since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

/// Owns the repeating timer and swaps it on reconfiguration.
pub struct Scheduler {
    runner: Arc<TickRunner>,
    store: Arc<ConfigStore>,
    shutdown: Shutdown,
    state: Mutex<TimerState>,
}

impl Scheduler {
    pub fn new(runner: Arc<TickRunner>, shutdown: Shutdown) -> Self {
        let store = runner.store.clone();
        Self {
            runner,
            store,
            shutdown,
            state: Mutex::new(TimerState::Idle),
        }
    }

    pub fn runner(&self) -> &Arc<TickRunner> {
        &self.runner
    }

    /// Register the timer using the current configuration. No-op if running.
    pub async fn start(&self) {
        let mut state = self.state.lock().await;
        self.settle(&mut state);
        if let TimerState::Running { .. } = &*state {
            tracing::warn!("Scheduler already running");
            return;
        }
        if self.shutdown.is_triggered() {
            tracing::warn!("Not starting scheduler: shutdown in progress");
            return;
        }
        *state = self.spawn_timer(&self.store.current());
    }

    /// Merge `partial` into the store and restart the timer with the result.
    ///
    /// Merge and timer swap happen under one lock, so two timers never run
    /// at once. A rejected merge leaves both the store and the timer as they
    /// were. When idle, the merge is applied and the scheduler stays idle.
    pub async fn reconfigure(&self, partial: Value) -> Result<Arc<Config>, ConfigError> {
        let mut state = self.state.lock().await;
        self.settle(&mut state);

        let config = self.store.merge(partial)?;
        metrics::record_reconfiguration();

        if let TimerState::Running { handle, .. } = std::mem::replace(&mut *state, TimerState::Idle) {
            handle.abort();
            *state = self.spawn_timer(&config);
        } else {
            tracing::info!("Configuration updated while idle");
        }

        Ok(config)
    }

    /// Cancel the timer. In-flight requests are left to finish on their own.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if let TimerState::Running { handle, .. } = std::mem::replace(&mut *state, TimerState::Idle) {
            handle.abort();
            tracing::info!("Scheduler stopped");
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        let mut state = self.state.lock().await;
        self.settle(&mut state);
        match &*state {
            TimerState::Idle => SchedulerStatus::Idle,
            TimerState::Running {
                interval, parallel, ..
            } => SchedulerStatus::Running {
                interval: *interval,
                parallel: *parallel,
            },
        }
    }

    /// Fold a timer that has exited, or is about to exit on shutdown, into
    /// Idle.
    fn settle(&self, state: &mut TimerState) {
        let retired = match state {
            TimerState::Running { handle, .. } => {
                handle.is_finished() || self.shutdown.is_triggered()
            }
            TimerState::Idle => false,
        };
        if retired {
            if let TimerState::Running { handle, .. } = std::mem::replace(state, TimerState::Idle) {
                handle.abort();
                tracing::info!("Scheduler timer retired after shutdown");
            }
        }
    }

    fn spawn_timer(&self, config: &Config) -> TimerState {
        let period = Duration::from_millis(config.interval.max(1));
        let runner = self.runner.clone();
        let mut shutdown = self.shutdown.subscribe();

        tracing::info!(
            interval_ms = period.as_millis() as u64,
            parallel = config.parallel,
            base_url = %config.base_url,
            "Scheduler timer registered"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        runner.tick();
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Scheduler received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        });

        TimerState::Running {
            handle,
            interval: period,
            parallel: config.parallel,
        }
    }
}
