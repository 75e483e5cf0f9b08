//! Request statistics shared by every dispatch.
//!
//! Counters only grow and live for the whole process; a reconfiguration
//! never resets them. Increments come from many tokio worker threads at
//! once, so scalars are atomics and keyed counters live in `DashMap`s.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::observability::metrics;
use crate::traffic::selector::SelectionKind;

/// Histogram key for outcomes that carry no HTTP status.
pub const TRANSPORT_ERROR_KEY: &str = "error";

/// Process-wide request counters.
#[derive(Debug, Default)]
pub struct RequestStats {
    success: AtomicU64,
    fail: AtomicU64,
    index: AtomicU64,
    other: AtomicU64,
    statuses: DashMap<String, u64>,
    targets: DashMap<String, u64>,
    sources: DashMap<String, u64>,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a dispatch slot as attempted, before the request is sent.
    pub fn record_attempt(&self, kind: SelectionKind, url: &str, source: Option<IpAddr>) {
        match kind {
            SelectionKind::Index => self.index.fetch_add(1, Ordering::Relaxed),
            SelectionKind::Other => self.other.fetch_add(1, Ordering::Relaxed),
        };

        *self.targets.entry(url.to_string()).or_insert(0) += 1;

        if let Some(addr) = source {
            *self.sources.entry(addr.to_string()).or_insert(0) += 1;
        }

        metrics::record_attempt(kind);
    }

    /// Count an observed outcome. `status` is `None` when no response arrived.
    pub fn record_outcome(&self, success: bool, status: Option<u16>) {
        let key = status
            .map(|code| code.to_string())
            .unwrap_or_else(|| TRANSPORT_ERROR_KEY.to_string());
        *self.statuses.entry(key).or_insert(0) += 1;

        if success {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.fail.fetch_add(1, Ordering::Relaxed);
        }

        metrics::record_outcome(success, status);
    }

    pub fn success_count(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn fail_count(&self) -> u64 {
        self.fail.load(Ordering::Relaxed)
    }

    /// Number of outcomes observed so far.
    pub fn completed(&self) -> u64 {
        self.success_count() + self.fail_count()
    }

    /// Number of slots counted as attempted so far.
    pub fn attempted(&self) -> u64 {
        self.index.load(Ordering::Relaxed) + self.other.load(Ordering::Relaxed)
    }

    /// Point-in-time copy in the shape served by the stats endpoint.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            req: SelectionStats {
                index: self.index.load(Ordering::Relaxed),
                other: self.other.load(Ordering::Relaxed),
                req_to: collect(&self.targets),
                req_from: collect(&self.sources),
                statuses: collect(&self.statuses),
            },
            res: OutcomeStats {
                success: self.success_count(),
                fail: self.fail_count(),
            },
        }
    }
}

fn collect(map: &DashMap<String, u64>) -> BTreeMap<String, u64> {
    map.iter().map(|r| (r.key().clone(), *r.value())).collect()
}

/// `{ req, res }` document served by the stats endpoint.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub req: SelectionStats,
    pub res: OutcomeStats,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SelectionStats {
    pub index: u64,
    pub other: u64,
    pub req_to: BTreeMap<String, u64>,
    pub req_from: BTreeMap<String, u64>,
    pub statuses: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct OutcomeStats {
    pub success: u64,
    pub fail: u64,
}
