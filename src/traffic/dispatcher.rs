//! Outbound request dispatch.
//!
//! # Responsibilities
//! - Issue one GET per dispatch slot with the plan's headers and timeout
//! - Bind the slot's source address when one was selected
//! - Fold every outcome into `RequestStats`
//!
//! # Design Decisions
//! - A response counts as success when it carries a non-empty body,
//!   whatever its status; empty bodies, transport errors and timeouts fail
//! - Errors stop here: nothing is retried and nothing reaches the scheduler
//! - One `reqwest::Client` per source address, created on first use

use std::net::IpAddr;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::traffic::plan::RequestPlan;
use crate::traffic::stats::RequestStats;

const USER_AGENT: &str = concat!("annoying-client/", env!("CARGO_PKG_VERSION"));

/// Fully resolved target of one dispatch slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub source: Option<IpAddr>,
}

/// Why a dispatch failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to build client for {source_addr:?}: {error}")]
    Client {
        source_addr: Option<IpAddr>,
        #[source]
        error: reqwest::Error,
    },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read body (status {status}): {error}")]
    Body {
        status: u16,
        #[source]
        error: reqwest::Error,
    },

    #[error("empty body (status {0})")]
    EmptyBody(u16),
}

impl DispatchError {
    /// HTTP status observed before the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Body { status, .. } | DispatchError::EmptyBody(status) => Some(*status),
            DispatchError::Transport(e) => e.status().map(|s| s.as_u16()),
            DispatchError::Client { .. } | DispatchError::Timeout => None,
        }
    }
}

/// Result of a single dispatch.
#[derive(Debug)]
pub enum Outcome {
    Success { status: u16 },
    Failure(DispatchError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Success { status } => Some(*status),
            Outcome::Failure(e) => e.status(),
        }
    }
}

/// Sends requests and records their outcomes.
pub struct Dispatcher {
    stats: Arc<RequestStats>,
    clients: DashMap<Option<IpAddr>, reqwest::Client>,
}

impl Dispatcher {
    pub fn new(stats: Arc<RequestStats>) -> Self {
        Self {
            stats,
            clients: DashMap::new(),
        }
    }

    /// Send one request and record its outcome. Never fails.
    pub async fn dispatch(&self, target: Target, plan: &RequestPlan) -> Outcome {
        let outcome = match self.send(&target, plan).await {
            Ok(status) => Outcome::Success { status },
            Err(e) => {
                tracing::debug!(url = %target.url, source = ?target.source, error = %e, "Dispatch failed");
                Outcome::Failure(e)
            }
        };

        self.stats.record_outcome(outcome.is_success(), outcome.status());
        outcome
    }

    async fn send(&self, target: &Target, plan: &RequestPlan) -> Result<u16, DispatchError> {
        let client = self.client_for(target.source)?;

        let response = client
            .get(&target.url)
            .headers(plan.headers.clone())
            .timeout(plan.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|error| match classify(error) {
                DispatchError::Transport(error) => DispatchError::Body { status, error },
                other => other,
            })?;

        if body.is_empty() {
            return Err(DispatchError::EmptyBody(status));
        }
        Ok(status)
    }

    fn client_for(&self, source: Option<IpAddr>) -> Result<reqwest::Client, DispatchError> {
        if let Some(client) = self.clients.get(&source) {
            return Ok(client.value().clone());
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .local_address(source)
            .build()
            .map_err(|error| DispatchError::Client {
                source_addr: source,
                error,
            })?;

        Ok(self.clients.entry(source).or_insert(client).value().clone())
    }
}

fn classify(error: reqwest::Error) -> DispatchError {
    if error.is_timeout() {
        DispatchError::Timeout
    } else {
        DispatchError::Transport(error)
    }
}
