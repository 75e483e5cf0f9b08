//! Basic-auth guard for the control plane.
//!
//! The configured password is stored as a SHA-256 hex digest. Digests of
//! attempted passwords are cached for the life of the process so repeated
//! attempts with the same string skip the hash.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::http::server::AppState;

pub const REALM: &str = "Annoying Client Auth";

/// SHA-256 of `password` as lowercase hex.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Checks control-plane credentials against the active configuration.
#[derive(Debug, Default)]
pub struct Authorizer {
    hashes: DashMap<String, String>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Authorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `username` matches and the digest of `password` equals the
    /// configured digest, compared case-insensitively.
    pub fn authorize(&self, config: &Config, username: &str, password: &str) -> bool {
        if username != config.username {
            return false;
        }
        let hash = self.digest(password);
        hash.eq_ignore_ascii_case(&config.password)
    }

    fn digest(&self, password: &str) -> String {
        if let Some(hash) = self.hashes.get(password) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return hash.value().clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let hash = hash_password(password);
        self.hashes.insert(password.to_string(), hash.clone());
        hash
    }

    /// Attempts answered from the cache.
    pub fn cache_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Attempts that needed a fresh digest.
    pub fn cache_misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// Split a `Basic` authorization header into username and password.
pub fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic);

    if let Some((username, password)) = credentials {
        let config = state.store.current();
        if state.authorizer.authorize(&config, &username, &password) {
            return next.run(request).await;
        }
        tracing::warn!(username = %username, "Rejected control-plane credentials");
    }

    challenge()
}

fn challenge() -> Response {
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", REALM)) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }
    response
}
