//! Per-tick request options derived from a configuration snapshot.

use std::time::Duration;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use url::Url;

use crate::config::{ClientAuth, Config};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL {0:?} must be an http(s) URL with a host")]
    Unsupported(String),

    #[error("invalid header {0:?}")]
    Header(String),
}

/// Everything a dispatch needs besides its target.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub base_url: Url,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl RequestPlan {
    pub fn from_config(config: &Config) -> Result<Self, PlanError> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(configured) = &config.headers {
            for (name, value) in configured {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|_| PlanError::Header(name.clone()))?;
                let value =
                    HeaderValue::from_str(value).map_err(|_| PlanError::Header(name.to_string()))?;
                headers.insert(name, value);
            }
        }

        if let Some(value) = config.client_auth.as_ref().and_then(authorization_value) {
            let value = HeaderValue::from_str(&value)
                .map_err(|_| PlanError::Header(AUTHORIZATION.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            base_url,
            headers,
            timeout: Duration::from_millis(config.timeout_ms()),
        })
    }

    /// Resolve a request URI against the base URL.
    pub fn resolve(&self, uri: &str) -> String {
        join_url(self.base_url.as_str(), uri)
    }
}

/// Outbound `Authorization` value for the configured client auth.
///
/// Credentials yield `Basic base64(user:pass)` only when both parts are
/// non-empty; a string is passed through as is.
pub fn authorization_value(auth: &ClientAuth) -> Option<String> {
    match auth {
        ClientAuth::Header(value) if !value.is_empty() => Some(value.clone()),
        ClientAuth::Header(_) => None,
        ClientAuth::Credentials { username, password }
            if !username.is_empty() && !password.is_empty() =>
        {
            Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{}:{}", username, password))
            ))
        }
        ClientAuth::Credentials { .. } => None,
    }
}

/// Parse a base URL, defaulting the scheme to `http` and the path to `/`.
pub fn parse_base_url(raw: &str) -> Result<Url, PlanError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|source| PlanError::BaseUrl {
        url: raw.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(PlanError::Unsupported(raw.to_string()));
    }
    Ok(url)
}

/// Path-join with exactly one `/` between the two parts.
pub fn join_url(base: &str, uri: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        uri.trim_start_matches('/')
    )
}
