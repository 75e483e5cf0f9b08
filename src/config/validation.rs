//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (parallel, interval, indexPct, timeout)
//! - Check that the base URL and outbound headers are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs before a merged config is accepted into the store

use std::fmt;

use axum::http::{HeaderName, HeaderValue};

use crate::config::schema::{ClientAuth, Config};
use crate::traffic::plan::parse_base_url;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a decoded configuration against its invariants.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.parallel == 0 {
        errors.push(ValidationError::new("parallel", "must be at least 1"));
    }

    if config.interval == 0 {
        errors.push(ValidationError::new("interval", "must be at least 1 ms"));
    }

    if !(1..=100).contains(&config.index_pct) {
        errors.push(ValidationError::new(
            "indexPct",
            format!("must be within 1..=100, got {}", config.index_pct),
        ));
    } else if config.index_pct < 100 && config.other_uris.is_empty() {
        errors.push(ValidationError::new(
            "otherUris",
            "must not be empty while indexPct is below 100",
        ));
    }

    if config.timeout == Some(0) {
        errors.push(ValidationError::new("timeout", "must be at least 1 ms"));
    }

    if let Err(e) = parse_base_url(&config.base_url) {
        errors.push(ValidationError::new("baseUrl", e.to_string()));
    }

    if let Some(headers) = &config.headers {
        for (name, value) in headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.push(ValidationError::new(
                    "headers",
                    format!("invalid header name {:?}", name),
                ));
            }
            if HeaderValue::from_str(value).is_err() {
                errors.push(ValidationError::new(
                    "headers",
                    format!("invalid value for header {:?}", name),
                ));
            }
        }
    }

    if let Some(ClientAuth::Header(value)) = &config.client_auth {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(
                "clientAuth",
                "not a valid Authorization header value",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
