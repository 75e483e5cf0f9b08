//! Configuration schema definitions.
//!
//! The configuration is a JSON object with camelCase keys. Every field has a
//! default so that a partial document (startup file or `PUT /config` body)
//! can be layered over the defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timeout applied to outbound requests when `timeout` is not configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Keys that are never echoed back to a caller.
pub const SECRET_KEYS: [&str; 2] = ["password", "clientAuth"];

/// Root configuration for the traffic generator.
#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Control-plane listen port.
    pub http_port: u16,

    /// Base URL for performed requests.
    pub base_url: String,

    /// Number of requests fired on each tick.
    pub parallel: u32,

    /// Milliseconds between tick starts (250 with parallel 10 is 40 req/s).
    pub interval: u64,

    /// Percentage of requests sent to `index`.
    pub index_pct: u32,

    /// URI for index requests.
    pub index: String,

    /// URIs for the remaining requests, sampled uniformly.
    pub other_uris: Vec<String>,

    /// Local addresses the traffic will appear to come from.
    /// Must be available on local interfaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_addresses: Option<Vec<IpAddr>>,

    /// Authorization for the tested server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_auth: Option<ClientAuth>,

    /// Control-plane username for `PUT /config`.
    pub username: String,

    /// Control-plane password as a SHA-256 hex digest.
    pub password: String,

    /// Extra headers sent with every outbound request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    /// Per-request timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Keys this build does not know about; kept so merges pass them through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 9900,
            base_url: "http://127.0.0.1/".to_string(),
            parallel: 10,
            interval: 250,
            index_pct: 60,
            index: "/".to_string(),
            other_uris: vec!["/foo".to_string(), "/bar".to_string()],
            local_addresses: None,
            client_auth: None,
            username: "annoying".to_string(),
            // sha256("test")
            password: "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
                .to_string(),
            headers: None,
            timeout: None,
            extra: Map::new(),
        }
    }
}

impl Config {
    /// The configuration as a JSON document, secrets included.
    ///
    /// Only used internally as the left-hand side of a merge.
    pub fn to_document(&self) -> Value {
        // Serializing a struct of strings, numbers and maps cannot fail.
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// The configuration as it may be shown to a caller.
    pub fn redacted(&self) -> Value {
        let mut doc = self.to_document();
        if let Value::Object(map) = &mut doc {
            for key in SECRET_KEYS {
                map.remove(key);
            }
        }
        doc
    }

    /// Effective outbound request timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("base_url", &self.base_url)
            .field("parallel", &self.parallel)
            .field("interval", &self.interval)
            .field("index_pct", &self.index_pct)
            .field("index", &self.index)
            .field("other_uris", &self.other_uris)
            .field("local_addresses", &self.local_addresses)
            .field("client_auth", &self.client_auth)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Outbound authorization.
///
/// Either a ready `Authorization` header value, or credentials from which a
/// basic-auth header is derived.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ClientAuth {
    Header(String),
    Credentials { username: String, password: String },
}

impl fmt::Debug for ClientAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientAuth::Header(_) => f.write_str("Header(<redacted>)"),
            ClientAuth::Credentials { username, .. } => f
                .debug_struct("Credentials")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_round_through_document() {
        let config = Config::default();
        let decoded: Config = serde_json::from_value(config.to_document()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_redacted_strips_secrets() {
        let config: Config = serde_json::from_value(json!({
            "clientAuth": { "username": "u", "password": "p" },
        }))
        .unwrap();

        let doc = config.redacted();
        assert!(doc.get("password").is_none());
        assert!(doc.get("clientAuth").is_none());
        assert_eq!(doc["username"], "annoying");
    }

    #[test]
    fn test_client_auth_shapes() {
        let header: ClientAuth = serde_json::from_value(json!("Basic abc")).unwrap();
        assert_eq!(header, ClientAuth::Header("Basic abc".into()));

        let creds: ClientAuth =
            serde_json::from_value(json!({ "username": "a", "password": "b" })).unwrap();
        assert!(matches!(creds, ClientAuth::Credentials { .. }));
    }

    #[test]
    fn test_unknown_keys_kept() {
        let config: Config = serde_json::from_value(json!({ "flavour": "mint" })).unwrap();
        assert_eq!(config.extra.get("flavour"), Some(&json!("mint")));
        assert_eq!(config.to_document()["flavour"], "mint");
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", Config::default());
        assert!(!rendered.contains("9f86d0"));
    }
}
