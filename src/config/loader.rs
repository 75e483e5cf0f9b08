//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config::merge::{deep_merge, normalize_legacy_keys};
use crate::config::schema::Config;
use crate::config::validation::{validate_config, ValidationError};

/// File name looked up when none is given on the command line.
pub const DEFAULT_CONFIG_NAME: &str = "config.json";

/// Error type for configuration loading and merging.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("configuration must be a JSON object")]
    NotAnObject,

    #[error("configuration document is empty")]
    Empty,

    #[error("configuration has the wrong shape: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of startup configuration loading.
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub config: Config,
    /// File the configuration came from, if one was used.
    pub source: Option<PathBuf>,
}

/// Candidate locations for a config file name: `./`, `../`, then as given.
pub fn candidate_paths(name: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(name));
        if let Some(parent) = cwd.parent() {
            candidates.push(parent.join(name));
        }
    }
    candidates.push(name.to_path_buf());
    candidates
}

/// First existing candidate for `name`.
pub fn discover(name: &Path) -> Option<PathBuf> {
    candidate_paths(name).into_iter().find(|p| p.is_file())
}

/// Read a partial configuration document from a JSON or TOML file.
///
/// The document must be a non-empty object. It is returned unmerged.
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path)?;

    let mut doc: Value = if has_extension(path, "toml") {
        let table: toml::Table = toml::from_str(&content)?;
        serde_json::to_value(table).map_err(ConfigError::Json)?
    } else {
        serde_json::from_str(&content).map_err(ConfigError::Json)?
    };

    match &doc {
        Value::Object(map) if map.is_empty() => return Err(ConfigError::Empty),
        Value::Object(_) => {}
        _ => return Err(ConfigError::NotAnObject),
    }

    normalize_legacy_keys(&mut doc);
    Ok(doc)
}

/// Merge a partial document over `base`, then decode and validate.
pub fn apply_partial(base: &Config, mut partial: Value) -> Result<Config, ConfigError> {
    if !partial.is_object() {
        return Err(ConfigError::NotAnObject);
    }
    normalize_legacy_keys(&mut partial);

    let mut doc = base.to_document();
    deep_merge(&mut doc, partial);

    let config: Config = serde_json::from_value(doc).map_err(ConfigError::Decode)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a configuration file over the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let doc = load_document(path)?;
    apply_partial(&Config::default(), doc)
}

/// Resolve the startup configuration. Never fails: every problem is logged
/// and the defaults are kept.
pub fn load_startup(arg: Option<&Path>) -> StartupConfig {
    if let Some(arg) = arg {
        if !has_extension(arg, "json") && !has_extension(arg, "toml") {
            tracing::error!(
                path = %arg.display(),
                "Supplied argument is not a JSON file"
            );
        }
    }

    let name = arg.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_NAME));

    let Some(path) = discover(name) else {
        tracing::warn!(
            name = %name.display(),
            "No configuration file found. Continuing with default config."
        );
        return StartupConfig {
            config: Config::default(),
            source: None,
        };
    };

    match load_config(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "Using configuration from file");
            StartupConfig {
                config,
                source: Some(path),
            }
        }
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Not a proper config file. Continuing with default config."
            );
            StartupConfig {
                config: Config::default(),
                source: None,
            }
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
