use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Listens on every interface by default; the demo is meant to be reachable.
        let bind_addr = value_or_default(&lookup, "QUILL_API_BIND_ADDR", "0.0.0.0:8000");
        if !bind_addr.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "QUILL_API_BIND_ADDR must be host:port, got `{bind_addr}`"
            )));
        }
        let db_path = PathBuf::from(value_or_default(&lookup, "QUILL_API_DB_PATH", "notes.db"));
        let upload_dir = PathBuf::from(value_or_default(
            &lookup,
            "QUILL_API_UPLOAD_DIR",
            "uploads",
        ));

        Ok(Self {
            bind_addr,
            db_path,
            upload_dir,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
