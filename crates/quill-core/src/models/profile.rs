//! Profile model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the logged-in principal.
///
/// Only `user` is interpreted. Everything else the server sends is kept
/// verbatim in `extra` and displayed as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Display lines for the secondary fields, in key order.
    #[must_use]
    pub fn extra_lines(&self) -> Vec<String> {
        let mut keys = self.extra.keys().collect::<Vec<_>>();
        keys.sort();
        keys.into_iter()
            .map(|key| match &self.extra[key] {
                Value::String(text) => format!("{key}: {text}"),
                other => format!("{key}: {other}"),
            })
            .collect()
    }
}
