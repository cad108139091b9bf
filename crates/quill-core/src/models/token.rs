//! Session token

use std::fmt;

use serde::{Deserialize, Serialize};

const SNIPPET_CHARS: usize = 12;

/// Opaque credential issued at login.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wraps a raw token string, rejecting blank values.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display snippet: a strict prefix of the token followed by an ellipsis.
    ///
    /// Never yields the whole token, even for very short ones.
    #[must_use]
    pub fn snippet(&self) -> String {
        let total = self.0.chars().count();
        let visible = SNIPPET_CHARS.min(total.saturating_sub(1));
        let prefix = self.0.chars().take(visible).collect::<String>();
        format!("{prefix}…")
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Token").field(&"[REDACTED]").finish()
    }
}
