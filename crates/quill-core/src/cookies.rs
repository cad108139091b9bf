//! Browser-style cookie jar.
//!
//! Holds the `session` cookie that mirrors the session token and the free-form
//! `debug` cookie set from the cookie inspector. The session mirror is written
//! only through [`TokenSubscriber::token_changed`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::models::Token;
use crate::session::{SessionError, SessionResult, TokenSubscriber};

pub const SESSION_COOKIE: &str = "session";
pub const DEBUG_COOKIE: &str = "debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    #[serde(default)]
    pub same_site: Option<SameSite>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// Expiry as Unix seconds; `None` never expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl Cookie {
    /// Session mirror cookie: cross-site sendable, script readable, non-expiring.
    pub fn session_mirror(token: &Token) -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            value: token.as_str().to_string(),
            path: "/".to_string(),
            same_site: Some(SameSite::None),
            secure: false,
            http_only: false,
            expires_at: None,
        }
    }

    pub fn debug(value: impl Into<String>) -> Self {
        Self {
            name: DEBUG_COOKIE.to_string(),
            value: value.into(),
            path: "/".to_string(),
            same_site: None,
            secure: false,
            http_only: false,
            expires_at: None,
        }
    }

    /// Renders the cookie the way a `Set-Cookie` header would carry it.
    pub fn to_set_cookie_string(&self) -> String {
        let mut rendered = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(same_site) = self.same_site {
            rendered.push_str(&format!("; SameSite={same_site}"));
        }
        if self.secure {
            rendered.push_str("; Secure");
        }
        if self.http_only {
            rendered.push_str("; HttpOnly");
        }
        if let Some(expires_at) = self.expires_at {
            rendered.push_str(&format!("; Expires={expires_at}"));
        }
        rendered
    }
}

/// Named cookies with optional on-disk persistence.
#[derive(Debug)]
pub struct CookieJar {
    cookies: Mutex<BTreeMap<String, Cookie>>,
    path: Option<PathBuf>,
}

impl CookieJar {
    pub fn in_memory() -> Self {
        Self {
            cookies: Mutex::new(BTreeMap::new()),
            path: None,
        }
    }

    /// Opens a jar persisted at `path`, loading existing cookies when present.
    pub fn open(path: impl Into<PathBuf>) -> SessionResult<Self> {
        let path = path.into();
        let cookies = load_cookies(&path)?;
        Ok(Self {
            cookies: Mutex::new(cookies),
            path: Some(path),
        })
    }

    pub fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .lock()
            .ok()
            .and_then(|cookies| cookies.get(name).cloned())
    }

    pub fn set(&self, cookie: Cookie) -> SessionResult<()> {
        let mut cookies = self
            .cookies
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        cookies.insert(cookie.name.clone(), cookie);
        self.persist(&cookies)
    }

    /// Writes the free-form debug cookie from the cookie inspector.
    pub fn set_debug_cookie(&self, value: impl Into<String>) -> SessionResult<()> {
        self.set(Cookie::debug(value))
    }

    /// `Cookie` request header value, or `None` when the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.cookies.lock().ok()?;
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .values()
                .map(|cookie| format!("{}={}", cookie.name, cookie.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// One `Set-Cookie`-style line per cookie, for the cookie inspector.
    pub fn listing(&self) -> Vec<String> {
        self.cookies.lock().map_or_else(
            |_| Vec::new(),
            |cookies| cookies.values().map(Cookie::to_set_cookie_string).collect(),
        )
    }

    fn persist(&self, cookies: &BTreeMap<String, Cookie>) -> SessionResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(cookies)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}

impl TokenSubscriber for CookieJar {
    fn token_changed(&self, token: Option<&Token>) -> SessionResult<()> {
        match token {
            Some(token) => self.set(Cookie::session_mirror(token)),
            None => Ok(()),
        }
    }
}

fn load_cookies(path: &Path) -> SessionResult<BTreeMap<String, Cookie>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn session_mirror_uses_permissive_attributes() {
        let token = Token::new("abc123").unwrap();
        let cookie = Cookie::session_mirror(&token);
        assert_eq!(
            cookie.to_set_cookie_string(),
            "session=abc123; Path=/; SameSite=None"
        );
        assert!(!cookie.http_only);
        assert!(!cookie.secure);
        assert_eq!(cookie.expires_at, None);
    }

    #[test]
    fn header_value_joins_cookies_in_name_order() {
        let jar = CookieJar::in_memory();
        assert_eq!(jar.header_value(), None);

        jar.token_changed(Some(&Token::new("abc123").unwrap()))
            .unwrap();
        jar.set_debug_cookie("hello").unwrap();
        assert_eq!(
            jar.header_value().as_deref(),
            Some("debug=hello; session=abc123")
        );
    }

    #[test]
    fn clearing_token_leaves_mirror_in_place() {
        let jar = CookieJar::in_memory();
        jar.token_changed(Some(&Token::new("abc123").unwrap()))
            .unwrap();
        jar.token_changed(None).unwrap();
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().value, "abc123");
    }

    #[test]
    fn persisted_jar_reloads_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cookies.json");
        {
            let jar = CookieJar::open(&path).unwrap();
            jar.set_debug_cookie("<script>alert(1)</script>").unwrap();
        }

        let reopened = CookieJar::open(&path).unwrap();
        assert_eq!(
            reopened.listing(),
            vec!["debug=<script>alert(1)</script>; Path=/".to_string()]
        );
    }
}
