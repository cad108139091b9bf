//! Session store: the single owner of the current token.
//!
//! The token is written through one path only. [`SessionStore::store_token`]
//! persists it to local storage, updates the in-memory copy, then notifies
//! every [`TokenSubscriber`] (the cookie mirror among them). There is no
//! logout or expiry.

mod storage;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::api::{ApiError, Credentials, NotesApi};
use crate::models::Token;

pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Local storage key holding the raw token string.
pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Login response did not include a token")]
    MissingToken,
    #[error("Session storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Reader that follows token changes instead of writing its own copy.
pub trait TokenSubscriber: Send + Sync + 'static {
    fn token_changed(&self, token: Option<&Token>) -> SessionResult<()>;
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: Mutex<Option<Token>>,
    subscribers: Mutex<Vec<Arc<dyn TokenSubscriber>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SessionStore")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Opens the store, restoring any token left in local storage.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> SessionResult<Self> {
        let restored = storage.get(TOKEN_STORAGE_KEY)?.and_then(Token::new);
        if restored.is_some() {
            tracing::debug!("Restored session token from local storage");
        }
        Ok(Self {
            storage,
            current: Mutex::new(restored),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn current_token(&self) -> Option<Token> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    /// Registers a subscriber and brings it up to date with the current token.
    pub fn subscribe(&self, subscriber: Arc<dyn TokenSubscriber>) -> SessionResult<()> {
        subscriber.token_changed(self.current_token().as_ref())?;
        self.subscribers
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?
            .push(subscriber);
        Ok(())
    }

    /// Logs in through `api` and records the returned token.
    pub async fn login<A: NotesApi>(
        &self,
        api: &A,
        email: &str,
        password: &str,
    ) -> SessionResult<Token> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = api.login(&credentials).await?;
        let token = response
            .token
            .and_then(Token::new)
            .ok_or(SessionError::MissingToken)?;
        self.store_token(token.clone())?;
        Ok(token)
    }

    fn store_token(&self, token: Token) -> SessionResult<()> {
        self.storage.set(TOKEN_STORAGE_KEY, token.as_str())?;
        *self
            .current
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))? = Some(token.clone());

        let subscribers = self
            .subscribers
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?
            .clone();
        for subscriber in subscribers {
            if let Err(error) = subscriber.token_changed(Some(&token)) {
                tracing::warn!("Failed to mirror session token: {}", error);
            }
        }
        Ok(())
    }
}
