//! Offline fallback for the notes list.
//!
//! Wraps any [`NotesApi`] the way the page's service worker wraps `fetch`:
//! notes GETs go to the network and refresh a named cache on success, and a
//! failed GET is answered from the cache when an entry exists. Nothing is
//! ever evicted; the cache lives as long as the process.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::{ApiResult, Credentials, FileUpload, LoginResponse, NotesApi, UploadReceipt};
use crate::models::{CreatedNote, Note, NoteDraft, Profile};

pub const NOTES_CACHE_NAME: &str = "notes-cache-v1";

#[derive(Debug)]
pub struct CachedNotesApi<A> {
    inner: A,
    entries: Mutex<HashMap<String, Vec<Note>>>,
}

impl<A: NotesApi> CachedNotesApi<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn cached_notes(&self, token: Option<&str>) -> Option<Vec<Note>> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&cache_key(token)).cloned())
    }
}

/// Requests are keyed the way the worker keys them: by URL, which carries the token.
fn cache_key(token: Option<&str>) -> String {
    match token {
        Some(token) => format!("/api/notes?token={token}"),
        None => "/api/notes".to_string(),
    }
}

impl<A: NotesApi> NotesApi for CachedNotesApi<A> {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.inner.login(credentials).await
    }

    async fn fetch_profile(&self, token: Option<&str>) -> ApiResult<Profile> {
        self.inner.fetch_profile(token).await
    }

    async fn fetch_notes(&self, token: Option<&str>) -> ApiResult<Vec<Note>> {
        match self.inner.fetch_notes(token).await {
            Ok(notes) => {
                if let Ok(mut entries) = self.entries.lock() {
                    entries.insert(cache_key(token), notes.clone());
                }
                Ok(notes)
            }
            Err(error) => {
                if let Some(cached) = self.cached_notes(token) {
                    tracing::warn!(
                        cache = NOTES_CACHE_NAME,
                        "Notes fetch failed, serving cached copy: {}",
                        error
                    );
                    Ok(cached)
                } else {
                    Err(error)
                }
            }
        }
    }

    async fn create_note(&self, draft: &NoteDraft, token: Option<&str>) -> ApiResult<CreatedNote> {
        self.inner.create_note(draft, token).await
    }

    async fn upload_file(&self, upload: FileUpload, token: Option<&str>) -> ApiResult<UploadReceipt> {
        self.inner.upload_file(upload, token).await
    }
}
