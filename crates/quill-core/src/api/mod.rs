//! API client for the Quill notes backend.
//!
//! [`NotesApi`] is the seam the session store and dashboard are generic over;
//! [`ApiClient`] is the reqwest implementation that talks to the real
//! endpoints. Every operation is a single request/response pair: no retry,
//! no backoff, no timeout.

mod client;

use std::future::Future;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CreatedNote, Note, NoteDraft, Profile};

pub use client::{normalize_base_url, normalize_notes_payload, ApiClient};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Login form body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login response. A missing token is a soft failure left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Server-provided locator for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A single file staged for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Reads a file from disk, guessing its content type from the extension.
    ///
    /// No type or size checks are applied.
    pub async fn from_path(path: &Path) -> ApiResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

/// Operations the client performs against the notes backend.
pub trait NotesApi: Send + Sync + 'static {
    /// `POST /api/login`
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = ApiResult<LoginResponse>> + Send;

    /// `GET /api/profile`, bearer credential when a token is held.
    fn fetch_profile(&self, token: Option<&str>)
        -> impl Future<Output = ApiResult<Profile>> + Send;

    /// `GET /api/notes`. Non-array payloads normalize to an empty list.
    fn fetch_notes(&self, token: Option<&str>)
        -> impl Future<Output = ApiResult<Vec<Note>>> + Send;

    /// `POST /api/notes`
    fn create_note(
        &self,
        draft: &NoteDraft,
        token: Option<&str>,
    ) -> impl Future<Output = ApiResult<CreatedNote>> + Send;

    /// `POST /api/upload`, multipart field `file`.
    fn upload_file(
        &self,
        upload: FileUpload,
        token: Option<&str>,
    ) -> impl Future<Output = ApiResult<UploadReceipt>> + Send;
}
