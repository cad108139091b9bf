//! reqwest implementation of [`NotesApi`].

use std::sync::Arc;

use reqwest::header::{ACCEPT, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ApiError, ApiResult, Credentials, FileUpload, LoginResponse, NotesApi, UploadReceipt};
use crate::cookies::CookieJar;
use crate::models::{CreatedNote, Note, NoteDraft, Profile};
use crate::util::{compact_text, is_http_url};

/// HTTP client for the notes backend.
///
/// Every request carries the cookie jar's `Cookie` header, the way a browser
/// attaches same-site cookies to `fetch` calls.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    cookies: Arc<CookieJar>,
}

impl ApiClient {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl AsRef<str>, cookies: Arc<CookieJar>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().build()?,
            cookies,
        })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, route: &str, token: Option<&str>) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, route))
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(cookie_header) = self.cookies.header_value() {
            request = request.header(COOKIE, cookie_header);
        }
        request
    }
}

impl NotesApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        tracing::debug!(email = %credentials.email, "POST /api/login");
        let response = self
            .request(Method::POST, "/api/login", None)
            .json(credentials)
            .send()
            .await?;
        // Error payloads still parse; a missing token is the caller's soft failure.
        decode_body(response).await
    }

    async fn fetch_profile(&self, token: Option<&str>) -> ApiResult<Profile> {
        tracing::debug!(authenticated = token.is_some(), "GET /api/profile");
        let response = self
            .request(Method::GET, "/api/profile", token)
            .send()
            .await?;
        // An error payload must not replace the caller's last good profile.
        decode_success_body(response).await
    }

    async fn fetch_notes(&self, token: Option<&str>) -> ApiResult<Vec<Note>> {
        tracing::debug!(authenticated = token.is_some(), "GET /api/notes");
        let mut request = self.request(Method::GET, "/api/notes", token);
        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }
        let payload = decode_body::<Value>(request.send().await?).await?;
        normalize_notes_payload(payload)
    }

    async fn create_note(&self, draft: &NoteDraft, token: Option<&str>) -> ApiResult<CreatedNote> {
        tracing::debug!(content_len = draft.content.len(), "POST /api/notes");
        let response = self
            .request(Method::POST, "/api/notes", token)
            .json(draft)
            .send()
            .await?;
        decode_success_body(response).await
    }

    async fn upload_file(&self, upload: FileUpload, token: Option<&str>) -> ApiResult<UploadReceipt> {
        tracing::debug!(
            file_name = %upload.file_name,
            size = upload.bytes.len(),
            "POST /api/upload"
        );
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part("file", part);

        let mut request = self.request(Method::POST, "/api/upload", token);
        if let Some(token) = token {
            request = request.query(&[("token", token)]);
        }
        let response = request.multipart(form).send().await?;
        decode_success_body(response).await
    }
}

/// Validates and normalizes an API base URL (scheme required, no trailing slash).
pub fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(ApiError::InvalidConfiguration(
            "API base URL must not be empty",
        ));
    }
    if !is_http_url(&base) {
        return Err(ApiError::InvalidConfiguration(
            "API base URL must include http:// or https://",
        ));
    }
    Ok(base)
}

/// Normalizes a notes payload: arrays decode to notes, anything else is empty.
pub fn normalize_notes_payload(payload: Value) -> ApiResult<Vec<Note>> {
    match payload {
        Value::Array(_) => Ok(serde_json::from_value(payload)?),
        other => {
            tracing::warn!(
                payload = %compact_text(&other.to_string()),
                "Notes response was not an array; treating as empty"
            );
            Ok(Vec::new())
        }
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ApiError::Status {
            status: status.as_u16(),
            body: compact_text(&body),
        }),
        Err(error) => Err(error.into()),
    }
}

async fn decode_success_body<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: compact_text(&body),
        });
    }
    Ok(response.json::<T>().await?)
}
