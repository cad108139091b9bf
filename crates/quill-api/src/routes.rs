use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{issue_token, resolve_caller, SESSION_COOKIE};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::store::{NoteRow, NoteStore};

const CONTENT_SECURITY_POLICY: &str = "default-src *; script-src * 'unsafe-inline' 'unsafe-eval' https://cdn.jsdelivr.net; script-src-elem, 'self'; object-src *; frame-ancestors *;";
const PROXY_TIMEOUT: Duration = Duration::from_secs(2);
const CONTENT_SECURITY_POLICY_REPORT_ONLY: &str =
    "default-src * data: blob:; script-src * 'unsafe-inline' 'unsafe-eval';";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    store: Arc<NoteStore>,
    http: reqwest::Client,
}

impl AppState {
    /// Opens the note database and makes sure the upload directory exists.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.upload_dir).map_err(|error| {
            AppError::Config(format!(
                "Failed to create upload directory {}: {}",
                config.upload_dir.display(),
                error
            ))
        })?;
        let store = NoteStore::open(&config.db_path)?;
        Self::new(config, store)
    }

    /// Certificate checks are off for proxied fetches.
    pub fn new(config: Arc<AppConfig>, store: NoteStore) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(PROXY_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|error| AppError::Config(format!("Failed to build HTTP client: {error}")))?;
        Ok(Self {
            config,
            store: Arc::new(store),
            http,
        })
    }

    /// Runs a store call on the blocking pool.
    async fn with_store<T, F>(&self, operation: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&NoteStore) -> Result<T, AppError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || operation(&store)).await?
    }
}

pub fn app_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/api/login", post(login))
        .route("/api/profile", get(profile))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/proxy", get(proxy))
        .route("/api/upload", post(upload))
        .nest_service("/uploads", uploads)
        .layer(middleware::from_fn(log_everything))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Logs every request header (credentials included) and stamps the demo's
/// response headers.
async fn log_everything(request: Request, next: Next) -> Response {
    tracing::info!("Incoming headers: {:?}", request.headers());
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-powered-by"),
        HeaderValue::from_static("Quill Demo"),
    );
    headers.insert(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(
        HeaderName::from_static("content-security-policy-report-only"),
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_REPORT_ONLY),
    );
    headers.insert(
        HeaderName::from_static("httponly"),
        HeaderValue::from_static("True"),
    );
    response
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    message: &'static str,
}

async fn login(Json(request): Json<LoginRequest>) -> Result<impl IntoResponse, AppError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::bad_request("Missing credentials"));
    }
    // Any password works.
    let token = issue_token(&request.email, Utc::now().timestamp());
    tracing::info!(email = %request.email, "Issued session token");

    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            format!("{SESSION_COOKIE}={token}; Path=/; SameSite=None"),
        ),
        (SET_COOKIE, format!("alt_session={token}; Path=/; http_only=True")),
    ]);
    Ok((
        cookies,
        Json(LoginResponse {
            token,
            message: "Store this in localStorage!",
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    user: Option<String>,
    cookies: Option<String>,
    note: &'static str,
}

async fn profile(headers: HeaderMap, Query(query): Query<TokenQuery>) -> Json<ProfileResponse> {
    let user = resolve_caller(&headers, query.token.as_deref());
    let cookies = headers
        .get(axum::http::header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    Json(ProfileResponse {
        user,
        cookies,
        note: "This endpoint trusts any token source.",
    })
}

async fn list_notes(State(state): State<AppState>) -> Result<Json<Vec<NoteRow>>, AppError> {
    Ok(Json(state.with_store(NoteStore::list_recent).await?))
}

#[derive(Debug, Deserialize)]
struct NoteIn {
    content: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    status: &'static str,
    owner: String,
}

async fn create_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TokenQuery>,
    Json(note): Json<NoteIn>,
) -> Result<Json<CreatedResponse>, AppError> {
    // The body email wins over the authenticated caller.
    let owner = Some(note.email)
        .filter(|email| !email.is_empty())
        .or_else(|| resolve_caller(&headers, query.token.as_deref()))
        .unwrap_or_else(|| "anonymous".to_string());
    let id = {
        let owner = owner.clone();
        state
            .with_store(move |store| store.insert(&note.content, &owner))
            .await?
    };
    tracing::info!(id, owner = %owner, "Stored note");
    Ok(Json(CreatedResponse {
        status: "ok",
        owner,
    }))
}

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    url: String,
}

/// Fetches any caller-supplied URL from the server side.
async fn proxy(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, AppError> {
    tracing::info!(url = %query.url, "Proxy fetching");
    let upstream = state
        .http
        .get(&query.url)
        .send()
        .await
        .map_err(|error| AppError::external(error.to_string()))?;
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("text/plain"));
    let body = upstream
        .text()
        .await
        .map_err(|error| AppError::external(error.to_string()))?;
    Ok(([(CONTENT_TYPE, content_type)], body).into_response())
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    url: String,
    size: usize,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::bad_request(error.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        // The client-supplied name is used as-is, directory components included.
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| AppError::bad_request("Upload is missing a file name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|error| AppError::bad_request(error.to_string()))?;

        tokio::fs::write(state.config.upload_dir.join(&file_name), &bytes).await?;
        tracing::info!(file_name = %file_name, size = bytes.len(), "Stored upload");
        return Ok(Json(UploadResponse {
            url: format!("/uploads/{file_name}"),
            size: bytes.len(),
        }));
    }
    Err(AppError::bad_request("Missing multipart field `file`"))
}
