//! quill-core - Core library for Quill
//!
//! This crate contains the client side of the Quill notes stack: the session
//! store and its cookie mirror, the HTTP API client, the note renderer, the
//! polling controller, and the dashboard that composes them. The CLI and the
//! integration tests drive everything through [`Dashboard`].

pub mod api;
pub mod cache;
pub mod cookies;
pub mod dashboard;
pub mod models;
pub mod polling;
pub mod render;
pub mod session;
pub mod util;

pub use api::{ApiClient, ApiError, ApiResult, NotesApi};
pub use cache::CachedNotesApi;
pub use cookies::CookieJar;
pub use dashboard::{Dashboard, DashboardSettings, DashboardSnapshot};
pub use models::{Note, NoteDraft, Profile, Token};
pub use polling::{PollingController, PollingState, POLL_INTERVAL};
pub use render::{render, Trust};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionError, SessionStore};
