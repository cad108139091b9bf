//! quill-api - Demo notes backend
//!
//! Serves the login, profile, notes and upload endpoints the Quill client
//! consumes. Its loose token handling, open CORS, header logging and cookie
//! flags are review material and are kept on purpose.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use config::AppConfig;
pub use error::AppError;
pub use routes::{app_router, AppState};
