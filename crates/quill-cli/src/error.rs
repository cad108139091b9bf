use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Session(#[from] quill_core::SessionError),
    #[error(transparent)]
    Api(#[from] quill_core::ApiError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No note content provided")]
    EmptyContent,
    #[error("Login failed")]
    LoginFailed,
    #[error("Note was not saved")]
    NoteNotSaved,
    #[error("Upload failed: {0}")]
    UploadFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
