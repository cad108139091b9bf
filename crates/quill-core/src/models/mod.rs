//! Data models for Quill

mod note;
mod profile;
mod token;

pub use note::{CreatedNote, Note, NoteDraft};
pub use profile::Profile;
pub use token::Token;
