pub mod common;
pub mod completions;
pub mod config;
pub mod cookies;
pub mod login;
pub mod notes;
pub mod poll;
pub mod profile;
pub mod status;
pub mod upload;
