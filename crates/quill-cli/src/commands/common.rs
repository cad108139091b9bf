use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quill_core::render::RenderedNote;
use quill_core::{
    ApiClient, CachedNotesApi, CookieJar, Dashboard, DashboardSettings, FileStore, SessionStore,
};

use crate::config_profiles::{normalize_text_option, CliProfilesConfig};
use crate::error::CliError;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const STORAGE_FILE_NAME: &str = "storage.json";
pub const COOKIES_FILE_NAME: &str = "cookies.json";

pub type CliDashboard = Dashboard<CachedNotesApi<ApiClient>>;

/// Everything a command needs to open the dashboard for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub profile_name: String,
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub settings: DashboardSettings,
}

impl ClientContext {
    pub fn resolve(profile: Option<&str>, data_dir: Option<&Path>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(profile);
        Ok(Self::from_config(
            &config,
            profile_name,
            data_dir,
            env::var("QUILL_API_URL").ok(),
        ))
    }

    /// `QUILL_API_URL` wins over the profile's base URL, which wins over the default.
    pub fn from_config(
        config: &CliProfilesConfig,
        profile_name: String,
        data_dir: Option<&Path>,
        env_api_url: Option<String>,
    ) -> Self {
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();
        let api_base_url = normalize_text_option(env_api_url)
            .or_else(|| profile.api_base_url())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let data_dir = data_dir.map_or_else(|| default_data_dir(&profile_name), Path::to_path_buf);

        Self {
            profile_name,
            api_base_url,
            data_dir,
            settings: profile.dashboard_settings(),
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE_NAME)
    }

    pub fn cookies_path(&self) -> PathBuf {
        self.data_dir.join(COOKIES_FILE_NAME)
    }

    /// Restores the stored token and cookies and wires them to a cached client.
    pub fn open_dashboard(&self) -> Result<CliDashboard, CliError> {
        std::fs::create_dir_all(&self.data_dir)?;
        tracing::debug!(
            profile = %self.profile_name,
            data_dir = %self.data_dir.display(),
            "Opening dashboard"
        );

        let cookies = Arc::new(CookieJar::open(self.cookies_path())?);
        let api = CachedNotesApi::new(ApiClient::new(&self.api_base_url, cookies.clone())?);
        let session = SessionStore::open(Arc::new(FileStore::new(self.storage_path())))?;
        Ok(Dashboard::new(api, session, cookies, self.settings)?)
    }
}

pub fn default_data_dir(profile_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quill")
        .join(profile_name)
}

pub fn resolve_note_content(parts: &[String]) -> Result<String, CliError> {
    normalize_content(&parts.join(" ")).ok_or(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn format_note_lines(cards: &[RenderedNote]) -> Vec<String> {
    if cards.is_empty() {
        return vec!["No notes yet.".to_string()];
    }
    cards
        .iter()
        .map(|card| format!("#{} [{}] {}", card.id, card.owner, card.html))
        .collect()
}
