use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config_profiles::{
    default_config_path, is_http_url, normalize_text_option, CliProfilesConfig,
};
use crate::error::CliError;

/// Values supplied to `config init`; `None` keeps what the profile already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub api_base_url: Option<String>,
    pub raw_html: Option<bool>,
    pub poll_interval_secs: Option<u64>,
    pub no_activate: bool,
}

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_base_url,
            raw_html,
            poll_interval_secs,
            no_activate,
        } => {
            let update = ProfileUpdate {
                api_base_url,
                raw_html,
                poll_interval_secs,
                no_activate,
            };
            run_config_init(
                &default_config_path(),
                profile.as_deref().or(global_profile),
                update,
            )
        }
    }
}

pub fn run_config_init(
    path: &Path,
    profile_name: Option<&str>,
    update: ProfileUpdate,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load_from_path(path).map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    apply_profile_update(&mut config, &profile_name, update)?;
    config.save_to_path(path).map_err(CliError::Config)?;

    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    if config.active_profile.as_deref() == Some(profile_name.as_str()) {
        println!(
            "Profile '{profile_name}' is active. Run `quill login --email <email> --password <password>`."
        );
    }
    Ok(())
}

pub fn apply_profile_update(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    update: ProfileUpdate,
) -> Result<(), CliError> {
    let api_base_url = normalize_text_option(update.api_base_url);
    if let Some(url) = api_base_url.as_deref() {
        if !is_http_url(url) {
            return Err(CliError::Config(
                "api_base_url must include http:// or https://".to_string(),
            ));
        }
    }
    if update.poll_interval_secs == Some(0) {
        return Err(CliError::Config(
            "poll_interval_secs must be at least 1".to_string(),
        ));
    }

    let profile = config.profile_mut_or_default(profile_name);
    if let Some(url) = api_base_url {
        profile.api_base_url = Some(url.trim_end_matches('/').to_string());
    }
    if let Some(raw_html) = update.raw_html {
        profile.raw_html = raw_html;
    }
    if let Some(secs) = update.poll_interval_secs {
        profile.poll_interval_secs = Some(secs);
    }

    if !update.no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(())
}
