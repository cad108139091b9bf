use quill_core::Trust;

use crate::commands::common::ClientContext;
use crate::error::CliError;

pub fn run_status(context: &ClientContext) -> Result<(), CliError> {
    let dashboard = context.open_dashboard()?;
    for line in format_status_lines(context, &dashboard.token_snippet()) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_status_lines(context: &ClientContext, token_snippet: &str) -> Vec<String> {
    let renderer = match context.settings.trust {
        Trust::Untrusted => "escaped",
        Trust::RawHtml => "raw html",
    };
    vec![
        format!("profile: {}", context.profile_name),
        format!("api: {}", context.api_base_url),
        format!("data dir: {}", context.data_dir.display()),
        format!("token: {token_snippet}"),
        format!("renderer: {renderer}"),
        format!(
            "poll interval: {}s",
            context.settings.poll_interval.as_secs()
        ),
    ]
}
