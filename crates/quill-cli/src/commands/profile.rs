use crate::commands::common::ClientContext;
use crate::error::CliError;

pub async fn run_profile(context: &ClientContext) -> Result<(), CliError> {
    let dashboard = context.open_dashboard()?;
    dashboard.refresh_profile().await;

    let Some(profile) = dashboard.profile() else {
        println!(
            "Profile unavailable (backend unreachable at {})",
            context.api_base_url
        );
        return Ok(());
    };
    println!(
        "user: {}",
        profile.user.as_deref().unwrap_or("(not signed in)")
    );
    for line in profile.extra_lines() {
        println!("{line}");
    }
    Ok(())
}
