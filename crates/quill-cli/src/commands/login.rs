use crate::commands::common::ClientContext;
use crate::error::CliError;

pub async fn run_login(
    context: &ClientContext,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let dashboard = context.open_dashboard()?;
    dashboard.set_email(email);
    dashboard.set_password(password);

    let logged_in = dashboard.submit_login().await;
    if let Some(status) = dashboard.status() {
        println!("{status}");
    }
    if !logged_in {
        return Err(CliError::LoginFailed);
    }

    println!("Token: {}", dashboard.token_snippet());
    if let Some(user) = dashboard.profile().and_then(|profile| profile.user) {
        println!("Signed in profile '{}' as {user}", context.profile_name);
    }
    Ok(())
}
