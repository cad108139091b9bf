use crate::commands::common::ClientContext;
use crate::error::CliError;

pub fn run_cookies(context: &ClientContext, set_debug: Option<&str>) -> Result<(), CliError> {
    let dashboard = context.open_dashboard()?;
    if let Some(value) = set_debug {
        dashboard.set_debug_cookie(value)?;
    }

    let listing = dashboard.cookie_listing();
    if listing.is_empty() {
        println!("No cookies.");
    }
    for line in listing {
        println!("{line}");
    }
    Ok(())
}
