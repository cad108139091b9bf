use std::path::Path;

use crate::commands::common::ClientContext;
use crate::error::CliError;

pub async fn run_upload(context: &ClientContext, path: &Path) -> Result<(), CliError> {
    let dashboard = context.open_dashboard()?;
    let uploaded = dashboard.upload_file(path).await;
    if let Some(status) = dashboard.status() {
        println!("{status}");
    }
    if !uploaded {
        return Err(CliError::UploadFailed(path.display().to_string()));
    }
    Ok(())
}
