use quill_core::render;

use crate::commands::common::{format_note_lines, resolve_note_content, ClientContext};
use crate::error::CliError;

pub async fn run_notes(
    context: &ClientContext,
    legacy: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let dashboard = context.open_dashboard()?;
    dashboard.refresh_notes().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&dashboard.notes())?);
    } else if legacy {
        println!("{}", dashboard.legacy_notes_html());
    } else {
        for line in format_note_lines(&dashboard.note_cards()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_add(context: &ClientContext, content_parts: &[String]) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    let dashboard = context.open_dashboard()?;
    dashboard.set_draft(content);
    dashboard.submit_note().await;

    // Only a successful post sets a status.
    let status = dashboard.status().ok_or(CliError::NoteNotSaved)?;
    println!("{status}");
    Ok(())
}

/// Renders locally with the profile's trust setting; nothing is sent.
pub fn run_preview(context: &ClientContext, content_parts: &[String]) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    println!("{}", render(&content, context.settings.trust));
    Ok(())
}
