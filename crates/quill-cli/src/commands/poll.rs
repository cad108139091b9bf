use std::time::Duration;

use quill_core::PollingState;
use tokio::time::{interval_at, Instant};

use crate::commands::common::{CliDashboard, ClientContext};
use crate::error::CliError;

/// Lets an in-flight tick land before the listing is read.
const TICK_SETTLE: Duration = Duration::from_millis(250);

pub async fn run_poll(context: &ClientContext, ticks: u32, as_json: bool) -> Result<(), CliError> {
    let mut dashboard = context.open_dashboard()?;
    dashboard.start().await;
    if !as_json {
        println!("token: {}", dashboard.token_snippet());
        println!("notes: {}", dashboard.notes().len());
    }

    let period = context.settings.poll_interval;
    let mut observer = interval_at(Instant::now() + period + TICK_SETTLE, period);
    if dashboard.toggle_polling() == PollingState::Polling && !as_json {
        println!("Polling every {}s", period.as_secs());
    }

    for tick in 1..=ticks {
        observer.tick().await;
        if as_json {
            println!("{}", snapshot_line(&dashboard)?);
        } else {
            println!("{}", tick_line(tick, &dashboard));
        }
    }

    dashboard.toggle_polling();
    if !as_json {
        println!("Polling stopped");
    }
    Ok(())
}

pub fn tick_line(tick: u32, dashboard: &CliDashboard) -> String {
    let notes = dashboard.notes();
    let newest = notes
        .first()
        .map_or_else(|| "-".to_string(), |note| format!("#{}", note.id));
    format!("tick {tick}: {} notes (newest {newest})", notes.len())
}

/// One compact JSON object per line.
pub fn snapshot_line(dashboard: &CliDashboard) -> Result<String, CliError> {
    Ok(serde_json::to_string(&dashboard.snapshot())?)
}
