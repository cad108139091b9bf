//! Quill CLI - drive the notes dashboard from a terminal
//!
//! Every command opens the same dashboard the page would: a persisted token,
//! a persisted cookie jar, and the cached API client for the active profile.

use clap::{CommandFactory, Parser};

mod cli;
mod commands;
mod config_profiles;
mod error;

use cli::{Cli, Commands};
use commands::common::ClientContext;
use commands::completions::run_completions;
use commands::config::run_config;
use commands::cookies::run_cookies;
use commands::login::run_login;
use commands::notes::{run_add, run_notes, run_preview};
use commands::poll::run_poll;
use commands::profile::run_profile;
use commands::status::run_status;
use commands::upload::run_upload;
use error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_directive("quill=info")?)
                .add_directive(log_directive("quill_core=warn")?),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();
    let data_dir = cli.data_dir.as_deref();
    let context = || ClientContext::resolve(profile, data_dir);

    match cli.command {
        Some(Commands::Login { email, password }) => {
            run_login(&context()?, &email, &password).await?;
        }
        Some(Commands::Profile) => {
            run_profile(&context()?).await?;
        }
        Some(Commands::Notes { legacy, json }) => {
            run_notes(&context()?, legacy, json).await?;
        }
        Some(Commands::Add { content }) => {
            run_add(&context()?, &content).await?;
        }
        Some(Commands::Preview { content }) => {
            run_preview(&context()?, &content)?;
        }
        Some(Commands::Upload { path }) => {
            run_upload(&context()?, &path).await?;
        }
        Some(Commands::Poll { ticks, json }) => {
            run_poll(&context()?, ticks, json).await?;
        }
        Some(Commands::Cookies { set_debug }) => {
            run_cookies(&context()?, set_debug.as_deref())?;
        }
        Some(Commands::Status) => {
            run_status(&context()?)?;
        }
        Some(Commands::Config { command }) => run_config(command, profile)?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

fn log_directive(raw: &str) -> Result<tracing_subscriber::filter::Directive, CliError> {
    raw.parse()
        .map_err(|error| CliError::Config(format!("Invalid log directive {raw}: {error}")))
}
