use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Drive the Quill notes dashboard from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// CLI profile name (selects API base URL and local data directory)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Directory holding the stored token and cookie jar
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the returned token
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show the profile the backend resolves for the stored token
    Profile,
    /// List notes
    #[command(alias = "list")]
    Notes {
        /// Use the legacy HTML list renderer
        #[arg(long)]
        legacy: bool,
        /// Output raw notes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Post a new note
    #[command(alias = "new")]
    Add {
        /// Note content
        content: Vec<String>,
    },
    /// Render note content locally without posting it
    Preview {
        /// Note content
        content: Vec<String>,
    },
    /// Upload a file
    Upload {
        /// File to upload
        path: PathBuf,
    },
    /// Poll the notes list on the profile interval
    Poll {
        /// Number of polling ticks to observe before stopping
        #[arg(long, default_value = "3")]
        ticks: u32,
        /// Print a JSON dashboard snapshot per tick
        #[arg(long)]
        json: bool,
    },
    /// Inspect the cookie jar
    Cookies {
        /// Set the `debug` cookie before listing
        #[arg(long, value_name = "VALUE")]
        set_debug: Option<String>,
    },
    /// Show local session state without contacting the backend
    Status,
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Notes API base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Render note content as raw HTML instead of escaping it
        #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
        raw_html: Option<bool>,
        /// Polling interval in seconds
        #[arg(long, value_name = "SECONDS")]
        poll_interval_secs: Option<u64>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}
