//! CLI argument definitions.

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// screengrab - Save screenshots to your Dropbox Public folder and share the link.
#[derive(Parser, Debug)]
#[command(name = "screengrab", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// JSON output for scripts (logs also become JSON lines on stderr)
    #[arg(
        long,
        global = true,
        env = "SCREENGRAB_JSON",
        value_parser = FalseyValueParser::new()
    )]
    pub json: bool,

    /// Verbose output (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR", value_parser = FalseyValueParser::new())]
    pub no_color: bool,

    /// Settings database (default: <config dir>/screengrab/settings.db)
    #[arg(long, global = true, env = "SCREENGRAB_CONFIG_DB", value_name = "PATH")]
    pub config_db: Option<PathBuf>,

    /// Dropbox folder, skipping discovery from the Dropbox client database
    #[arg(long, global = true, env = "SCREENGRAB_SYNC_FOLDER", value_name = "PATH")]
    pub sync_folder: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Capture ===
    /// Take a screenshot and save it to the Public folder
    Grab(GrabArgs),

    /// Take screenshots repeatedly using the auto-grab settings
    Auto(AutoArgs),

    // === Configuration ===
    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show the resolved Dropbox and Public folders
    SyncFolder,

    // === Utilities ===
    /// Check for a newer release
    CheckUpdate,

    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct GrabArgs {
    /// Capture only the active window instead of the full screen
    #[arg(long, short = 'w')]
    pub window: bool,

    /// Skip copying the public URL even if enabled in settings
    #[arg(long)]
    pub no_copy: bool,
}

#[derive(Parser, Debug)]
pub struct AutoArgs {
    /// Stop after this many screenshots (default: run until interrupted)
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print every setting
    Show,

    /// Change one setting
    Set {
        /// Setting name (see `config show`)
        key: String,
        /// New value
        value: String,
    },

    /// Restore every setting to its default
    Reset,

    /// Print the settings database path
    Path,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
