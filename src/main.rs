//! screengrab - Save screenshots to a Dropbox Public folder and share the link.
//!
//! Provides both human-friendly and script-friendly (`--json`) output.
#![forbid(unsafe_code)]

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::Parser;
use console::style;
use serde::Serialize;
use tracing::debug;

use screengrab::capture::XcapSource;
use screengrab::cli::{self, Cli, Commands, ConfigCommand};
use screengrab::config::{self, ConfigStore, SqliteBackend};
use screengrab::error::{GrabError, Result};
use screengrab::logging;
use screengrab::pipeline::{self, GrabRequest, PublishedFile};
use screengrab::publish::{CLIPBOARD_HOLD, ClipboardPublisher, HttpShortener, SystemClipboard};
use screengrab::settings::{SAVE_DIRECTORY_KEY, Settings};
use screengrab::sync_folder::{self, SyncFolderLocator};
use screengrab::update::UpdateChecker;

/// Build information embedded at compile time.
mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

fn main() {
    let cli = Cli::parse();

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    logging::init_logging(cli.json, cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::Grab(args)) => cmd_grab(cli, args),
        Some(Commands::Auto(args)) => cmd_auto(cli, args),
        Some(Commands::Config(command)) => cmd_config(cli, command),
        Some(Commands::SyncFolder) => cmd_sync_folder(cli),
        Some(Commands::CheckUpdate) => cmd_check_update(cli),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(cli, args),
    }
}

// === Quick Start ===

#[derive(Serialize)]
struct QuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    commands: QuickStartCommands,
    environment: QuickStartEnvironment,
}

#[derive(Serialize)]
struct QuickStartCommands {
    grab_screen: &'static str,
    grab_window: &'static str,
    auto_grab: &'static str,
    show_settings: &'static str,
    change_setting: &'static str,
    sync_folder: &'static str,
    check_update: &'static str,
}

#[derive(Serialize)]
struct QuickStartEnvironment {
    config_db: &'static str,
    sync_folder: &'static str,
    log_filter: &'static str,
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.json {
        output_json(&QuickStart {
            tool: "screengrab",
            version: build_info::VERSION,
            description: "Save screenshots to a Dropbox Public folder and copy the public link",
            commands: QuickStartCommands {
                grab_screen: "screengrab grab",
                grab_window: "screengrab grab --window",
                auto_grab: "screengrab auto [--count N]",
                show_settings: "screengrab config show",
                change_setting: "screengrab config set <KEY> <VALUE>",
                sync_folder: "screengrab sync-folder",
                check_update: "screengrab check-update",
            },
            environment: QuickStartEnvironment {
                config_db: "SCREENGRAB_CONFIG_DB",
                sync_folder: "SCREENGRAB_SYNC_FOLDER",
                log_filter: "RUST_LOG",
            },
        });
        return Ok(());
    }

    println!(
        "{} {} - Dropbox screen grabber\n",
        style("screengrab").bold().cyan(),
        build_info::VERSION
    );

    println!("{}", style("QUICK START").bold().underlined());
    println!();
    println!("  {}  Capture the full screen", style("screengrab grab").green());
    println!("  {}  Capture the active window", style("screengrab grab --window").green());
    println!("  {}  Capture on a timer", style("screengrab auto").green());
    println!("  {}  Show settings", style("screengrab config show").green());
    println!(
        "  {}  Set your Dropbox user id",
        style("screengrab config set user_id 12345").green()
    );
    println!("  {}  Show the Public folder", style("screengrab sync-folder").green());
    println!();

    println!("Run {} for full help", style("screengrab --help").yellow());
    Ok(())
}

// === Shared setup ===

fn open_store(cli: &Cli) -> Result<ConfigStore<SqliteBackend>> {
    let backend = match &cli.config_db {
        Some(path) => SqliteBackend::open(path, config::NAMESPACE)?,
        None => SqliteBackend::open_default(config::NAMESPACE)?,
    };
    Ok(ConfigStore::new(backend))
}

fn config_db_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config_db {
        Some(path) => Ok(path.clone()),
        None => config::default_db_path(),
    }
}

fn sync_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.sync_folder {
        if !path.is_dir() {
            return Err(GrabError::SyncFolderNotFound {
                searched: vec![path.display().to_string()],
            });
        }
        return Ok(path.clone());
    }
    let locator = SyncFolderLocator::from_environment();
    sync_folder::resolve_cached(&locator).map(Path::to_path_buf)
}

// === Capture ===

fn cmd_grab(cli: &Cli, args: &cli::GrabArgs) -> Result<()> {
    let store = open_store(cli)?;
    let settings = store.load()?;
    let root = sync_root(cli)?;
    let clipboard = SystemClipboard::holding(CLIPBOARD_HOLD);
    let mut publisher = ClipboardPublisher::new(clipboard, HttpShortener::new()?);

    let request = GrabRequest {
        full_screen: !args.window,
        copy_url: !args.no_copy,
    };
    let file = pipeline::grab(&XcapSource, &mut publisher, &settings, &root, request)?;

    print_published(cli, &file);
    Ok(())
}

fn cmd_auto(cli: &Cli, args: &cli::AutoArgs) -> Result<()> {
    let store = open_store(cli)?;
    let settings = store.load()?;
    let root = sync_root(cli)?;
    let interval = settings.auto_grab_interval;
    // The hold runs inside the loop, so it never outlasts one interval.
    let clipboard = SystemClipboard::holding(interval.as_duration().min(CLIPBOARD_HOLD));
    let mut publisher = ClipboardPublisher::new(clipboard, HttpShortener::new()?);

    let request = GrabRequest::for_auto_grab(settings.auto_grab_type);
    if !settings.auto_grab {
        debug!("auto_grab is off in settings, running on request");
    }
    if !cli.quiet && !cli.json {
        println!(
            "Grabbing {} every {} (Ctrl+C to stop)...",
            settings.auto_grab_type.label().to_lowercase(),
            interval
        );
    }

    let summary = pipeline::run_auto_grab(
        interval.as_duration(),
        args.count,
        std::thread::sleep,
        |_| {
            let file = pipeline::grab(&XcapSource, &mut publisher, &settings, &root, request)?;
            print_published(cli, &file);
            Ok(file)
        },
    );

    if cli.json {
        output_json(&summary);
    } else if !cli.quiet {
        println!(
            "Auto-grab finished: {} saved, {} failed",
            style(summary.succeeded).green(),
            style(summary.failed).red()
        );
    }
    Ok(())
}

fn print_published(cli: &Cli, file: &PublishedFile) {
    if cli.json {
        output_json(file);
        return;
    }
    if cli.quiet {
        return;
    }
    println!("{} {}", style("Saved").green().bold(), file.save_path.display());
    if let Some(url) = &file.public_url {
        println!("{} {}", style("Copied").cyan().bold(), url);
    }
}

// === Configuration ===

fn cmd_config(cli: &Cli, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => config_show(cli),
        ConfigCommand::Set { key, value } => config_set(cli, key, value),
        ConfigCommand::Reset => config_reset(cli),
        ConfigCommand::Path => config_path(cli),
    }
}

fn config_show(cli: &Cli) -> Result<()> {
    let settings = open_store(cli)?.load()?;
    let entries = settings.to_entries();

    if cli.json {
        output_json(&entries_json(entries));
    } else {
        let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in entries {
            println!("{:width$}  {}", style(key).bold(), value);
        }
    }
    Ok(())
}

fn config_set(cli: &Cli, key: &str, value: &str) -> Result<()> {
    let mut store = open_store(cli)?;
    let mut settings = store.load()?;
    settings.set(key, value)?;

    let public_root = match sync_root(cli) {
        Ok(root) => sync_folder::public_folder(&root),
        Err(e) if key != SAVE_DIRECTORY_KEY => {
            debug!(error = %e, "Dropbox folder unknown, saving without it");
            PathBuf::new()
        }
        Err(e) => return Err(e),
    };
    store.save(&settings, &public_root)?;

    let stored = store.load()?.get(key)?;
    if cli.json {
        output_json(&serde_json::json!({
            "key": key,
            "value": stored,
            "ok": true,
        }));
    } else if !cli.quiet {
        println!("{key} = {stored}");
    }
    Ok(())
}

fn config_reset(cli: &Cli) -> Result<()> {
    let mut store = open_store(cli)?;
    store.reset(Path::new(""))?;

    if cli.json {
        output_json(&entries_json(Settings::default().to_entries()));
    } else if !cli.quiet {
        println!("Settings restored to defaults");
    }
    Ok(())
}

fn entries_json(entries: Vec<(&str, String)>) -> serde_json::Map<String, serde_json::Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
        .collect()
}

fn config_path(cli: &Cli) -> Result<()> {
    let path = config_db_path(cli)?;
    if cli.json {
        output_json(&serde_json::json!({
            "path": path,
            "exists": path.exists(),
        }));
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_sync_folder(cli: &Cli) -> Result<()> {
    let root = sync_root(cli)?;
    let public = sync_folder::public_folder(&root);

    if cli.json {
        output_json(&serde_json::json!({
            "sync_folder": root,
            "public_folder": public,
            "public_exists": public.is_dir(),
        }));
    } else {
        println!("Dropbox: {}", root.display());
        println!("Public:  {}", public.display());
        if !public.is_dir() && !cli.quiet {
            println!(
                "{}: the Public folder does not exist yet",
                style("Warning").yellow()
            );
        }
    }
    Ok(())
}

// === Utilities ===

fn cmd_check_update(cli: &Cli) -> Result<()> {
    let latest = UpdateChecker::new()?.check_latest()?;
    let update_available = latest.is_newer_than(build_info::VERSION);

    if cli.json {
        output_json(&serde_json::json!({
            "current": build_info::VERSION,
            "latest": latest,
            "update_available": update_available,
        }));
        return Ok(());
    }

    let version = latest.version.as_deref().unwrap_or("unknown");
    if update_available {
        println!(
            "{} {} (you have {})",
            style("Update available:").green().bold(),
            version,
            build_info::VERSION
        );
        if let Some(date) = &latest.release_date {
            println!("Released: {date}");
        }
        if let Some(url) = &latest.download_url {
            println!("Download: {url}");
        }
    } else if !cli.quiet {
        println!("screengrab {} is up to date (latest: {version})", build_info::VERSION);
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(cli: &Cli) -> Result<()> {
    if cli.json {
        output_json(&serde_json::json!({
            "version": build_info::VERSION,
            "git_sha": build_info::git_sha(),
            "git_dirty": build_info::git_dirty() == "true",
            "build_timestamp": build_info::build_timestamp(),
            "rustc_version": build_info::rustc_semver(),
            "target": build_info::target(),
        }));
    } else {
        println!("screengrab {}", build_info::VERSION);
        println!(
            "git: {}{}",
            build_info::git_sha(),
            if build_info::git_dirty() == "true" {
                " (dirty)"
            } else {
                ""
            }
        );
        println!("built: {}", build_info::build_timestamp());
        println!("rustc: {}", build_info::rustc_semver());
        println!("target: {}", build_info::target());
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(_cli: &Cli, args: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    clap_complete::generate(args.shell, &mut Cli::command(), "screengrab", &mut io::stdout());
    Ok(())
}

// === Output ===

fn output_json<T: Serialize + ?Sized>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

fn output_error(cli: &Cli, error: &GrabError) {
    if cli.json {
        let json = serde_json::json!({
            "error": true,
            "message": error.to_string(),
            "suggestion": error.suggestion(),
            "recoverable": error.is_user_recoverable(),
        });
        eprintln!("{json}");
    } else {
        eprintln!("{}: {}", style("Error").red().bold(), error);
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{}: {}", style("Hint").yellow(), suggestion);
        }
    }
}
