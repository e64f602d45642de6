//! coadmin-cli - submit issues from the command line
//!
//! ```text
//! coadmin-cli issue submit --app billing --description "disk full" --level error
//! coadmin-cli issue submit --app billing --description "disk full" --level error \
//!     --live --server https://issues.example.com/api --wait 5s
//! ```
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/coadmin/config.toml (~/.config/coadmin/config.toml)
//! - Logs: $XDG_STATE_HOME/coadmin/coadmin.log.<date> (~/.local/state/coadmin/), with --debug

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use coadmin_core::config::is_valid_server_url;
use coadmin_core::{Config, Fields, Level, Reporter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Longest `--wait` accepted
const MAX_WAIT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "coadmin-cli")]
#[command(about = "Coadmin CLI tool")]
#[command(version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/coadmin/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle issues
    #[command(subcommand)]
    Issue(IssueCommand),
}

#[derive(Subcommand)]
enum IssueCommand {
    /// Submit a new issue
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Application name (min 3 characters)
    #[arg(long)]
    app: String,

    /// Issue description (min 3 characters)
    #[arg(long)]
    description: String,

    /// Issue level (warning|error|info|debug|fatal)
    #[arg(long)]
    level: String,

    /// Enable live mode
    #[arg(long)]
    live: bool,

    /// Server URL (required if live mode is enabled)
    #[arg(long)]
    server: Option<String>,

    /// Folder for issue files (file mode; default from config)
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Wait for the issue to be submitted (max 10 seconds)
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    wait: Duration,

    /// Extra context as key=value (value parsed as JSON when possible)
    #[arg(long = "extra", value_parser = parse_key_value)]
    extra: Vec<(String, serde_json::Value)>,

    /// Enable debug mode
    #[arg(long)]
    debug: bool,
}

/// Parse `10s`, `500ms`, `1m` or a bare number of seconds.
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    let (number, unit) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => s.split_at(idx),
        None => (s, "s"),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{}'", s))?;
    let secs = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        _ => return Err(format!("invalid duration unit in '{}' (use ms, s or m)", s)),
    };
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{}': {}", s, e))
}

fn parse_key_value(s: &str) -> std::result::Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Check all arguments, returning every problem found.
fn validate(args: &SubmitArgs) -> std::result::Result<Level, Vec<String>> {
    let mut errors = Vec::new();

    if args.app.chars().count() < 3 {
        errors.push("--app must be at least 3 characters".to_string());
    }

    if args.description.chars().count() < 3 {
        errors.push("--description must be at least 3 characters".to_string());
    }

    let level = args.level.parse::<Level>().ok();
    if level.is_none() {
        let names: Vec<&str> = Level::ALL.iter().map(Level::as_str).collect();
        errors.push(format!("--level must be one of: {}", names.join(", ")));
    }

    if args.live {
        match args.server.as_deref() {
            None | Some("") => errors.push("--server is required in live mode".to_string()),
            Some(server) if !is_valid_server_url(server) => {
                errors.push("--server must be a valid URL".to_string())
            }
            Some(_) => {}
        }
    }

    if args.wait > MAX_WAIT {
        errors.push(format!("--wait must not exceed {}s", MAX_WAIT.as_secs()));
    }

    match level {
        Some(level) if errors.is_empty() => Ok(level),
        _ => Err(errors),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };

    match cli.command {
        Command::Issue(IssueCommand::Submit(args)) => cmd_submit(config, args),
    }
}

fn cmd_submit(config: Config, args: SubmitArgs) -> Result<ExitCode> {
    let level = match validate(&args) {
        Ok(level) => level,
        Err(errors) => {
            println!("Error: Invalid arguments");
            for msg in errors {
                println!("- {}", msg);
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    // Initialize logging if debug
    let _log_guard = if args.debug {
        let guard = coadmin_core::logging::init(&config.logging, true)
            .context("failed to initialize logging")?;
        println!("Debug log: {}", guard.log_dir().display());
        Some(guard)
    } else {
        None
    };

    println!("Submitting issue with parameters:");
    println!("App: {}", args.app);
    println!("Description: {}", args.description);
    println!("Level: {}", level);

    let mut reporter_config = config.reporter;
    reporter_config.live |= args.live;
    reporter_config.verbose |= args.debug;
    if let Some(server) = args.server {
        reporter_config.server = server;
    }
    if let Some(folder) = args.folder {
        reporter_config.folder = folder;
    }
    if reporter_config.live {
        println!("Live mode enabled");
        println!("Server: {}", reporter_config.server);
    }

    let reporter =
        Reporter::new(&args.app, reporter_config).context("failed to create reporter")?;
    reporter.start().context("failed to start delivery worker")?;

    let extra: Fields = args.extra.into_iter().collect();
    let submitted = match reporter.add(&args.description, level, extra, Fields::new()) {
        Ok(submission) if reporter.config().live => {
            tracing::debug!(
                ?submission,
                wait = ?args.wait,
                "Waiting for the delivery worker to flush"
            );
            submission.is_accepted() && reporter.wait_until_empty(args.wait)
        }
        Ok(submission) => submission.is_accepted(),
        Err(e) => {
            tracing::warn!(error = %e, "Issue submission failed");
            println!("Error: {}", e);
            false
        }
    };

    if submitted {
        println!("Issue submitted successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Issue submission failed");
        Ok(ExitCode::FAILURE)
    }
}
