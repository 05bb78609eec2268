use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nudge_core::config::{GotifySettings, Settings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;

use commands::insert::InsertArgs;
use commands::run::RunArgs;
use commands::systemd::{InstallArgs, UninstallArgs};

/// Recurring reminders, announced once per run through Gotify.
#[derive(Debug, Parser)]
#[command(name = "nudge", version)]
struct Cli {
    /// Show debug information
    #[arg(long, global = true)]
    debug: bool,

    /// SQLite database file (overrides DATABASE_LOCATION)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert a new reminder
    Insert(InsertArgs),

    /// Show all reminders
    Show,

    /// Run one cycle: advance today's reminders and send the digest
    Run(RunArgs),

    /// Install and enable the systemd user timer
    Install(InstallArgs),

    /// Disable the timer and remove the systemd unit files
    Uninstall(UninstallArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    // flushes the log file on drop
    let _log_guard = init_tracing(cli.debug);

    match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log file name prefix under the user cache directory.
const LOG_FILE_PREFIX: &str = "nudge";

/// Log files kept in total: the current one and three older ones.
const LOG_FILES_KEPT: usize = 4;

/// Console output on stderr plus a daily-rotated file under the cache dir,
/// where unattended timer runs leave their errors.
fn init_tracing(debug: bool) -> Option<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let appender = dirs::cache_dir().map(|dir| log_appender(&dir));
    let (file_layer, guard) = match appender {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if guard.is_none() {
        tracing::warn!("log file unavailable; logging to stderr only");
    }
    tracing::debug!("debug mode enabled");
    guard
}

fn log_appender(dir: &Path) -> Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(LOG_FILES_KEPT)
        .build(dir)?)
}

async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::from_env();
    let database = cli.database.as_deref();

    // Gotify variables are only parsed by the commands that use them
    match cli.command {
        Command::Insert(args) => commands::insert::run(&settings, database, args),
        Command::Show => commands::show::run(&settings, database),
        Command::Run(args) => {
            let gotify = if args.silent {
                GotifySettings::default()
            } else {
                GotifySettings::from_env()?
            };
            commands::run::run(&settings, database, &gotify, args).await
        }
        Command::Install(args) => {
            commands::systemd::install(&settings, database, &GotifySettings::from_env()?, args)
        }
        Command::Uninstall(args) => commands::systemd::uninstall(args),
    }
}
