use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use nudge_core::app::{CycleCoordinatorBuilder, CycleOptions, CycleReport, DispatchOutcome};
use nudge_core::config::{GotifySettings, Settings};
use nudge_core::impls::GotifyNotifier;

use super::open_store;

/// State committed, notification lost.
const EXIT_NOTIFY_FAILED: u8 = 2;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Do not send external notifications
    #[arg(long)]
    pub silent: bool,

    /// Evaluation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// `gotify` is only read when the run is not silent.
pub async fn run(
    settings: &Settings,
    database: Option<&Path>,
    gotify: &GotifySettings,
    args: RunArgs,
) -> Result<ExitCode> {
    // fail on missing credentials before any state is touched
    let notifier = if args.silent {
        None
    } else {
        Some(GotifyNotifier::from_settings(gotify)?)
    };

    let store = open_store(settings, database)?;
    let mut builder = CycleCoordinatorBuilder::new(Arc::new(store)).options(CycleOptions {
        silent: args.silent,
    });
    if let Some(notifier) = notifier {
        builder = builder.notifier(Arc::new(notifier));
    }

    let report = builder.build()?.run(args.date).await?;
    Ok(ExitCode::from(exit_status(&report)))
}

fn exit_status(report: &CycleReport) -> u8 {
    match &report.dispatch {
        DispatchOutcome::Failed(_) => EXIT_NOTIFY_FAILED,
        _ => 0,
    }
}
