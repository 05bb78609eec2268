pub mod insert;
pub mod run;
pub mod show;
pub mod systemd;

use std::path::Path;

use anyhow::{Context, Result};
use nudge_core::config::Settings;
use nudge_core::impls::SqliteReminderStore;

/// Open (creating if needed) the database named by `--database` or the environment.
pub(crate) fn open_store(settings: &Settings, database: Option<&Path>) -> Result<SqliteReminderStore> {
    let path = settings.database_path(database)?;
    tracing::debug!(path = %path.display(), "opening database");
    SqliteReminderStore::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))
}
