//! Runtime settings loaded from environment variables.
//!
//! | Env Var               | Default                              |
//! |-----------------------|--------------------------------------|
//! | `DATABASE_LOCATION`   | none (the CLI may pass `--database`) |
//! | `GOTIFY_URL`          | none                                 |
//! | `GOTIFY_APP_TOKEN`    | none                                 |
//! | `GOTIFY_TIMEOUT_SECS` | `10`                                 |
//!
//! Empty values count as unset. The database location and the Gotify
//! settings load separately, so a malformed Gotify variable only affects
//! commands that talk to Gotify.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::NudgeError;

pub const ENV_DATABASE_LOCATION: &str = "DATABASE_LOCATION";
pub const ENV_GOTIFY_URL: &str = "GOTIFY_URL";
pub const ENV_GOTIFY_APP_TOKEN: &str = "GOTIFY_APP_TOKEN";
pub const ENV_GOTIFY_TIMEOUT_SECS: &str = "GOTIFY_TIMEOUT_SECS";

/// Default HTTP timeout for one Gotify request.
pub const DEFAULT_GOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Gotify endpoint and credential. Either may be missing until a
/// notifying cycle actually needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotifySettings {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for GotifySettings {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout: DEFAULT_GOTIFY_TIMEOUT,
        }
    }
}

impl GotifySettings {
    pub fn from_env() -> Result<Self, NudgeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup` (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NudgeError> {
        let timeout = match non_empty(lookup(ENV_GOTIFY_TIMEOUT_SECS)) {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                NudgeError::Config(format!(
                    "{ENV_GOTIFY_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            None => DEFAULT_GOTIFY_TIMEOUT,
        };

        Ok(Self {
            url: non_empty(lookup(ENV_GOTIFY_URL)),
            token: non_empty(lookup(ENV_GOTIFY_APP_TOKEN)),
            timeout,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub database: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database: non_empty(lookup(ENV_DATABASE_LOCATION)).map(PathBuf::from),
        }
    }

    /// Database path: `explicit` wins over `DATABASE_LOCATION`; `~` is expanded.
    pub fn database_path(&self, explicit: Option<&Path>) -> Result<PathBuf, NudgeError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.database.clone())
            .ok_or_else(|| {
                NudgeError::Config(format!(
                    "no database location: pass --database or set {ENV_DATABASE_LOCATION}"
                ))
            })?;
        Ok(expand_home(&path))
    }
}

/// Expand a leading `~` against the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
