//! systemd user timer that runs `nudge run` on a fixed schedule.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

use anyhow::{Context, Result, bail};
use clap::Args;
use nudge_core::config::{ENV_GOTIFY_APP_TOKEN, ENV_GOTIFY_URL, GotifySettings, Settings};

const SERVICE_NAME: &str = "nudge.service";
const TIMER_NAME: &str = "nudge.timer";

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Gotify server URL (defaults to GOTIFY_URL)
    #[arg(long)]
    pub gotify_url: Option<String>,

    /// Gotify application token (defaults to GOTIFY_APP_TOKEN)
    #[arg(long)]
    pub gotify_token: Option<String>,
}

#[derive(Debug, Args)]
pub struct UninstallArgs {
    /// Confirm removal of the unit files
    #[arg(long)]
    pub yes: bool,
}

pub fn install(
    settings: &Settings,
    database: Option<&Path>,
    gotify: &GotifySettings,
    args: InstallArgs,
) -> Result<ExitCode> {
    let database = absolute(&settings.database_path(database)?)?;
    let gotify_url = args
        .gotify_url
        .or_else(|| gotify.url.clone())
        .with_context(|| format!("pass --gotify-url or set {ENV_GOTIFY_URL}"))?;
    let gotify_token = args
        .gotify_token
        .or_else(|| gotify.token.clone())
        .with_context(|| format!("pass --gotify-token or set {ENV_GOTIFY_APP_TOKEN}"))?;
    let exe = std::env::current_exe().context("cannot locate the nudge executable")?;

    tracing::warn!("the Gotify URL and token are stored in plain text in the service unit");

    let unit_dir = user_unit_dir()?;
    let service = render_service(&exe, &database, &gotify_url, &gotify_token);
    let written = write_units(&unit_dir, &service, &render_timer())?;
    for path in &written {
        tracing::info!(path = %path.display(), "unit file written");
    }

    systemctl(&["enable", "--now", TIMER_NAME]).context("failed to enable the nudge timer")?;
    check_linger();
    Ok(ExitCode::SUCCESS)
}

pub fn uninstall(args: UninstallArgs) -> Result<ExitCode> {
    if !args.yes {
        bail!("refusing to remove the systemd units without --yes");
    }
    systemctl(&["disable", "--now", TIMER_NAME]).context("failed to disable the nudge timer")?;
    remove_units(&user_unit_dir()?)?;
    tracing::info!("systemd units removed");
    Ok(ExitCode::SUCCESS)
}

fn user_unit_dir() -> Result<PathBuf> {
    let config = dirs::config_dir().context("cannot determine the user configuration directory")?;
    Ok(config.join("systemd").join("user"))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn render_service(exe: &Path, database: &Path, gotify_url: &str, gotify_token: &str) -> String {
    format!(
        "[Unit]
Description=Run nudge
Wants=network-online.target
After=network-online.target

[Service]
ExecStart={exe} --database {database} run
Environment={ENV_GOTIFY_URL}={gotify_url}
Environment={ENV_GOTIFY_APP_TOKEN}={gotify_token}
Type=oneshot

[Install]
WantedBy=default.target
",
        exe = exe.display(),
        database = database.display(),
    )
}

fn render_timer() -> String {
    "[Unit]
Description=Run nudge daily

[Timer]
OnCalendar=Mon..Fri 08:30
OnCalendar=Sat,Sun 11:00
Persistent=true

[Install]
WantedBy=timers.target
"
    .to_string()
}

/// Write both units into `dir`, leaving existing files alone. Returns the
/// files actually written.
fn write_units(dir: &Path, service: &str, timer: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for (name, contents) in [(SERVICE_NAME, service), (TIMER_NAME, timer)] {
        let path = dir.join(name);
        if path.exists() {
            tracing::info!(path = %path.display(), "unit file exists, keeping it");
            continue;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn remove_units(dir: &Path) -> Result<()> {
    for name in [SERVICE_NAME, TIMER_NAME] {
        let path = dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("failed to remove {}", path.display()));
            }
        }
    }
    Ok(())
}

fn systemctl(args: &[&str]) -> Result<()> {
    let status = Command::new("systemctl")
        .arg("--user")
        .args(args)
        .stdout(Stdio::null())
        .status()
        .context("failed to run systemctl")?;
    if !status.success() {
        bail!("systemctl --user {} exited with {status}", args.join(" "));
    }
    Ok(())
}

/// Without lingering, user timers only fire while the user is logged in.
fn check_linger() {
    let user = std::env::var("USER").unwrap_or_default();
    let output = Command::new("loginctl")
        .args(["show-user", &user, "--property=Linger"])
        .output();

    let lingering = matches!(
        &output,
        Ok(out) if out.status.success() && String::from_utf8_lossy(&out.stdout).contains("Linger=yes")
    );
    if !lingering {
        tracing::warn!("lingering is not enabled for this user; run as root: loginctl enable-linger $USER");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_runs_nudge_against_the_database() {
        let unit = render_service(
            Path::new("/home/me/.local/bin/nudge"),
            Path::new("/home/me/.local/share/nudge.db"),
            "https://push.example.org",
            "AbC123",
        );

        assert!(unit.contains("ExecStart=/home/me/.local/bin/nudge --database /home/me/.local/share/nudge.db run\n"));
        assert!(unit.contains("Environment=GOTIFY_URL=https://push.example.org\n"));
        assert!(unit.contains("Environment=GOTIFY_APP_TOKEN=AbC123\n"));
        assert!(unit.contains("Type=oneshot\n"));
    }

    #[test]
    fn timer_fires_on_weekday_and_weekend_schedules() {
        let timer = render_timer();
        assert!(timer.contains("OnCalendar=Mon..Fri 08:30\n"));
        assert!(timer.contains("OnCalendar=Sat,Sun 11:00\n"));
        assert!(timer.contains("Persistent=true\n"));
    }

    #[test]
    fn existing_units_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let unit_dir = dir.path().join("systemd/user");
        fs::create_dir_all(&unit_dir).unwrap();
        fs::write(unit_dir.join(TIMER_NAME), "custom").unwrap();

        let written = write_units(&unit_dir, "service", "timer").unwrap();

        assert_eq!(written, vec![unit_dir.join(SERVICE_NAME)]);
        assert_eq!(fs::read_to_string(unit_dir.join(TIMER_NAME)).unwrap(), "custom");
        assert_eq!(fs::read_to_string(unit_dir.join(SERVICE_NAME)).unwrap(), "service");
    }

    #[test]
    fn removing_missing_units_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SERVICE_NAME), "x").unwrap();

        remove_units(dir.path()).unwrap();

        assert!(!dir.path().join(SERVICE_NAME).exists());
    }
}
