//! Application-level configuration loading: panel gate secrets, idle timeouts and
//! game session limits.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RP_PORTAL_CONFIG_PATH";
/// Environment variable that overrides the panel code from the file.
const PANEL_CODE_ENV: &str = "RP_PORTAL_PANEL_CODE";

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Second-factor code unlocking the admin panel. The gate stays closed when unset.
    pub panel_code: Option<String>,
    /// Hard lifetime of an unlocked panel token.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub panel_unlock_ttl: Duration,
    /// Inactivity after which a panel token is dropped.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub panel_idle_timeout: Duration,
    /// How long before the idle timeout the panel is warned.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub panel_idle_warning: Duration,
    /// Inactivity after which a game session is unmounted.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub game_idle_timeout: Duration,
    /// How long before the game idle timeout the session is warned.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub game_idle_warning: Duration,
    /// Upper bound on concurrently mounted game sessions.
    pub max_game_sessions: usize,
    /// Name of the serverless function receiving applicant notifications.
    pub notification_function: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        panel_gate = config.panel_code.is_some(),
                        max_game_sessions = config.max_game_sessions,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(code) = env::var(PANEL_CODE_ENV).ok().filter(|code| !code.is_empty()) {
            config.panel_code = Some(code);
        }
        if config.panel_code.is_none() {
            warn!("no panel code configured; the admin panel cannot be unlocked");
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            panel_code: None,
            panel_unlock_ttl: Duration::from_secs(30 * 60),
            panel_idle_timeout: Duration::from_secs(10 * 60),
            panel_idle_warning: Duration::from_secs(60),
            game_idle_timeout: Duration::from_secs(5 * 60),
            game_idle_warning: Duration::from_secs(30),
            max_game_sessions: 256,
            notification_function: "send-notification".into(),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
