//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Default attention task budget in seconds.
pub const DEFAULT_TASK_SECONDS: u32 = 180;

/// Attention task (breath-count) configuration.
#[derive(Debug, Clone, Copy)]
pub struct TaskConfig {
    /// Total countdown budget in seconds.
    pub duration_secs: u32,
    /// Wall-clock time between countdown ticks. Each tick removes one second
    /// from the budget.
    pub tick_interval: Duration,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_TASK_SECONDS,
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Installer configuration.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Path of the libSQL database file.
    pub db_path: PathBuf,
    pub task: TaskConfig,
    /// Whether scripted dialogue messages are paced with typing delays.
    pub pacing: bool,
    /// Port for the read-only HTTP API. `None` disables it.
    pub http_port: Option<u16>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/rewired.db"),
            task: TaskConfig::default(),
            pacing: true,
            http_port: None,
        }
    }
}

impl InstallerConfig {
    /// Build configuration from `REWIRED_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unparsable values
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = lookup("REWIRED_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let duration_secs: u32 = lookup("REWIRED_TASK_SECONDS")
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TASK_SECONDS);

        let tick_ms: u64 = lookup("REWIRED_TICK_MS")
            .and_then(|s| s.parse().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(1000);

        let pacing = lookup("REWIRED_PACING")
            .map(|value| !(value == "0" || value.eq_ignore_ascii_case("false")))
            .unwrap_or(true);

        let http_port = lookup("REWIRED_HTTP_PORT").and_then(|s| s.parse().ok());

        Self {
            db_path,
            task: TaskConfig {
                duration_secs,
                tick_interval: Duration::from_millis(tick_ms),
            },
            pacing,
            http_port,
        }
    }
}
