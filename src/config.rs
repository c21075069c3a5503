//! Runtime configuration sourced from environment variables.
//!
//! A `.env` file in the working directory is honored (loaded at startup),
//! so local overrides do not require exporting anything. Command line flags
//! take precedence over everything here.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::history::DEFAULT_MAX_SESSIONS;
use crate::organize::ConflictPolicy;

/// Default debounce window for watch mode.
pub const DEFAULT_WATCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct Config {
    /// Where per-folder history journals live. `None` means the platform
    /// config directory is used.
    pub history_dir: Option<PathBuf>,
    /// What to do when a move destination already exists.
    pub on_conflict: ConflictPolicy,
    /// How many sessions each folder journal retains.
    pub max_sessions: usize,
    /// Debounce window for watch mode events.
    pub watch_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_dir: None,
            on_conflict: ConflictPolicy::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            watch_debounce: DEFAULT_WATCH_DEBOUNCE,
        }
    }
}

impl Config {
    /// Build a config from the process environment. Unset variables fall
    /// back to defaults; malformed values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SORTBOX_HISTORY_DIR") {
            if !dir.trim().is_empty() {
                config.history_dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(raw) = env::var("SORTBOX_ON_CONFLICT") {
            match raw.parse::<ConflictPolicy>() {
                Ok(policy) => config.on_conflict = policy,
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring invalid SORTBOX_ON_CONFLICT");
                }
            }
        }

        if let Ok(raw) = env::var("SORTBOX_MAX_SESSIONS") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => config.max_sessions = n,
                _ => {
                    tracing::warn!(value = %raw, "ignoring invalid SORTBOX_MAX_SESSIONS");
                }
            }
        }

        if let Ok(raw) = env::var("SORTBOX_WATCH_DEBOUNCE_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.watch_debounce = Duration::from_millis(ms),
                _ => {
                    tracing::warn!(value = %raw, "ignoring invalid SORTBOX_WATCH_DEBOUNCE_MS");
                }
            }
        }

        config
    }
}
