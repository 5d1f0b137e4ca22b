//! Runtime configuration for the watcher engine and the reference host loop.

use crate::errors::AutomationError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::warn;

/// Upper bound on how long the post-handler may wait for the dismissal button.
pub const MAX_DISMISS_TIMEOUT_MS: u64 = 5000;

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_DISMISS_BUTTON_TEXT: &str = "OK";

pub const ENV_DISMISS_TIMEOUT_MS: &str = "UIWATCHERS_DISMISS_TIMEOUT_MS";
pub const ENV_POLL_INTERVAL_MS: &str = "UIWATCHERS_POLL_INTERVAL_MS";
pub const ENV_DISMISS_BUTTON_TEXT: &str = "UIWATCHERS_DISMISS_BUTTON_TEXT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// How long the post-handler waits for the dismissal button to appear.
    /// Never more than [`MAX_DISMISS_TIMEOUT_MS`].
    pub dismiss_timeout_ms: u64,
    /// Sleep between polling ticks of [`WatcherTable::wait_for_exists`](crate::WatcherTable::wait_for_exists).
    pub poll_interval_ms: u64,
    /// Label of the generic dismissal button the post-handler clicks.
    pub dismiss_button_text: String,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            dismiss_timeout_ms: MAX_DISMISS_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            dismiss_button_text: DEFAULT_DISMISS_BUTTON_TEXT.to_string(),
        }
    }
}

impl WatcherConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, AutomationError> {
        let config: WatcherConfig = serde_json::from_str(json).map_err(|e| {
            AutomationError::InvalidArgument(format!("Invalid watcher config: {e}"))
        })?;
        Ok(config.normalized())
    }

    /// Defaults overridden by `UIWATCHERS_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env_u64(ENV_DISMISS_TIMEOUT_MS) {
            config.dismiss_timeout_ms = ms;
        }
        if let Some(ms) = read_env_u64(ENV_POLL_INTERVAL_MS) {
            config.poll_interval_ms = ms;
        }
        if let Ok(text) = env::var(ENV_DISMISS_BUTTON_TEXT) {
            if !text.trim().is_empty() {
                config.dismiss_button_text = text;
            }
        }

        config.normalized()
    }

    /// Clamp values that would break the engine's timing guarantees.
    pub fn normalized(mut self) -> Self {
        if self.dismiss_timeout_ms > MAX_DISMISS_TIMEOUT_MS {
            warn!(
                requested = self.dismiss_timeout_ms,
                max = MAX_DISMISS_TIMEOUT_MS,
                "Dismiss timeout above the bound, clamping"
            );
            self.dismiss_timeout_ms = MAX_DISMISS_TIMEOUT_MS;
        }
        if self.dismiss_button_text.trim().is_empty() {
            self.dismiss_button_text = DEFAULT_DISMISS_BUTTON_TEXT.to_string();
        }
        self
    }

    pub fn dismiss_timeout(&self) -> Duration {
        Duration::from_millis(self.dismiss_timeout_ms.min(MAX_DISMISS_TIMEOUT_MS))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn read_env_u64(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}
