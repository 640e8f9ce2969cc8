//! Configuration management utilities

use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the wake timeout, in seconds
pub const TIMEOUT_ENV: &str = "VCP_TIMEOUT";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_WAKE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Timing of the wake-and-poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub poll_interval: Duration,
    pub wake_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            wake_timeout: DEFAULT_WAKE_TIMEOUT,
        }
    }
}

impl LifecycleConfig {
    pub fn new(poll_interval: Duration, wake_timeout: Duration) -> Self {
        Self {
            poll_interval,
            wake_timeout,
        }
    }

    /// Defaults, with the wake timeout taken from `VCP_TIMEOUT` when set
    pub fn from_env() -> Self {
        Self::from_timeout_value(std::env::var(TIMEOUT_ENV).ok().as_deref())
    }

    /// Apply a raw timeout value in seconds; unparsable or zero values keep the default
    pub fn from_timeout_value(value: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = value {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.wake_timeout = Duration::from_secs(secs),
                _ => warn!(
                    "Ignoring invalid {} value {:?}, using {}s",
                    TIMEOUT_ENV,
                    raw,
                    config.wake_timeout.as_secs()
                ),
            }
        }
        config
    }
}
