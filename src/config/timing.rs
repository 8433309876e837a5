// ABOUTME: Per-unit timeout and poll interval configuration.
// ABOUTME: The poll interval defaults to timeout/20, clamped to [5s, 30s].

use serde::Deserialize;
use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Timing as declared in the manifest. Both fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimingConfig {
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,

    #[serde(default, with = "humantime_serde::option")]
    pub poll_interval: Option<Duration>,
}

/// Resolved timing for one run.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

/// Interval short enough to bound detection latency, long enough to avoid
/// overloading the status endpoint.
pub fn derive_poll_interval(timeout: Duration) -> Duration {
    (timeout / 20).clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

impl TimingConfig {
    /// Resolve manifest timing, letting CLI flags override either field.
    pub fn resolve(
        &self,
        timeout_override: Option<Duration>,
        poll_interval_override: Option<Duration>,
    ) -> Timing {
        let timeout = timeout_override
            .or(self.timeout)
            .unwrap_or_else(default_timeout);
        let poll_interval = poll_interval_override
            .or(self.poll_interval)
            .unwrap_or_else(|| derive_poll_interval(timeout));

        Timing {
            timeout,
            poll_interval,
        }
    }
}
