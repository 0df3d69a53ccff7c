//! Bounded polling for content that renders asynchronously.

use std::time::{Duration, Instant};

use crate::config::StepConfig;
use crate::result::StepResult;

/// Options for a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Total time to keep trying, in milliseconds
    pub timeout_ms: u64,
    /// Pause between attempts, in milliseconds
    pub poll_interval_ms: u64,
}

impl WaitOptions {
    /// Create new wait options
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Poll window used when listing section activities
    #[must_use]
    pub const fn for_activities(config: &StepConfig) -> Self {
        Self::new(config.activity_poll_timeout_ms, config.poll_interval_ms)
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Retry `attempt` until it yields `Some`, an error, or the window closes
///
/// Always makes at least one attempt. Errors end the loop immediately; a
/// closed window yields `Ok(None)`.
pub fn poll<T, F>(options: &WaitOptions, mut attempt: F) -> StepResult<Option<T>>
where
    F: FnMut() -> StepResult<Option<T>>,
{
    let start = Instant::now();
    let mut attempts = 0_u32;
    loop {
        attempts += 1;
        if let Some(value) = attempt()? {
            tracing::trace!(attempts, elapsed_ms = start.elapsed().as_millis() as u64, "poll satisfied");
            return Ok(Some(value));
        }
        if start.elapsed() >= options.timeout() {
            tracing::trace!(attempts, timeout_ms = options.timeout_ms, "poll window closed");
            return Ok(None);
        }
        std::thread::sleep(options.poll_interval());
    }
}
