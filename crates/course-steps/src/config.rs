//! Step execution configuration.
//!
//! Settle delays are fixed waits after actions that trigger a server-driven
//! page refresh. They are a known source of flakiness under load; the values
//! can be raised per environment through a YAML file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::result::StepResult;

/// Wait after toggling section highlighting (2 seconds)
pub const DEFAULT_HIGHLIGHT_SETTLE_MS: u64 = 2_000;

/// Wait after toggling section visibility (5 seconds)
pub const DEFAULT_VISIBILITY_SETTLE_MS: u64 = 5_000;

/// How long to keep polling for section activities
pub const DEFAULT_ACTIVITY_POLL_TIMEOUT_MS: u64 = 6_000;

/// Polling interval while waiting for elements
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Maximum nesting of composite steps
pub const DEFAULT_MAX_EXPANSION_DEPTH: usize = 8;

/// Configuration shared by every step handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Settle delay after highlighting a section
    pub highlight_settle_ms: u64,
    /// Settle delay after showing or hiding a section
    pub visibility_settle_ms: u64,
    /// Bounded poll window when listing section activities
    pub activity_poll_timeout_ms: u64,
    /// Poll interval
    pub poll_interval_ms: u64,
    /// Composite expansion depth limit
    pub max_expansion_depth: usize,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            highlight_settle_ms: DEFAULT_HIGHLIGHT_SETTLE_MS,
            visibility_settle_ms: DEFAULT_VISIBILITY_SETTLE_MS,
            activity_poll_timeout_ms: DEFAULT_ACTIVITY_POLL_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_expansion_depth: DEFAULT_MAX_EXPANSION_DEPTH,
        }
    }
}

impl StepConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml(yaml: &str) -> StepResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> StepResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> StepResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the highlight settle delay
    #[must_use]
    pub const fn with_highlight_settle(mut self, ms: u64) -> Self {
        self.highlight_settle_ms = ms;
        self
    }

    /// Set the visibility settle delay
    #[must_use]
    pub const fn with_visibility_settle(mut self, ms: u64) -> Self {
        self.visibility_settle_ms = ms;
        self
    }

    /// Set the activity poll window
    #[must_use]
    pub const fn with_activity_poll_timeout(mut self, ms: u64) -> Self {
        self.activity_poll_timeout_ms = ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the composite expansion depth limit
    #[must_use]
    pub const fn with_max_expansion_depth(mut self, depth: usize) -> Self {
        self.max_expansion_depth = depth;
        self
    }

    /// Highlight settle delay as Duration
    #[must_use]
    pub const fn highlight_settle(&self) -> Duration {
        Duration::from_millis(self.highlight_settle_ms)
    }

    /// Visibility settle delay as Duration
    #[must_use]
    pub const fn visibility_settle(&self) -> Duration {
        Duration::from_millis(self.visibility_settle_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = StepConfig::default();
        assert_eq!(config.highlight_settle(), Duration::from_secs(2));
        assert_eq!(config.visibility_settle(), Duration::from_secs(5));
        assert_eq!(config.max_expansion_depth, 8);
    }

    #[test]
    fn test_config_builder() {
        let config = StepConfig::new()
            .with_highlight_settle(10)
            .with_visibility_settle(20)
            .with_activity_poll_timeout(0)
            .with_poll_interval(1)
            .with_max_expansion_depth(3);

        assert_eq!(config.highlight_settle_ms, 10);
        assert_eq!(config.visibility_settle_ms, 20);
        assert_eq!(config.activity_poll_timeout_ms, 0);
        assert_eq!(config.poll_interval_ms, 1);
        assert_eq!(config.max_expansion_depth, 3);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = StepConfig::from_yaml("visibility_settle_ms: 8000\n").unwrap();
        assert_eq!(config.visibility_settle_ms, 8000);
        assert_eq!(config.highlight_settle_ms, DEFAULT_HIGHLIGHT_SETTLE_MS);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = StepConfig::new().with_poll_interval(25);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(StepConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = StepConfig::from_yaml("poll_interval_ms: fast").unwrap_err();
        assert!(matches!(err, crate::StepError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "highlight_settle_ms: 0").unwrap();
        let config = StepConfig::load(file.path()).unwrap();
        assert_eq!(config.highlight_settle_ms, 0);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = StepConfig::load("/nonexistent/course-steps.yaml").unwrap_err();
        assert!(matches!(err, crate::StepError::Io(_)));
    }
}
