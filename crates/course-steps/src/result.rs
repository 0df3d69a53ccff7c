//! Result and error types for course steps.

use thiserror::Error;

/// Result type for step operations
pub type StepResult<T> = Result<T, StepError>;

/// Errors that can occur while translating or executing a step
#[derive(Debug, Error)]
pub enum StepError {
    /// A required element could not be located
    #[error("{what} not found (locator: {locator})")]
    ElementNotFound {
        /// Human readable description of what was searched for
        what: String,
        /// Rendered locator expression
        locator: String,
    },

    /// A located element violates an expected condition
    #[error("Expectation failed: {message}")]
    ExpectationFailed {
        /// Error message
        message: String,
    },

    /// No registered definition matches the sentence
    #[error("Undefined step: {text}")]
    UndefinedStep {
        /// Sentence that failed to match
        text: String,
    },

    /// More than one definition matches the sentence
    #[error("Ambiguous step: {text} (matches {candidates:?})")]
    AmbiguousStep {
        /// Sentence that matched more than once
        text: String,
        /// Names of the matching definitions
        candidates: Vec<String>,
    },

    /// A captured argument could not be converted
    #[error("Invalid argument {name}: {message}")]
    InvalidArgument {
        /// Capture group name
        name: String,
        /// Error message
        message: String,
    },

    /// Step requires a data table but none was supplied
    #[error("Step requires a data table: {text}")]
    MissingTable {
        /// Sentence that needed a table
        text: String,
    },

    /// Composite steps nested deeper than allowed
    #[error("Step expansion exceeded depth {depth}: {text}")]
    ExpansionTooDeep {
        /// Depth limit that was hit
        depth: usize,
        /// Sentence being expanded
        text: String,
    },

    /// Browser driver or transport failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// A step pattern failed to compile
    #[error("Invalid step pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StepError {
    /// Create an element-not-found error
    #[must_use]
    pub fn not_found(what: impl Into<String>, locator: impl Into<String>) -> Self {
        Self::ElementNotFound {
            what: what.into(),
            locator: locator.into(),
        }
    }

    /// Create an expectation failure
    #[must_use]
    pub fn expectation(message: impl Into<String>) -> Self {
        Self::ExpectationFailed {
            message: message.into(),
        }
    }

    /// Create a driver failure
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Whether this is an element-not-found failure
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Whether this is an expectation failure
    #[must_use]
    pub const fn is_expectation(&self) -> bool {
        matches!(self, Self::ExpectationFailed { .. })
    }
}
