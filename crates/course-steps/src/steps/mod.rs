//! Step vocabulary: invocations, outcomes, the dispatch table and runner.
//!
//! A handler either acts on the page directly and returns
//! [`StepOutcome::Done`], or expands into further sentences with
//! [`StepOutcome::Composite`] which the [`StepRunner`] executes in order.

pub mod course;
pub mod general;
mod registry;
mod runner;

pub use registry::{StepDefinition, StepHandler, StepRegistry};
pub use runner::StepRunner;

use std::collections::BTreeMap;
use std::fmt;

use crate::config::StepConfig;
use crate::course::CourseSteps;
use crate::driver::DriverSession;
use crate::result::{StepError, StepResult};
use crate::strings::StringCatalog;

/// Ordered `(name, value)` rows attached to a step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    rows: Vec<(String, String)>,
}

impl DataTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row
    #[must_use]
    pub fn row(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((name.into(), value.into()));
        self
    }

    /// Rows in the order they were given
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A sentence to execute, with an optional data table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInvocation {
    /// Sentence text without the Given/When/Then keyword
    pub text: String,
    /// Attached table
    pub table: Option<DataTable>,
}

impl StepInvocation {
    /// Invocation without a table
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            table: None,
        }
    }

    /// Attach a table
    #[must_use]
    pub fn with_table(mut self, table: DataTable) -> Self {
        self.table = Some(table);
        self
    }
}

impl fmt::Display for StepInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Result of a step handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step acted on the page and passed
    Done,
    /// The step expands to these sentences, run in order
    Composite(Vec<StepInvocation>),
}

/// Arguments captured from a sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepArgs {
    captures: BTreeMap<String, String>,
    table: Option<DataTable>,
    text: String,
}

impl StepArgs {
    pub(crate) fn new(
        text: &str,
        captures: BTreeMap<String, String>,
        table: Option<DataTable>,
    ) -> Self {
        Self {
            captures,
            table,
            text: text.to_string(),
        }
    }

    /// Captured string argument, with `\"` unescaped
    pub fn get(&self, name: &str) -> StepResult<&str> {
        self.captures
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| StepError::InvalidArgument {
                name: name.to_string(),
                message: "not captured".to_string(),
            })
    }

    /// Captured non-negative integer argument
    pub fn number(&self, name: &str) -> StepResult<u32> {
        let raw = self.get(name)?;
        raw.parse().map_err(|e| StepError::InvalidArgument {
            name: name.to_string(),
            message: format!("{raw:?}: {e}"),
        })
    }

    /// Whether a captured argument equals `expected`
    pub fn is(&self, name: &str, expected: &str) -> StepResult<bool> {
        Ok(self.get(name)? == expected)
    }

    /// Attached table, required
    pub fn table(&self) -> StepResult<&DataTable> {
        self.table.as_ref().ok_or_else(|| StepError::MissingTable {
            text: self.text.clone(),
        })
    }
}

/// Everything a handler may touch
pub struct StepContext<'a> {
    /// Browser session
    pub session: &'a mut dyn DriverSession,
    /// Caption lookup
    pub strings: &'a dyn StringCatalog,
    /// Delays and limits
    pub config: &'a StepConfig,
}

impl fmt::Debug for StepContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepContext")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> StepContext<'a> {
    /// Bundle a session with captions and configuration
    pub fn new(
        session: &'a mut dyn DriverSession,
        strings: &'a dyn StringCatalog,
        config: &'a StepConfig,
    ) -> Self {
        Self {
            session,
            strings,
            config,
        }
    }

    /// Course operations over this context
    pub fn course(&mut self) -> CourseSteps<'_> {
        CourseSteps::new(&mut *self.session, self.strings, self.config)
    }
}

/// Sentence fragment for a quoted argument that may contain `\"`
pub(crate) const QUOTED: &str = r#"(?:[^"]|\\")*"#;

/// Quote an argument for re-emission inside a sentence
pub(crate) fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}
