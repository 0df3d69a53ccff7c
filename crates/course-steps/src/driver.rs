//! DriverSession - abstract browser session used by every step.
//!
//! Steps never talk to a concrete browser. They hold a `&mut dyn
//! DriverSession`, so a WebDriver-backed session, a headless DOM or the
//! in-memory [`crate::mock::MockSession`] are interchangeable.
//!
//! ```text
//! ┌───────────────┐     ┌───────────────┐     ┌──────────────────────┐
//! │ StepRunner    │────►│ CourseSteps   │────►│ DriverSession        │
//! │ (dispatch)    │     │ CourseLocator │     │ find / click / wait  │
//! └───────────────┘     └───────────────┘     └──────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::result::StepResult;
use crate::xpath::XPath;

/// Element handle for DOM interactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-specific identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Element text content
    pub text_content: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: None,
        }
    }

    /// Attach text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }
}

/// Browser session supplied by the surrounding test framework
///
/// Lookups return `Ok(None)` / an empty list when nothing matches; callers
/// decide whether absence is a failure. `Err` is reserved for transport
/// problems and is never swallowed by the steps.
pub trait DriverSession {
    /// First element matching `xpath`, relative to `scope` when given
    fn find(&self, xpath: &XPath, scope: Option<&ElementHandle>)
        -> StepResult<Option<ElementHandle>>;

    /// Every element matching `xpath`, in document order
    fn find_all(&self, xpath: &XPath, scope: Option<&ElementHandle>)
        -> StepResult<Vec<ElementHandle>>;

    /// Click an element
    fn click(&mut self, element: &ElementHandle) -> StepResult<()>;

    /// Double-click an element
    fn double_click(&mut self, element: &ElementHandle) -> StepResult<()>;

    /// Set a field value; for `<select>` this picks the option by value or text
    fn set_value(&mut self, element: &ElementHandle, value: &str) -> StepResult<()>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, element: &ElementHandle, name: &str) -> StepResult<Option<String>>;

    /// Fixed delay
    fn wait(&mut self, duration: Duration);

    /// Navigate to a site-relative path
    fn visit(&mut self, path: &str) -> StepResult<()>;

    /// Whether the browser executes page scripts
    fn is_javascript_enabled(&self) -> bool;
}
