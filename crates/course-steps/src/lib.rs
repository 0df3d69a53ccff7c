//! Course editing steps: Gherkin sentences for a course page, run through a
//! browser session.
//!
//! Sentences such as `I turn editing mode on` or `section "3" should be
//! hidden` are matched against a [`StepRegistry`]. A handler either expands
//! into simpler sentences or locates elements with a structural [`XPath`]
//! and drives the [`DriverSession`] directly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Sentence     │───►│ StepRegistry │───►│ CourseSteps  │───►│ DriverSession│
//! │ + DataTable  │    │ (regex table)│    │ CourseLocator│    │ (browser or  │
//! └──────────────┘    └──────┬───────┘    └──────────────┘    │  MockSession)│
//!                            │ Composite                       └──────────────┘
//!                            ▼
//!                     ┌──────────────┐
//!                     │ StepRunner   │ depth-first, bounded
//!                     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use course_steps::mock::{ActivitySpec, CoursePage, SectionSpec};
//! use course_steps::{CoreStrings, StepConfig, StepRegistry, StepRunner};
//!
//! let mut session = CoursePage::new("topics")
//!     .editor(true)
//!     .section(SectionSpec::new(1).activity(ActivitySpec::new("Forum A", "forum")))
//!     .session();
//! let registry = StepRegistry::new().unwrap();
//! let strings = CoreStrings::default();
//! let config = StepConfig::default();
//! let mut runner = StepRunner::new(&registry, &mut session, &strings, &config);
//! runner.run_text(r#"section "1" should be visible"#).unwrap();
//! runner.run_text(r#""Forum A" activity should be visible"#).unwrap();
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod config;
pub mod course;
pub mod driver;
pub mod locator;
pub mod mock;
mod result;
pub mod steps;
pub mod strings;
pub mod wait;
pub mod xpath;

pub use config::StepConfig;
pub use course::CourseSteps;
pub use driver::{DriverSession, ElementHandle};
pub use locator::{CourseLocator, SectionIcon};
pub use result::{StepError, StepResult};
pub use steps::{
    DataTable, StepArgs, StepContext, StepDefinition, StepInvocation, StepOutcome, StepRegistry,
    StepRunner,
};
pub use strings::{CoreStrings, StringCatalog};
pub use xpath::XPath;
