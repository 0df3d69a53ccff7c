//! Course element locator.
//!
//! Resolves semantic references (section number, activity name, course
//! format) to [`XPath`] queries and checks them against the live page.
//! Nothing is cached: editing mode and visibility change between steps.

use tracing::debug;

use crate::config::StepConfig;
use crate::driver::{DriverSession, ElementHandle};
use crate::result::{StepError, StepResult};
use crate::strings::StringCatalog;
use crate::wait::{poll, WaitOptions};
use crate::xpath::XPath;

/// Marker in `<body id>` that identifies a course view page
pub const COURSE_VIEW_MARKER: &str = "page-course-view-";

/// Which section visibility icon to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionIcon {
    /// Icon that makes a hidden section visible
    Show,
    /// Icon that hides a visible section
    Hide,
}

impl SectionIcon {
    const fn caption_key(self) -> &'static str {
        match self {
            Self::Show => "showfromothers",
            Self::Hide => "hidefromothers",
        }
    }

    const fn path_fragment(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Show => "Show section icon",
            Self::Hide => "Hide section icon",
        }
    }
}

/// Locates course page elements through a [`DriverSession`]
pub struct CourseLocator<'a> {
    session: &'a dyn DriverSession,
    strings: &'a dyn StringCatalog,
    config: &'a StepConfig,
}

impl std::fmt::Debug for CourseLocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseLocator")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> CourseLocator<'a> {
    /// Create a locator over a session
    #[must_use]
    pub fn new(
        session: &'a dyn DriverSession,
        strings: &'a dyn StringCatalog,
        config: &'a StepConfig,
    ) -> Self {
        Self {
            session,
            strings,
            config,
        }
    }

    /// `//li[@id='section-n']`
    #[must_use]
    pub fn section_xpath(number: u32) -> XPath {
        XPath::root()
            .descendant("li")
            .by_id(&format!("section-{number}"))
    }

    /// `//li[class activity][contains(., name)]`
    #[must_use]
    pub fn activity_xpath(name: &str) -> XPath {
        XPath::root()
            .descendant_with_class("li", "activity")
            .containing_text(name)
    }

    /// First match or `ElementNotFound` describing `what`
    pub fn find_required(
        &self,
        xpath: &XPath,
        scope: Option<&ElementHandle>,
        what: &str,
    ) -> StepResult<ElementHandle> {
        debug!(locator = %xpath, what, "find");
        self.session
            .find(xpath, scope)?
            .ok_or_else(|| StepError::not_found(what, xpath.render()))
    }

    /// First match or `ExpectationFailed` with `message`
    pub fn find_expected(
        &self,
        xpath: &XPath,
        scope: Option<&ElementHandle>,
        message: &str,
    ) -> StepResult<ElementHandle> {
        debug!(locator = %xpath, "find expected");
        self.session
            .find(xpath, scope)?
            .ok_or_else(|| StepError::expectation(message))
    }

    /// Whether anything matches, without failing
    pub fn exists(&self, xpath: &XPath, scope: Option<&ElementHandle>) -> StepResult<bool> {
        Ok(self.session.find(xpath, scope)?.is_some())
    }

    /// Ensure section `number` exists and return its locator
    pub fn locate_section(&self, number: u32) -> StepResult<XPath> {
        let xpath = Self::section_xpath(number);
        self.find_required(&xpath, None, &format!("Section {number}"))?;
        Ok(xpath)
    }

    /// Link wrapping the section's show icon
    pub fn locate_show_icon(&self, number: u32) -> StepResult<ElementHandle> {
        self.locate_section_icon(number, SectionIcon::Show)
    }

    /// Link wrapping the section's hide icon
    pub fn locate_hide_icon(&self, number: u32) -> StepResult<ElementHandle> {
        self.locate_section_icon(number, SectionIcon::Hide)
    }

    /// Link wrapping a section visibility icon
    ///
    /// The caption depends on the course format, so the format is resolved
    /// first. The image must match both caption and icon path; the link
    /// around that image is returned so javascript and non-javascript
    /// browsers can both click it.
    pub fn locate_section_icon(&self, number: u32, icon: SectionIcon) -> StepResult<ElementHandle> {
        let section = self.locate_section(number)?;
        let format = self.current_course_format()?;
        let caption = self.strings.localize(icon.caption_key(), Some(&format));
        let image = section
            .descendant("a")
            .descendant("img")
            .attr("alt", &caption)
            .attr_contains("src", icon.path_fragment());
        let what = format!("{} in section {number}", icon.label());
        let img = self.find_required(&image, None, &what)?;
        self.find_required(&XPath::scoped().ancestor("a"), Some(&img), &what)
    }

    /// List item of the activity called `name`
    pub fn locate_activity(&self, name: &str) -> StepResult<ElementHandle> {
        self.find_required(
            &Self::activity_xpath(name),
            None,
            &format!("Activity \"{name}\""),
        )
    }

    /// Activities nested under a section, in page order
    ///
    /// Activities may still be loading, so the lookup is polled; an empty
    /// result after the window closes is not an error.
    pub fn list_section_activities(&self, section: &XPath) -> StepResult<Vec<ElementHandle>> {
        let xpath = section.clone().descendant_with_class("li", "activity");
        let options = WaitOptions::for_activities(self.config);
        let found = poll(&options, || {
            let items = self.session.find_all(&xpath, None)?;
            Ok((!items.is_empty()).then_some(items))
        })?;
        let activities = found.unwrap_or_default();
        debug!(locator = %xpath, count = activities.len(), "section activities");
        Ok(activities)
    }

    /// Whether the page renders an editing-mode toggle
    pub fn current_user_can_edit(&self) -> StepResult<bool> {
        for key in ["turneditingoff", "turneditingon"] {
            let caption = self.strings.localize(key, None);
            if self.exists(&XPath::root().button(&caption), None)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Course format component derived from `<body id>`, e.g. `format_topics`
    ///
    /// Every occurrence of the marker is stripped from the id, so an id
    /// that is exactly the marker yields the bare `format_` prefix.
    pub fn current_course_format(&self) -> StepResult<String> {
        let not_course = "You are not in a course page";
        let body = self.find_expected(&XPath::root().descendant("body"), None, not_course)?;
        let id = self
            .session
            .attribute(&body, "id")?
            .filter(|id| id.contains(COURSE_VIEW_MARKER))
            .ok_or_else(|| StepError::expectation(not_course))?;
        Ok(format!("format_{}", id.replace(COURSE_VIEW_MARKER, "")))
    }
}
