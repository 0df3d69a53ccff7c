//! Course editing operations and assertions.
//!
//! Each method backs one sentence of the course vocabulary. Methods that
//! only reuse other sentences return a [`StepOutcome::Composite`]; the rest
//! drive the session directly and return once the page has been checked.

use tracing::{debug, info};

use crate::config::StepConfig;
use crate::driver::{DriverSession, ElementHandle};
use crate::locator::{CourseLocator, SectionIcon};
use crate::result::{StepError, StepResult};
use crate::steps::{quote, DataTable, StepInvocation, StepOutcome};
use crate::strings::StringCatalog;
use crate::xpath::{ucfirst, XPath};

/// Course operations bound to one session
pub struct CourseSteps<'a> {
    session: &'a mut dyn DriverSession,
    strings: &'a dyn StringCatalog,
    config: &'a StepConfig,
}

impl std::fmt::Debug for CourseSteps<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseSteps")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> CourseSteps<'a> {
    /// Bind operations to a session
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

    /// Read-only locator over the same session
    #[must_use]
    pub fn locator(&self) -> CourseLocator<'_> {
        CourseLocator::new(&*self.session, self.strings, self.config)
    }

    fn caption(&self, key: &str) -> String {
        self.strings.localize(key, None)
    }

    fn press(&self, key: &str) -> StepInvocation {
        StepInvocation::new(format!("I press {}", quote(&self.caption(key))))
    }

    fn click(&mut self, element: &ElementHandle) -> StepResult<()> {
        debug!(element = %element.id, "click");
        self.session.click(element)
    }

    // =========================================================================
    // Composite steps
    // =========================================================================

    /// Press the editing-mode toggle
    #[must_use]
    pub fn toggle_editing(&self, on: bool) -> StepOutcome {
        let key = if on { "turneditingon" } else { "turneditingoff" };
        StepOutcome::Composite(vec![self.press(key)])
    }

    /// Open the course management page through the administration tree
    #[must_use]
    pub fn go_to_courses_management(&self) -> StepOutcome {
        StepOutcome::Composite(vec![
            StepInvocation::new("I am on homepage"),
            StepInvocation::new(format!(
                "I expand {} node",
                quote(&self.caption("administrationsite"))
            )),
            StepInvocation::new(format!("I expand {} node", quote(&self.caption("courses")))),
            StepInvocation::new(format!("I follow {}", quote(&self.caption("addeditcourses")))),
        ])
    }

    /// Create a course, filling the form fields in the given order
    #[must_use]
    pub fn create_course(&self, fields: &DataTable) -> StepOutcome {
        StepOutcome::Composite(vec![
            StepInvocation::new("I go to the courses management page"),
            self.press("addnewcourse"),
            StepInvocation::new("I fill the moodle form with:").with_table(fields.clone()),
            self.press("savechanges"),
        ])
    }

    /// Add an activity, fill its settings form and return to the course
    #[must_use]
    pub fn add_activity_and_fill_form(
        &self,
        activity: &str,
        section: u32,
        fields: &DataTable,
    ) -> StepOutcome {
        StepOutcome::Composite(vec![
            StepInvocation::new(format!(
                "I add a {} to section \"{section}\"",
                quote(activity)
            )),
            StepInvocation::new("I fill the moodle form with:").with_table(fields.clone()),
            self.press("savechangesandreturntocourse"),
        ])
    }

    // =========================================================================
    // Direct steps
    // =========================================================================

    /// Add an activity of type `activity` to section `number`
    ///
    /// With javascript the activity chooser is opened and the matching type
    /// double-clicked (select and submit in one gesture). Without it the
    /// section's add menu is set and its form submitted once.
    pub fn add_activity_to_section(&mut self, activity: &str, number: u32) -> StepResult<()> {
        let section = self.locator().locate_section(number)?;
        if self.session.is_javascript_enabled() {
            let trigger = self.locator().find_required(
                &section
                    .descendant("div")
                    .attr("class", "section-modchooser")
                    .child("span")
                    .child("a"),
                None,
                &format!("Activity chooser link in section {number}"),
            )?;
            self.click(&trigger)?;

            // TODO: ucfirst only fixes the first letter; localised type names may differ in case elsewhere
            let option = self.locator().find_required(
                &XPath::root()
                    .descendant("div")
                    .by_id("chooseform")
                    .descendant("label")
                    .descendant_with_class("span", "typename")
                    .containing_text(&ucfirst(activity))
                    .parent("label")
                    .child("input"),
                None,
                &format!("\"{activity}\" in the activity chooser"),
            )?;
            debug!(element = %option.id, "double click");
            self.session.double_click(&option)?;
        } else {
            let select_xpath = section
                .descendant_with_class("div", "section_add_menus")
                .descendant("select")
                .containing_text(activity);
            let select = self.locator().find_required(
                &select_xpath,
                None,
                &format!("\"{activity}\" add menu in section {number}"),
            )?;
            self.session.set_value(&select, activity)?;

            let submit = self.locator().find_required(
                &select_xpath
                    .ancestor("form")
                    .descendant("input")
                    .attr("type", "submit"),
                None,
                &format!("Add menu submit button in section {number}"),
            )?;
            self.click(&submit)?;
        }
        info!(activity, section = number, "activity added");
        Ok(())
    }

    /// Mark or unmark section `number` as the current section
    pub fn set_section_highlight(&mut self, number: u32, on: bool) -> StepResult<()> {
        let section = self.locator().locate_section(number)?;
        let caption = self.caption(if on { "markthistopic" } else { "markedthistopic" });
        let link = self.locator().find_required(
            &section.link(&caption),
            None,
            &format!("\"{caption}\" link in section {number}"),
        )?;
        self.click(&link)?;
        self.session.wait(self.config.highlight_settle());
        Ok(())
    }

    /// Show or hide section `number` through its visibility icon
    pub fn toggle_section_visibility(&mut self, number: u32, show: bool) -> StepResult<()> {
        let icon = if show { SectionIcon::Show } else { SectionIcon::Hide };
        let link = self.locator().locate_section_icon(number, icon)?;
        self.click(&link)?;
        self.session.wait(self.config.visibility_settle());
        Ok(())
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Section shows the "highlighted" marker image
    pub fn assert_section_highlighted(&self, number: u32) -> StepResult<()> {
        let locator = self.locator();
        let section = locator.locate_section(number)?;
        let caption = self.caption("markedthistopic");
        let marker = section
            .descendant("img")
            .attr("alt", &caption)
            .attr_contains("src", "marked");
        locator.find_expected(
            &marker,
            None,
            &format!("The \"{number}\" section is not highlighted"),
        )?;
        Ok(())
    }

    /// Inverse of [`Self::assert_section_highlighted`]
    ///
    /// Only an expectation failure counts as "not highlighted"; a missing
    /// section or a driver failure is reported as is.
    pub fn assert_section_not_highlighted(&self, number: u32) -> StepResult<()> {
        match self.assert_section_highlighted(number) {
            Ok(()) => Err(StepError::expectation(format!(
                "The \"{number}\" section is highlighted"
            ))),
            Err(e) if e.is_expectation() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Section is hidden, and its content is hidden accordingly
    pub fn assert_section_hidden(&mut self, number: u32) -> StepResult<()> {
        let section = self.locator().locate_section(number)?;
        self.locator().find_expected(
            &section.clone().with_class("hidden"),
            None,
            &format!("Section {number} is not hidden"),
        )?;

        if !self.locator().current_user_can_edit()? {
            let activities = self.locator().list_section_activities(&section)?;
            if !activities.is_empty() {
                return Err(StepError::expectation(format!(
                    "There are activities in section {number} and they should be hidden"
                )));
            }
            return Ok(());
        }

        self.locator().locate_show_icon(number)?;
        let activities = self.locator().list_section_activities(&section)?;
        let dimmed = XPath::scoped()
            .descendant_with_class("div", "activityinstance")
            .child("a")
            .with_class("dimmed");
        let show_icon = XPath::scoped()
            .descendant_with_class("a", "editing_show")
            .descendant("img");
        for activity in &activities {
            self.locator().find_expected(
                &dimmed,
                Some(activity),
                &format!("There are activities in section {number} that are not dimmed"),
            )?;
            // The show icon must still be there after a click
            let icon = self.locator().find_required(
                &show_icon,
                Some(activity),
                &format!("Activity show icon in section {number}"),
            )?;
            self.click(&icon)?;
            self.locator().find_expected(
                &show_icon,
                Some(activity),
                &format!("There are activities in section {number} which visibility icons are clickable"),
            )?;
        }
        Ok(())
    }

    /// Section is visible; editors also get a hide icon
    pub fn assert_section_visible(&self, number: u32) -> StepResult<()> {
        let locator = self.locator();
        let section = locator.locate_section(number)?;
        if !locator.exists(&section.without_class("hidden"), None)? {
            return Err(StepError::expectation(format!("Section {number} is hidden")));
        }
        if locator.current_user_can_edit()? {
            locator.locate_hide_icon(number)?;
        }
        Ok(())
    }

    /// Activity is listed and not dimmed; editors also get a hide link
    pub fn assert_activity_visible(&self, name: &str) -> StepResult<()> {
        let locator = self.locator();
        let activity = locator.locate_activity(name)?;
        if !locator.current_user_can_edit()? {
            return Ok(());
        }
        if locator.exists(
            &XPath::scoped().descendant_with_class("a", "dimmed"),
            Some(&activity),
        )? {
            return Err(StepError::expectation(format!("\"{name}\" is hidden")));
        }
        let hide = self.caption("hide");
        locator.find_expected(
            &XPath::scoped().link(&hide),
            Some(&activity),
            &format!("\"{name}\" don't have a \"{hide}\" icon"),
        )?;
        Ok(())
    }

    /// Editors see the activity dimmed with a show link; others do not see it
    pub fn assert_activity_hidden(&self, name: &str) -> StepResult<()> {
        let locator = self.locator();
        if !locator.current_user_can_edit()? {
            return match locator.locate_activity(name) {
                Ok(_) => Err(StepError::expectation(format!(
                    "The \"{name}\" activity should not appear"
                ))),
                Err(e) if e.is_not_found() => Ok(()),
                Err(e) => Err(e),
            };
        }
        let activity = locator.locate_activity(name)?;
        locator.find_expected(
            &XPath::scoped().descendant_with_class("a", "dimmed"),
            Some(&activity),
            &format!("\"{name}\" is not dimmed"),
        )?;
        let show = self.caption("show");
        locator.find_expected(
            &XPath::scoped().link(&show),
            Some(&activity),
            &format!("\"{name}\" don't have a \"{show}\" icon"),
        )?;
        Ok(())
    }
}
