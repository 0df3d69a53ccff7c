//! End-to-end scenarios: sentences run through the registry and runner
//! against rendered course pages.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use course_steps::mock::{ActivitySpec, CoursePage, DomChange, El, MockSession, SectionSpec};
use course_steps::{
    CoreStrings, DataTable, StepConfig, StepError, StepInvocation, StepRegistry, StepResult,
    StepRunner, XPath,
};

fn config() -> StepConfig {
    StepConfig::default().with_activity_poll_timeout(0)
}

/// Run sentences in order and return the executed definition names
fn scenario(session: &mut MockSession, steps: &[StepInvocation]) -> StepResult<Vec<String>> {
    let registry = StepRegistry::new()?;
    let strings = CoreStrings::default();
    let config = config();
    let mut runner = StepRunner::new(&registry, session, &strings, &config);
    let result = runner.run_all(steps);
    let executed = runner.executed().to_vec();
    result.map(|()| executed)
}

fn steps(sentences: &[&str]) -> Vec<StepInvocation> {
    sentences.iter().map(|s| StepInvocation::new(*s)).collect()
}

fn node(session: &MockSession, xpath: &XPath) -> usize {
    session.dom().evaluate(xpath, None)[0]
}

// ============================================================================
// Editing mode and course creation
// ============================================================================

#[test]
fn test_turn_editing_mode_on_presses_localised_button() {
    let mut session = CoursePage::new("topics").editor(false).session();
    let executed = scenario(&mut session, &steps(&["I turn editing mode on"])).unwrap();
    assert_eq!(executed, ["toggle_editing", "press_button"]);
    assert_eq!(session.count_calls("click:"), 1);
}

#[test]
fn test_turn_editing_mode_off_without_button_fails() {
    let mut session = CoursePage::new("topics").editor(false).session();
    let err = scenario(&mut session, &steps(&["I turn editing mode off"])).unwrap_err();
    assert!(err.is_not_found());
}

fn site_page() -> El {
    El::new("html").child(
        El::new("body").id("page-site-index").children([
            El::new("ul").children([
                El::new("li").child(El::new("p").class("tree_item").text("Site administration")),
                El::new("li").child(El::new("p").class("tree_item").text("Courses")),
            ]),
            El::new("a").attr("href", "/course/management.php").text("Add/edit courses"),
            El::new("form").child(
                El::new("input")
                    .attr("type", "submit")
                    .attr("value", "Add a new course"),
            ),
            El::new("form").id("mform1").children([
                El::new("label").attr("for", "id_fullname").text("Course full name"),
                El::new("input").id("id_fullname").attr("name", "fullname"),
                El::new("label").attr("for", "id_shortname").text("Course short name"),
                El::new("input").id("id_shortname").attr("name", "shortname"),
                El::new("input").attr("type", "submit").attr("value", "Save changes"),
            ]),
        ]),
    )
}

#[test]
fn test_create_course_expands_in_order() {
    let mut session = MockSession::new(site_page());
    let table = DataTable::new()
        .row("Course full name", "Course 1")
        .row("Course short name", "C1");
    let executed = scenario(
        &mut session,
        &[StepInvocation::new("I create a course with:").with_table(table)],
    )
    .unwrap();
    assert_eq!(
        executed,
        [
            "create_course",
            "courses_management",
            "homepage",
            "expand_node",
            "expand_node",
            "follow_link",
            "press_button",
            "fill_form",
            "press_button",
        ]
    );
    assert_eq!(session.current_url(), "/");
    let values: Vec<&str> = session
        .history()
        .iter()
        .filter(|c| c.starts_with("set_value:"))
        .filter_map(|c| c.rsplit(':').next())
        .collect();
    assert_eq!(values, ["Course 1", "C1"]);
}

#[test]
fn test_create_course_with_javascript_expands_tree() {
    let mut session = MockSession::new(site_page()).with_javascript(true);
    let table = DataTable::new().row("fullname", "Course 1");
    scenario(
        &mut session,
        &[StepInvocation::new("I create a course with:").with_table(table)],
    )
    .unwrap();
    // two tree items, one link, two buttons
    assert_eq!(session.count_calls("click:"), 5);
}

#[test]
fn test_create_course_without_table_fails() {
    let mut session = MockSession::new(site_page());
    let err = scenario(&mut session, &steps(&["I create a course with:"])).unwrap_err();
    assert!(matches!(err, StepError::MissingTable { .. }));
}

// ============================================================================
// Adding activities
// ============================================================================

#[test]
fn test_add_activity_without_javascript_submits_once() {
    let mut session = CoursePage::new("topics")
        .editor(true)
        .add_menu(&["Forum", "Quiz"])
        .section(SectionSpec::new(1))
        .section(SectionSpec::new(2))
        .session();
    scenario(&mut session, &steps(&[r#"I add a "Quiz" to section "2""#])).unwrap();

    let select = node(
        &session,
        &XPath::root().by_id("section-2").descendant("select"),
    );
    assert_eq!(session.dom().attr(select, "value"), Some("Quiz"));
    assert_eq!(session.count_calls("click:"), 1);
    assert!(!session.was_called("double_click:"));
}

#[test]
fn test_add_unknown_activity_without_javascript_fails() {
    let mut session = CoursePage::new("topics")
        .editor(true)
        .add_menu(&["Forum"])
        .section(SectionSpec::new(1))
        .session();
    let err = scenario(&mut session, &steps(&[r#"I add a "Wiki" to section "1""#])).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(session.count_calls("click:"), 0);
}

#[test]
fn test_add_activity_with_javascript_uses_chooser() {
    let mut session = CoursePage::new("weeks")
        .editor(true)
        .chooser(&["Assignment", "Forum"])
        .section(SectionSpec::new(1))
        .session()
        .with_javascript(true);
    scenario(&mut session, &steps(&[r#"I add a "forum" to section "1""#])).unwrap();
    assert_eq!(session.count_calls("click:"), 1);
    assert_eq!(session.count_calls("double_click:"), 1);
}

#[test]
fn test_add_activity_and_fill_form() {
    let page = CoursePage::new("topics")
        .editor(true)
        .add_menu(&["Forum"])
        .section(SectionSpec::new(1))
        .build()
        .child(El::new("form").children([
            El::new("label").attr("for", "id_name").text("Forum name"),
            El::new("input").id("id_name").attr("name", "name"),
            El::new("input")
                .attr("type", "submit")
                .attr("value", "Save and return to course"),
        ]));
    let mut session = MockSession::new(page);
    let invocation = StepInvocation::new(r#"I add a "Forum" to section "1" and I fill the form with:"#)
        .with_table(DataTable::new().row("Forum name", "News"));
    let executed = scenario(&mut session, &[invocation]).unwrap();
    assert_eq!(
        executed,
        ["add_activity_and_fill", "add_activity", "fill_form", "press_button"]
    );
    assert!(session.history().iter().any(|c| c.ends_with(":News")));
}

// ============================================================================
// Section highlighting and visibility
// ============================================================================

#[test]
fn test_highlight_section_clicks_marker_and_settles() {
    let mut session = CoursePage::new("topics")
        .editor(true)
        .section(SectionSpec::new(1))
        .section(SectionSpec::new(2).highlighted())
        .session();
    scenario(
        &mut session,
        &steps(&[
            r#"section "1" should not be highlighted"#,
            r#"section "2" should be highlighted"#,
            r#"I turn section "1" highlighting on"#,
        ]),
    )
    .unwrap();
    assert_eq!(session.count_calls("click:"), 1);
    assert_eq!(session.history().last().map(String::as_str), Some("wait:2000"));
}

#[test]
fn test_not_highlighted_fails_on_highlighted_section() {
    let mut session = CoursePage::new("topics")
        .section(SectionSpec::new(3).highlighted())
        .session();
    let err = scenario(&mut session, &steps(&[r#"section "3" should not be highlighted"#]))
        .unwrap_err();
    assert!(err.is_expectation());
}

#[test]
fn test_not_highlighted_propagates_missing_section() {
    let mut session = CoursePage::new("topics").session();
    let err = scenario(&mut session, &steps(&[r#"section "9" should not be highlighted"#]))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_hide_section_then_assert_hidden() {
    let mut session = CoursePage::new("topics")
        .editor(true)
        .section(SectionSpec::new(1))
        .section(SectionSpec::new(2))
        .session();
    let section = node(&session, &XPath::root().by_id("section-2"));
    let link = node(
        &session,
        &XPath::root()
            .by_id("section-2")
            .descendant("a")
            .attr("title", "Hide topic"),
    );
    let img = node(
        &session,
        &XPath::root()
            .by_id("section-2")
            .descendant("a")
            .attr("title", "Hide topic")
            .descendant("img"),
    );
    for change in [
        DomChange::AddClass(section, "hidden".to_string()),
        DomChange::SetAttr(link, "title".to_string(), "Show topic".to_string()),
        DomChange::SetAttr(img, "alt".to_string(), "Show topic".to_string()),
        DomChange::SetAttr(img, "src".to_string(), "/theme/image.php?image=i/show".to_string()),
    ] {
        session.on_click(link, change);
    }

    scenario(
        &mut session,
        &steps(&[
            r#"section "2" should be visible"#,
            r#"I hide section "2""#,
            r#"section "2" should be hidden"#,
            r#"section "1" should be visible"#,
        ]),
    )
    .unwrap();
    assert!(session.history().iter().any(|c| c == "wait:5000"));
}

#[test]
fn test_show_section_then_assert_visible() {
    let mut session = CoursePage::new("topics")
        .editor(true)
        .section(SectionSpec::new(1))
        .section(SectionSpec::new(2).hidden())
        .session();
    let section = node(&session, &XPath::root().by_id("section-2"));
    let link = node(
        &session,
        &XPath::root()
            .by_id("section-2")
            .descendant("a")
            .attr("title", "Show topic"),
    );
    let img = node(
        &session,
        &XPath::root()
            .by_id("section-2")
            .descendant("a")
            .attr("title", "Show topic")
            .descendant("img"),
    );
    for change in [
        DomChange::RemoveClass(section, "hidden".to_string()),
        DomChange::SetAttr(link, "title".to_string(), "Hide topic".to_string()),
        DomChange::SetAttr(img, "alt".to_string(), "Hide topic".to_string()),
        DomChange::SetAttr(img, "src".to_string(), "/theme/image.php?image=i/hide".to_string()),
    ] {
        session.on_click(link, change);
    }

    scenario(
        &mut session,
        &steps(&[
            r#"section "2" should be hidden"#,
            r#"I show section "2""#,
            r#"section "2" should be visible"#,
        ]),
    )
    .unwrap();
    assert_eq!(session.count_calls("click:"), 1);
    assert!(session.history().iter().any(|c| c == "wait:5000"));
}

#[test]
fn test_hidden_section_with_dimmed_activities_for_editor() {
    let mut session = CoursePage::new("weeks")
        .editor(true)
        .section(
            SectionSpec::new(4)
                .hidden()
                .activity(ActivitySpec::new("Forum A", "forum").hidden())
                .activity(ActivitySpec::new("Quiz B", "quiz").hidden()),
        )
        .session();
    scenario(&mut session, &steps(&[r#"section "4" should be hidden"#])).unwrap();
    // each activity's show icon is clicked once
    assert_eq!(session.count_calls("click:"), 2);
}

#[test]
fn test_hidden_section_with_visible_activity_fails() {
    let mut session = CoursePage::new("topics")
        .editor(true)
        .section(
            SectionSpec::new(1)
                .hidden()
                .activity(ActivitySpec::new("Forum A", "forum")),
        )
        .session();
    let err = scenario(&mut session, &steps(&[r#"section "1" should be hidden"#])).unwrap_err();
    assert!(err.is_expectation());
    assert!(err.to_string().contains("not dimmed"));
}

#[test]
fn test_hidden_section_for_student_must_be_empty() {
    let mut empty = CoursePage::new("topics")
        .section(SectionSpec::new(1).hidden())
        .session();
    scenario(&mut empty, &steps(&[r#"section "1" should be hidden"#])).unwrap();

    let mut populated = CoursePage::new("topics")
        .section(
            SectionSpec::new(1)
                .hidden()
                .activity(ActivitySpec::new("Forum A", "forum")),
        )
        .session();
    let err = scenario(&mut populated, &steps(&[r#"section "1" should be hidden"#])).unwrap_err();
    assert!(err.is_expectation());
}

#[test]
fn test_visibility_outside_course_page() {
    let mut session = CoursePage::non_course()
        .editor(true)
        .section(SectionSpec::new(1))
        .session();
    let err = scenario(&mut session, &steps(&[r#"section "1" should be visible"#])).unwrap_err();
    assert!(err.is_expectation());
    assert!(err.to_string().contains("You are not in a course page"));
}

// ============================================================================
// Activity visibility
// ============================================================================

#[test]
fn test_activity_visibility_for_editor() {
    let mut session = CoursePage::new("topics")
        .editor(true)
        .section(
            SectionSpec::new(1)
                .activity(ActivitySpec::new("Forum A", "forum"))
                .activity(ActivitySpec::new("Quiz B", "quiz").hidden()),
        )
        .session();
    scenario(
        &mut session,
        &steps(&[
            r#""Forum A" activity should be visible"#,
            r#""Quiz B" activity should be hidden"#,
        ]),
    )
    .unwrap();

    let err = scenario(&mut session, &steps(&[r#""Quiz B" activity should be visible"#]))
        .unwrap_err();
    assert!(err.to_string().contains("is hidden"));
}

#[test]
fn test_hidden_activity_for_student_is_absent() {
    let mut session = CoursePage::new("topics")
        .section(SectionSpec::new(1).activity(ActivitySpec::new("Forum A", "forum")))
        .session();
    scenario(&mut session, &steps(&[r#""Secret quiz" activity should be hidden"#])).unwrap();

    let err = scenario(&mut session, &steps(&[r#""Forum A" activity should be hidden"#]))
        .unwrap_err();
    assert!(err.is_expectation());
    assert!(err.to_string().contains("should not appear"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_scenario_stops_at_first_failure() {
    let mut session = CoursePage::new("topics")
        .section(SectionSpec::new(1))
        .session();
    let err = scenario(
        &mut session,
        &steps(&[
            r#"section "1" should be hidden"#,
            "I am on homepage",
        ]),
    )
    .unwrap_err();
    assert!(err.is_expectation());
    assert!(!session.was_called("visit:"));
}

#[test]
fn test_driver_failure_propagates() {
    let mut session = CoursePage::new("topics")
        .section(SectionSpec::new(1))
        .session();
    session.break_with("connection reset");
    let err = scenario(&mut session, &steps(&[r#"section "1" should not be highlighted"#]))
        .unwrap_err();
    assert!(matches!(err, StepError::Driver { .. }));
}

#[test]
fn test_undefined_sentence() {
    let mut session = CoursePage::new("topics").session();
    let err = scenario(&mut session, &steps(&["I juggle three sections"])).unwrap_err();
    assert!(matches!(err, StepError::UndefinedStep { .. }));
}
