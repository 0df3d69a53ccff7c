//! Course editing sentences.

use super::{StepArgs, StepContext, StepDefinition, StepOutcome, QUOTED};
use crate::result::StepResult;

/// Definitions for the course editing vocabulary
pub fn definitions() -> StepResult<Vec<StepDefinition>> {
    let section = r#"section "(?P<section>\d+)""#;
    let activity = format!(r#""(?P<activity>{QUOTED})""#);
    Ok(vec![
        StepDefinition::new("toggle_editing", "I turn editing mode (?P<mode>on|off)", toggle_editing)?,
        StepDefinition::new("create_course", "I create a course with:", create_course)?,
        StepDefinition::new(
            "courses_management",
            "I go to the courses management page",
            courses_management,
        )?,
        StepDefinition::new(
            "add_activity",
            &format!("I add a {activity} to {section}"),
            add_activity,
        )?,
        StepDefinition::new(
            "add_activity_and_fill",
            &format!("I add a {activity} to {section} and I fill the form with:"),
            add_activity_and_fill,
        )?,
        StepDefinition::new(
            "section_highlighting",
            &format!("I turn {section} highlighting (?P<mode>on|off)"),
            section_highlighting,
        )?,
        StepDefinition::new(
            "section_visibility",
            &format!("I (?P<action>show|hide) {section}"),
            section_visibility,
        )?,
        StepDefinition::new(
            "section_highlighted",
            &format!("{section} should be highlighted"),
            section_highlighted,
        )?,
        StepDefinition::new(
            "section_not_highlighted",
            &format!("{section} should not be highlighted"),
            section_not_highlighted,
        )?,
        StepDefinition::new(
            "section_hidden",
            &format!("{section} should be hidden"),
            section_hidden,
        )?,
        StepDefinition::new(
            "section_visible",
            &format!("{section} should be visible"),
            section_visible,
        )?,
        StepDefinition::new(
            "activity_visible",
            &format!("{activity} activity should be visible"),
            activity_visible,
        )?,
        StepDefinition::new(
            "activity_hidden",
            &format!("{activity} activity should be hidden"),
            activity_hidden,
        )?,
    ])
}

fn toggle_editing(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    Ok(ctx.course().toggle_editing(args.is("mode", "on")?))
}

fn create_course(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    Ok(ctx.course().create_course(args.table()?))
}

fn courses_management(ctx: &mut StepContext<'_>, _args: &StepArgs) -> StepResult<StepOutcome> {
    Ok(ctx.course().go_to_courses_management())
}

fn add_activity(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course()
        .add_activity_to_section(args.get("activity")?, args.number("section")?)?;
    Ok(StepOutcome::Done)
}

fn add_activity_and_fill(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    Ok(ctx.course().add_activity_and_fill_form(
        args.get("activity")?,
        args.number("section")?,
        args.table()?,
    ))
}

fn section_highlighting(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course()
        .set_section_highlight(args.number("section")?, args.is("mode", "on")?)?;
    Ok(StepOutcome::Done)
}

fn section_visibility(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course()
        .toggle_section_visibility(args.number("section")?, args.is("action", "show")?)?;
    Ok(StepOutcome::Done)
}

fn section_highlighted(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course().assert_section_highlighted(args.number("section")?)?;
    Ok(StepOutcome::Done)
}

fn section_not_highlighted(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course().assert_section_not_highlighted(args.number("section")?)?;
    Ok(StepOutcome::Done)
}

fn section_hidden(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course().assert_section_hidden(args.number("section")?)?;
    Ok(StepOutcome::Done)
}

fn section_visible(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course().assert_section_visible(args.number("section")?)?;
    Ok(StepOutcome::Done)
}

fn activity_visible(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course().assert_activity_visible(args.get("activity")?)?;
    Ok(StepOutcome::Done)
}

fn activity_hidden(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.course().assert_activity_hidden(args.get("activity")?)?;
    Ok(StepOutcome::Done)
}
