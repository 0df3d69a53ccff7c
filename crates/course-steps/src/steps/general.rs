//! Generic sentences that composite course steps expand into.

use std::time::Duration;
use tracing::debug;

use super::{StepArgs, StepContext, StepDefinition, StepOutcome, QUOTED};
use crate::locator::CourseLocator;
use crate::result::StepResult;
use crate::xpath::XPath;

/// Definitions for buttons, links, navigation, forms and waits
pub fn definitions() -> StepResult<Vec<StepDefinition>> {
    Ok(vec![
        StepDefinition::new("press_button", &format!(r#"I press "(?P<button>{QUOTED})""#), press_button)?,
        StepDefinition::new("follow_link", &format!(r#"I follow "(?P<link>{QUOTED})""#), follow_link)?,
        StepDefinition::new("homepage", "I am on homepage", homepage)?,
        StepDefinition::new("expand_node", &format!(r#"I expand "(?P<node>{QUOTED})" node"#), expand_node)?,
        StepDefinition::new("fill_form", "I fill the moodle form with:", fill_form)?,
        StepDefinition::new("wait_seconds", r#"I wait "(?P<seconds>\d+)" seconds"#, wait_seconds)?,
    ])
}

fn locator<'c>(ctx: &'c StepContext<'_>) -> CourseLocator<'c> {
    CourseLocator::new(&*ctx.session, ctx.strings, ctx.config)
}

fn press_button(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    let caption = args.get("button")?;
    let button = locator(ctx).find_required(
        &XPath::root().button(caption),
        None,
        &format!("Button \"{caption}\""),
    )?;
    ctx.session.click(&button)?;
    Ok(StepOutcome::Done)
}

fn follow_link(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    let caption = args.get("link")?;
    let link = locator(ctx).find_required(
        &XPath::root().link(caption),
        None,
        &format!("Link \"{caption}\""),
    )?;
    ctx.session.click(&link)?;
    Ok(StepOutcome::Done)
}

fn homepage(ctx: &mut StepContext<'_>, _args: &StepArgs) -> StepResult<StepOutcome> {
    ctx.session.visit("/")?;
    Ok(StepOutcome::Done)
}

/// Navigation tree nodes are already expanded without javascript
fn expand_node(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    let text = args.get("node")?;
    if !ctx.session.is_javascript_enabled() {
        debug!(node = text, "navigation rendered expanded");
        return Ok(StepOutcome::Done);
    }
    let node = locator(ctx).find_required(
        &XPath::root()
            .descendant_with_class("*", "tree_item")
            .containing_text(text),
        None,
        &format!("Navigation node \"{text}\""),
    )?;
    ctx.session.click(&node)?;
    Ok(StepOutcome::Done)
}

fn fill_form(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    for (label, value) in args.table()?.iter() {
        let field = locator(ctx).find_required(
            &XPath::root().field(label),
            None,
            &format!("Form field \"{label}\""),
        )?;
        debug!(field = label, "set value");
        ctx.session.set_value(&field, value)?;
    }
    Ok(StepOutcome::Done)
}

fn wait_seconds(ctx: &mut StepContext<'_>, args: &StepArgs) -> StepResult<StepOutcome> {
    let seconds = args.number("seconds")?;
    ctx.session.wait(Duration::from_secs(u64::from(seconds)));
    Ok(StepOutcome::Done)
}
