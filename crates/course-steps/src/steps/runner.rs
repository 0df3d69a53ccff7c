//! Executes invocations, expanding composite outcomes depth-first.

use tracing::{info, info_span, warn};

use super::{StepContext, StepInvocation, StepOutcome, StepRegistry};
use crate::config::StepConfig;
use crate::driver::DriverSession;
use crate::result::{StepError, StepResult};
use crate::strings::StringCatalog;

/// Runs sentences against one session, one step at a time
#[derive(Debug)]
pub struct StepRunner<'a> {
    registry: &'a StepRegistry,
    context: StepContext<'a>,
    executed: Vec<String>,
}

impl<'a> StepRunner<'a> {
    /// Create a runner over a session
    pub fn new(
        registry: &'a StepRegistry,
        session: &'a mut dyn DriverSession,
        strings: &'a dyn StringCatalog,
        config: &'a StepConfig,
    ) -> Self {
        Self {
            registry,
            context: StepContext::new(session, strings, config),
            executed: Vec::new(),
        }
    }

    /// Run one invocation, including every step it expands to
    pub fn run(&mut self, invocation: &StepInvocation) -> StepResult<()> {
        self.run_at(invocation, 0)
    }

    /// Run a scenario; stops at the first failure
    pub fn run_all(&mut self, invocations: &[StepInvocation]) -> StepResult<()> {
        for invocation in invocations {
            self.run(invocation)?;
        }
        Ok(())
    }

    /// Run a sentence without a table
    pub fn run_text(&mut self, text: &str) -> StepResult<()> {
        self.run(&StepInvocation::new(text))
    }

    /// Names of the definitions executed so far, outermost first
    #[must_use]
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    fn run_at(&mut self, invocation: &StepInvocation, depth: usize) -> StepResult<()> {
        let limit = self.context.config.max_expansion_depth;
        if depth > limit {
            return Err(StepError::ExpansionTooDeep {
                depth: limit,
                text: invocation.text.clone(),
            });
        }
        let (definition, args) = self.registry.find(invocation)?;
        let span = info_span!("step", text = %invocation.text, depth, definition = definition.name());
        let _entered = span.enter();

        self.executed.push(definition.name().to_string());
        let outcome = match (definition.handler())(&mut self.context, &args) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "step failed");
                return Err(e);
            }
        };
        match outcome {
            StepOutcome::Done => {
                info!("step passed");
                Ok(())
            }
            StepOutcome::Composite(children) => {
                info!(count = children.len(), "expanding");
                for child in &children {
                    self.run_at(child, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{CoursePage, MockSession};
    use crate::steps::{StepArgs, StepDefinition};
    use crate::strings::CoreStrings;

    fn recurse(_: &mut StepContext<'_>, _: &StepArgs) -> StepResult<StepOutcome> {
        Ok(StepOutcome::Composite(vec![StepInvocation::new("I recurse")]))
    }

    fn fail(_: &mut StepContext<'_>, _: &StepArgs) -> StepResult<StepOutcome> {
        Err(StepError::expectation("always fails"))
    }

    fn pair(_: &mut StepContext<'_>, _: &StepArgs) -> StepResult<StepOutcome> {
        Ok(StepOutcome::Composite(vec![
            StepInvocation::new("I fail"),
            StepInvocation::new("I recurse"),
        ]))
    }

    fn registry() -> StepRegistry {
        let mut registry = StepRegistry::empty();
        registry.register(StepDefinition::new("recurse", "I recurse", recurse).unwrap());
        registry.register(StepDefinition::new("fail", "I fail", fail).unwrap());
        registry.register(StepDefinition::new("pair", "I pair", pair).unwrap());
        registry
    }

    #[test]
    fn test_expansion_depth_is_bounded() {
        let registry = registry();
        let mut session = MockSession::new(CoursePage::new("topics").build());
        let strings = CoreStrings::default();
        let config = StepConfig::default().with_max_expansion_depth(3);
        let mut runner = StepRunner::new(&registry, &mut session, &strings, &config);
        let err = runner.run_text("I recurse").unwrap_err();
        assert!(matches!(err, StepError::ExpansionTooDeep { depth: 3, .. }));
        assert_eq!(runner.executed().len(), 4);
    }

    #[test]
    fn test_composite_aborts_on_first_failure() {
        let registry = registry();
        let mut session = MockSession::new(CoursePage::new("topics").build());
        let (strings, config) = (CoreStrings::default(), StepConfig::default());
        let mut runner = StepRunner::new(&registry, &mut session, &strings, &config);
        let err = runner.run_text("I pair").unwrap_err();
        assert!(err.is_expectation());
        assert_eq!(runner.executed(), ["pair", "fail"]);
    }

    #[test]
    fn test_undefined_child_fails_parent() {
        let registry = StepRegistry::empty();
        let mut session = MockSession::new(CoursePage::new("topics").build());
        let (strings, config) = (CoreStrings::default(), StepConfig::default());
        let mut runner = StepRunner::new(&registry, &mut session, &strings, &config);
        assert!(matches!(
            runner.run_text("I pair").unwrap_err(),
            StepError::UndefinedStep { .. }
        ));
    }
}
