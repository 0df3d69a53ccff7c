//! Dispatch table from sentence patterns to handlers.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use super::{course, general, StepArgs, StepContext, StepInvocation, StepOutcome};
use crate::result::{StepError, StepResult};

/// Handler invoked with the captured arguments of a matching sentence
pub type StepHandler = fn(&mut StepContext<'_>, &StepArgs) -> StepResult<StepOutcome>;

/// One sentence pattern and its handler
#[derive(Clone)]
pub struct StepDefinition {
    name: &'static str,
    pattern: Regex,
    handler: StepHandler,
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

impl StepDefinition {
    /// Compile a definition; the pattern is anchored at both ends
    pub fn new(name: &'static str, pattern: &str, handler: StepHandler) -> StepResult<Self> {
        Ok(Self {
            name,
            pattern: Regex::new(&format!("^(?:{pattern})$"))?,
            handler,
        })
    }

    /// Stable handler name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Anchored pattern source
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Handler function
    #[must_use]
    pub const fn handler(&self) -> StepHandler {
        self.handler
    }

    /// Named captures when `text` matches
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<BTreeMap<String, String>> {
        let caps = self.pattern.captures(text)?;
        Some(
            self.pattern
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), m.as_str().replace("\\\"", "\"")))
                })
                .collect(),
        )
    }
}

/// Registration table built once at startup
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Registry with the general and course vocabularies
    pub fn new() -> StepResult<Self> {
        let mut registry = Self::empty();
        for definition in general::definitions()?
            .into_iter()
            .chain(course::definitions()?)
        {
            registry.register(definition);
        }
        Ok(registry)
    }

    /// Registry without any definitions
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a definition
    pub fn register(&mut self, definition: StepDefinition) {
        self.definitions.push(definition);
    }

    /// All definitions in registration order
    #[must_use]
    pub fn definitions(&self) -> &[StepDefinition] {
        &self.definitions
    }

    /// The single definition matching an invocation, with its arguments
    pub fn find(&self, invocation: &StepInvocation) -> StepResult<(&StepDefinition, StepArgs)> {
        let mut matches = self
            .definitions
            .iter()
            .filter_map(|d| d.captures(&invocation.text).map(|caps| (d, caps)));
        let Some((definition, captures)) = matches.next() else {
            return Err(StepError::UndefinedStep {
                text: invocation.text.clone(),
            });
        };
        let others: Vec<&StepDefinition> = matches.map(|(d, _)| d).collect();
        if !others.is_empty() {
            return Err(StepError::AmbiguousStep {
                text: invocation.text.clone(),
                candidates: std::iter::once(definition)
                    .chain(others)
                    .map(|d| d.name.to_string())
                    .collect(),
            });
        }
        Ok((
            definition,
            StepArgs::new(&invocation.text, captures, invocation.table.clone()),
        ))
    }
}
