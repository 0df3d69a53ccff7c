//! Command handlers. Each returns the text to print so it can be tested
//! without spawning the binary.

use std::path::Path;

use console::style;
use course_steps::{CoreStrings, StepConfig, StepError, StepInvocation, StepRegistry};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

const KEYWORDS: [&str; 5] = ["Given ", "When ", "Then ", "And ", "But "];

/// Render the vocabulary, optionally filtered by name or pattern
pub fn list_definitions(
    registry: &StepRegistry,
    filter: Option<&str>,
    color: bool,
) -> CliResult<String> {
    let mut out = String::new();
    let mut shown = 0usize;
    for definition in registry.definitions() {
        if let Some(f) = filter {
            if !definition.name().contains(f) && !definition.pattern().contains(f) {
                continue;
            }
        }
        shown += 1;
        let name = if color {
            style(definition.name()).cyan().bold().to_string()
        } else {
            definition.name().to_string()
        };
        out.push_str(&format!("{name:<28} {}\n", definition.pattern()));
    }
    debug!(shown, total = registry.definitions().len(), "listed definitions");
    if shown == 0 {
        return Err(CliError::invalid_argument(format!(
            "no definition matches filter {:?}",
            filter.unwrap_or_default()
        )));
    }
    Ok(out)
}

/// Strip one leading Gherkin keyword
#[must_use]
pub fn strip_keyword(sentence: &str) -> &str {
    let trimmed = sentence.trim();
    KEYWORDS
        .iter()
        .find_map(|k| trimmed.strip_prefix(k))
        .unwrap_or(trimmed)
}

/// Describe the definition a sentence resolves to
pub fn match_sentence(registry: &StepRegistry, sentence: &str) -> CliResult<String> {
    let invocation = StepInvocation::new(sentence);
    let (definition, _) = match registry.find(&invocation) {
        Ok(found) => found,
        Err(e @ (StepError::UndefinedStep { .. } | StepError::AmbiguousStep { .. })) => {
            return Err(CliError::no_match(e.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    info!(definition = definition.name(), "matched");
    let mut out = format!("{}\n", definition.name());
    let captures = definition.captures(sentence).unwrap_or_default();
    for (name, value) in &captures {
        out.push_str(&format!("  {name} = {value:?}\n"));
    }
    if definition.pattern().ends_with(":)$") {
        out.push_str("  (expects a data table)\n");
    }
    Ok(out)
}

/// Default configuration as YAML
pub fn config_show() -> CliResult<String> {
    Ok(StepConfig::default().to_yaml()?)
}

fn require_file(path: &Path) -> CliResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::config(format!(
            "file not found: {}",
            path.display()
        )))
    }
}

/// Load a configuration file and echo the effective values
///
/// With `strings`, the caption overrides are merged onto the defaults and
/// the effective catalog follows the configuration as a second document.
pub fn config_check(path: &Path, strings: Option<&Path>) -> CliResult<String> {
    require_file(path)?;
    let config = StepConfig::load(path).map_err(|e| CliError::config(e.to_string()))?;
    if config.max_expansion_depth == 0 {
        return Err(CliError::config("max_expansion_depth must be at least 1"));
    }
    if config.poll_interval_ms == 0 {
        return Err(CliError::config("poll_interval_ms must be at least 1"));
    }
    let mut out = config.to_yaml()?;
    if let Some(strings) = strings {
        require_file(strings)?;
        let catalog = CoreStrings::load(strings).map_err(|e| CliError::config(e.to_string()))?;
        debug!(path = %strings.display(), "loaded caption overrides");
        out.push_str("---\n");
        out.push_str(&catalog.to_yaml()?);
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry() -> StepRegistry {
        StepRegistry::new().unwrap()
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_lists_every_definition() {
            let registry = registry();
            let out = list_definitions(&registry, None, false).unwrap();
            assert_eq!(out.lines().count(), registry.definitions().len());
            assert!(out.contains("toggle_editing"));
        }

        #[test]
        fn test_filter_by_pattern() {
            let out = list_definitions(&registry(), Some("highlight"), false).unwrap();
            assert!(out.lines().all(|l| l.contains("highlight")));
            assert_eq!(out.lines().count(), 3);
        }

        #[test]
        fn test_empty_filter_result_is_error() {
            assert!(list_definitions(&registry(), Some("juggle"), false).is_err());
        }
    }

    mod match_tests {
        use super::*;

        #[test]
        fn test_strip_keyword() {
            assert_eq!(strip_keyword("  Given I am on homepage"), "I am on homepage");
            assert_eq!(strip_keyword("I am on homepage"), "I am on homepage");
        }

        #[test]
        fn test_match_reports_captures() {
            let out = match_sentence(&registry(), r#"I add a "Forum" to section "3""#).unwrap();
            assert!(out.starts_with("add_activity\n"));
            assert!(out.contains(r#"activity = "Forum""#));
            assert!(out.contains(r#"section = "3""#));
        }

        #[test]
        fn test_match_notes_table() {
            let out = match_sentence(&registry(), "I create a course with:").unwrap();
            assert!(out.contains("expects a data table"));
        }

        #[test]
        fn test_undefined_sentence() {
            let err = match_sentence(&registry(), "I juggle").unwrap_err();
            assert!(matches!(err, CliError::NoMatch { .. }));
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_show_defaults() {
            let out = config_show().unwrap();
            assert!(out.contains("visibility_settle_ms: 5000"));
        }

        #[test]
        fn test_check_valid_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "highlight_settle_ms: 10").unwrap();
            let out = config_check(file.path(), None).unwrap();
            assert!(out.contains("highlight_settle_ms: 10"));
        }

        #[test]
        fn test_check_rejects_zero_depth() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "max_expansion_depth: 0").unwrap();
            assert!(matches!(
                config_check(file.path(), None).unwrap_err(),
                CliError::Config { .. }
            ));
        }

        #[test]
        fn test_check_missing_file() {
            let err = config_check(Path::new("/nonexistent/steps.yaml"), None).unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
        }

        #[test]
        fn test_check_merges_caption_overrides() {
            let mut config = tempfile::NamedTempFile::new().unwrap();
            writeln!(config, "highlight_settle_ms: 10").unwrap();
            let mut strings = tempfile::NamedTempFile::new().unwrap();
            writeln!(strings, "format_topics:\n  showfromothers: Afficher").unwrap();
            let out = config_check(config.path(), Some(strings.path())).unwrap();
            let (settings, captions) = out.split_once("---\n").unwrap();
            assert!(settings.contains("highlight_settle_ms: 10"));
            assert!(captions.contains("showfromothers: Afficher"));
            assert!(captions.contains("hidefromothers: Hide topic"));
        }

        #[test]
        fn test_check_missing_strings_file() {
            let mut config = tempfile::NamedTempFile::new().unwrap();
            writeln!(config, "highlight_settle_ms: 10").unwrap();
            let err = config_check(config.path(), Some(Path::new("/nonexistent/strings.yaml")))
                .unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
        }
    }
}
