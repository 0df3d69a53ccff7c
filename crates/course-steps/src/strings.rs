//! Localised UI captions.
//!
//! Elements are located by their rendered captions, so every caption the
//! steps rely on goes through a [`StringCatalog`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::result::StepResult;

/// Component used when no component is given
pub const CORE_COMPONENT: &str = "core";

/// Source of localised captions
pub trait StringCatalog {
    /// Look up `key` in `component`, falling back to core strings
    fn localize(&self, key: &str, component: Option<&str>) -> String;
}

/// In-memory catalog with English defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreStrings {
    components: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for CoreStrings {
    fn default() -> Self {
        let mut strings = Self::empty();
        for (key, text) in [
            ("turneditingon", "Turn editing on"),
            ("turneditingoff", "Turn editing off"),
            ("markthistopic", "Highlight this topic as the current topic"),
            ("markedthistopic", "This topic is highlighted as the current topic"),
            ("show", "Show"),
            ("hide", "Hide"),
            ("addnewcourse", "Add a new course"),
            ("savechanges", "Save changes"),
            ("savechangesandreturntocourse", "Save and return to course"),
            ("administrationsite", "Site administration"),
            ("courses", "Courses"),
            ("addeditcourses", "Add/edit courses"),
        ] {
            strings.insert(CORE_COMPONENT, key, text);
        }
        for (component, unit) in [("format_topics", "topic"), ("format_weeks", "week")] {
            strings.insert(component, "showfromothers", &format!("Show {unit}"));
            strings.insert(component, "hidefromothers", &format!("Hide {unit}"));
        }
        strings
    }
}

impl CoreStrings {
    /// Catalog with no strings at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    /// Add or replace a string
    pub fn insert(&mut self, component: &str, key: &str, text: &str) {
        self.components
            .entry(component.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
    }

    /// Builder form of [`CoreStrings::insert`]
    #[must_use]
    pub fn with(mut self, component: &str, key: &str, text: &str) -> Self {
        self.insert(component, key, text);
        self
    }

    /// Defaults overlaid with a YAML map of `component -> key -> text`
    pub fn from_yaml(yaml: &str) -> StepResult<Self> {
        let overrides: Self = serde_yaml_ng::from_str(yaml)?;
        let mut strings = Self::default();
        strings.merge(overrides);
        Ok(strings)
    }

    /// Defaults overlaid with the YAML file at `path`
    pub fn load(path: impl AsRef<Path>) -> StepResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> StepResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Overlay another catalog onto this one
    pub fn merge(&mut self, other: Self) {
        for (component, keys) in other.components {
            let target = self.components.entry(component).or_default();
            target.extend(keys);
        }
    }

    fn get(&self, component: &str, key: &str) -> Option<&str> {
        self.components
            .get(component)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }
}

impl StringCatalog for CoreStrings {
    fn localize(&self, key: &str, component: Option<&str>) -> String {
        component
            .and_then(|c| self.get(c, key))
            .or_else(|| self.get(CORE_COMPONENT, key))
            .map_or_else(|| format!("[[{key}]]"), str::to_string)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_core_defaults() {
        let strings = CoreStrings::default();
        assert_eq!(strings.localize("turneditingon", None), "Turn editing on");
        assert_eq!(strings.localize("show", None), "Show");
    }

    #[test]
    fn test_format_component_lookup() {
        let strings = CoreStrings::default();
        assert_eq!(
            strings.localize("showfromothers", Some("format_topics")),
            "Show topic"
        );
        assert_eq!(
            strings.localize("hidefromothers", Some("format_weeks")),
            "Hide week"
        );
    }

    #[test]
    fn test_component_falls_back_to_core() {
        let strings = CoreStrings::default();
        assert_eq!(strings.localize("hide", Some("format_topics")), "Hide");
    }

    #[test]
    fn test_missing_string_marker() {
        let strings = CoreStrings::empty();
        assert_eq!(strings.localize("nosuchkey", None), "[[nosuchkey]]");
    }

    #[test]
    fn test_yaml_overrides_merge_onto_defaults() {
        let yaml = "core:\n  show: Afficher\nformat_social:\n  showfromothers: Show forum\n";
        let strings = CoreStrings::from_yaml(yaml).unwrap();
        assert_eq!(strings.localize("show", None), "Afficher");
        assert_eq!(strings.localize("hide", None), "Hide");
        assert_eq!(
            strings.localize("showfromothers", Some("format_social")),
            "Show forum"
        );
    }

    #[test]
    fn test_load_overrides_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format_topics:\n  showfromothers: Afficher la section").unwrap();
        let strings = CoreStrings::load(file.path()).unwrap();
        assert_eq!(
            strings.localize("showfromothers", Some("format_topics")),
            "Afficher la section"
        );
        assert_eq!(
            strings.localize("hidefromothers", Some("format_topics")),
            "Hide topic"
        );
        assert!(strings.to_yaml().unwrap().contains("showfromothers: Afficher la section"));
    }

    #[test]
    fn test_load_rejects_non_map_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"- just\n- a list\n").unwrap();
        assert!(matches!(
            CoreStrings::load(file.path()).unwrap_err(),
            crate::StepError::Config(_)
        ));
    }
}
