//! In-memory DOM and mock session for unit testing.
//!
//! [`MockSession`] evaluates the structured [`XPath`] directly against a small
//! node tree, records every interaction in a call history, and applies
//! scripted [`DomChange`]s when elements are clicked.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::driver::{DriverSession, ElementHandle};
use crate::result::{StepError, StepResult};
use crate::strings::{CoreStrings, StringCatalog};
use crate::xpath::{Axis, NodeTest, Predicate, XPath};

/// Index of a node in a [`MockDom`]
pub type NodeId = usize;

const DOCUMENT: NodeId = 0;

/// Declarative element description used to build a [`MockDom`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct El {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<El>,
}

impl El {
    /// Element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.retain(|(n, _)| n != name);
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Append a class to the `class` attribute
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        let current = self
            .attrs
            .iter()
            .find(|(n, _)| n == "class")
            .map(|(_, v)| v.clone());
        let merged = match current {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attr("class", &merged)
    }

    /// Set own text content
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Append a child element
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child elements
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutation applied to the DOM when an element is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomChange {
    /// Add a class to a node
    AddClass(NodeId, String),
    /// Remove a class from a node
    RemoveClass(NodeId, String),
    /// Set an attribute on a node
    SetAttr(NodeId, String, String),
    /// Detach a node from the tree
    Remove(NodeId),
    /// Append a new subtree below a node
    Append(NodeId, El),
}

/// Arena-backed element tree
#[derive(Debug, Clone)]
pub struct MockDom {
    nodes: Vec<Node>,
}

impl MockDom {
    /// Document containing a single root element
    #[must_use]
    pub fn new(root: El) -> Self {
        let mut dom = Self {
            nodes: vec![Node {
                tag: "#document".to_string(),
                attrs: BTreeMap::new(),
                text: String::new(),
                parent: None,
                children: Vec::new(),
            }],
        };
        dom.append(DOCUMENT, root);
        dom
    }

    /// Append a subtree below `parent`, returning the new node
    pub fn append(&mut self, parent: NodeId, el: El) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: el.tag,
            attrs: el.attrs.into_iter().collect(),
            text: el.text,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        for child in el.children {
            self.append(id, child);
        }
        id
    }

    /// Detach a node; it no longer matches any query
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) {
            self.nodes[parent].children.retain(|&c| c != id);
            self.nodes[id].parent = None;
        }
    }

    /// Set an attribute
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(id)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    /// Tag name
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.tag.as_str())
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    /// Add a class
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            let merged = match self.attr(id, "class") {
                Some(list) if !list.trim().is_empty() => format!("{list} {class}"),
                _ => class.to_string(),
            };
            self.set_attr(id, "class", &merged);
        }
    }

    /// Remove a class
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(list) = self.attr(id, "class") {
            let kept: Vec<&str> = list.split_whitespace().filter(|c| *c != class).collect();
            let kept = kept.join(" ");
            self.set_attr(id, "class", &kept);
        }
    }

    /// Apply a scripted change
    pub fn apply(&mut self, change: &DomChange) {
        match change {
            DomChange::AddClass(id, class) => self.add_class(*id, class),
            DomChange::RemoveClass(id, class) => self.remove_class(*id, class),
            DomChange::SetAttr(id, name, value) => self.set_attr(*id, name, value),
            DomChange::Remove(id) => self.remove(*id),
            DomChange::Append(parent, el) => {
                self.append(*parent, el.clone());
            }
        }
    }

    /// Node carrying `id="…"`
    #[must_use]
    pub fn by_html_id(&self, html_id: &str) -> Option<NodeId> {
        self.evaluate(&XPath::root().by_id(html_id), None)
            .first()
            .copied()
    }

    /// Concatenated text of a node and its descendants
    #[must_use]
    pub fn string_value(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        out.push_str(&node.text);
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    fn descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[id].children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(parent) = current {
            out.push(parent);
            current = self.nodes[parent].parent;
        }
        out
    }

    fn is_attached(&self, id: NodeId) -> bool {
        id == DOCUMENT || self.ancestors(id).contains(&DOCUMENT)
    }

    fn axis_nodes(&self, context: NodeId, axis: Axis) -> Vec<NodeId> {
        match axis {
            Axis::Descendant => {
                let mut out = Vec::new();
                self.descendants(context, &mut out);
                out
            }
            Axis::Child => self.nodes[context].children.clone(),
            Axis::Parent => self.nodes[context].parent.into_iter().collect(),
            Axis::Ancestor => self.ancestors(context),
        }
    }

    fn node_matches(&self, id: NodeId, test: &NodeTest) -> bool {
        let tag = self.nodes[id].tag.as_str();
        match test {
            NodeTest::Any => id != DOCUMENT,
            NodeTest::Tag(expected) => tag == expected,
            NodeTest::Button => {
                tag == "button"
                    || (tag == "input"
                        && matches!(
                            self.attr(id, "type"),
                            Some("submit" | "button" | "reset" | "image")
                        ))
            }
            NodeTest::Link => tag == "a",
            NodeTest::Field => matches!(tag, "input" | "select" | "textarea"),
        }
    }

    fn predicate_matches(&self, id: NodeId, test: &NodeTest, predicate: &Predicate) -> bool {
        let attr_contains =
            |name: &str, needle: &str| self.attr(id, name).is_some_and(|v| v.contains(needle));
        let attr_equals = |name: &str, value: &str| self.attr(id, name) == Some(value);
        match predicate {
            Predicate::AttrEquals { name, value } => attr_equals(name, value),
            Predicate::AttrContains { name, needle } => attr_contains(name, needle),
            Predicate::Class(class) => self.has_class(id, class),
            Predicate::Text(text) => self.string_value(id).contains(text.as_str()),
            Predicate::Locator(locator) => {
                let l = locator.as_str();
                let text_matches = normalize_space(&self.string_value(id)).contains(l);
                match test {
                    NodeTest::Button => {
                        attr_equals("id", l)
                            || attr_equals("name", l)
                            || attr_contains("value", l)
                            || attr_contains("title", l)
                            || text_matches
                    }
                    NodeTest::Link => {
                        attr_equals("id", l)
                            || attr_contains("title", l)
                            || text_matches
                            || self
                                .evaluate(&XPath::scoped().descendant("img"), Some(id))
                                .into_iter()
                                .any(|img| self.attr(img, "alt").is_some_and(|a| a.contains(l)))
                    }
                    NodeTest::Field => {
                        attr_equals("id", l)
                            || attr_equals("name", l)
                            || attr_contains("placeholder", l)
                            || self.attr(id, "id").is_some_and(|field_id| {
                                self.evaluate(&XPath::root().descendant("label"), None)
                                    .into_iter()
                                    .any(|label| {
                                        self.attr(label, "for") == Some(field_id)
                                            && normalize_space(&self.string_value(label))
                                                .contains(l)
                                    })
                            })
                    }
                    NodeTest::Any | NodeTest::Tag(_) => attr_equals("id", l) || text_matches,
                }
            }
            Predicate::Not(inner) => !self.predicate_matches(id, test, inner),
        }
    }

    /// Nodes matching `xpath`, in document order
    #[must_use]
    pub fn evaluate(&self, xpath: &XPath, scope: Option<NodeId>) -> Vec<NodeId> {
        let start = if xpath.is_relative() {
            scope.unwrap_or(DOCUMENT)
        } else {
            DOCUMENT
        };
        if !self.is_attached(start) {
            return Vec::new();
        }
        let mut context = vec![start];
        for step in xpath.steps() {
            let mut next: Vec<NodeId> = Vec::new();
            for &node in &context {
                for candidate in self.axis_nodes(node, step.axis()) {
                    if next.contains(&candidate) || !self.node_matches(candidate, step.node()) {
                        continue;
                    }
                    if step
                        .predicates()
                        .iter()
                        .all(|p| self.predicate_matches(candidate, step.node(), p))
                    {
                        next.push(candidate);
                    }
                }
            }
            context = next;
        }
        let mut order = vec![DOCUMENT];
        self.descendants(DOCUMENT, &mut order);
        order.retain(|id| context.contains(id));
        order
    }

    fn handle(&self, id: NodeId) -> ElementHandle {
        ElementHandle::new(format!("node-{id}"), self.nodes[id].tag.clone())
            .with_text(normalize_space(&self.string_value(id)))
    }

    fn resolve(&self, element: &ElementHandle) -> StepResult<NodeId> {
        element
            .id
            .strip_prefix("node-")
            .and_then(|raw| raw.parse::<NodeId>().ok())
            .filter(|&id| id < self.nodes.len() && self.is_attached(id))
            .ok_or_else(|| StepError::driver(format!("stale element reference: {}", element.id)))
    }
}

fn normalize_space(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Mock browser session backed by a [`MockDom`]
#[derive(Debug)]
pub struct MockSession {
    dom: MockDom,
    javascript: bool,
    current_url: String,
    call_history: Vec<String>,
    click_changes: HashMap<NodeId, Vec<DomChange>>,
    broken: Option<String>,
}

impl MockSession {
    /// Session over a document, javascript disabled
    #[must_use]
    pub fn new(root: El) -> Self {
        Self {
            dom: MockDom::new(root),
            javascript: false,
            current_url: String::new(),
            call_history: Vec::new(),
            click_changes: HashMap::new(),
            broken: None,
        }
    }

    /// Enable or disable javascript mode
    #[must_use]
    pub const fn with_javascript(mut self, enabled: bool) -> Self {
        self.javascript = enabled;
        self
    }

    /// Make every subsequent driver call fail with a transport error
    pub fn break_with(&mut self, message: impl Into<String>) {
        self.broken = Some(message.into());
    }

    /// Apply `change` whenever `node` is clicked
    pub fn on_click(&mut self, node: NodeId, change: DomChange) {
        self.click_changes.entry(node).or_default().push(change);
    }

    /// Underlying DOM
    #[must_use]
    pub const fn dom(&self) -> &MockDom {
        &self.dom
    }

    /// Underlying DOM, mutable
    pub fn dom_mut(&mut self) -> &mut MockDom {
        &mut self.dom
    }

    /// Last visited path
    #[must_use]
    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.call_history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn check(&self) -> StepResult<()> {
        self.broken
            .as_ref()
            .map_or(Ok(()), |message| Err(StepError::driver(message.clone())))
    }

    fn scope_node(&self, scope: Option<&ElementHandle>) -> StepResult<Option<NodeId>> {
        scope.map(|element| self.dom.resolve(element)).transpose()
    }
}

impl DriverSession for MockSession {
    fn find(
        &self,
        xpath: &XPath,
        scope: Option<&ElementHandle>,
    ) -> StepResult<Option<ElementHandle>> {
        Ok(self.find_all(xpath, scope)?.into_iter().next())
    }

    fn find_all(
        &self,
        xpath: &XPath,
        scope: Option<&ElementHandle>,
    ) -> StepResult<Vec<ElementHandle>> {
        self.check()?;
        let scope = self.scope_node(scope)?;
        Ok(self
            .dom
            .evaluate(xpath, scope)
            .into_iter()
            .map(|id| self.dom.handle(id))
            .collect())
    }

    fn click(&mut self, element: &ElementHandle) -> StepResult<()> {
        self.check()?;
        let node = self.dom.resolve(element)?;
        self.call_history.push(format!("click:{}", element.id));
        if let Some(changes) = self.click_changes.get(&node) {
            for change in changes {
                self.dom.apply(change);
            }
        }
        Ok(())
    }

    fn double_click(&mut self, element: &ElementHandle) -> StepResult<()> {
        self.check()?;
        self.dom.resolve(element)?;
        self.call_history
            .push(format!("double_click:{}", element.id));
        Ok(())
    }

    fn set_value(&mut self, element: &ElementHandle, value: &str) -> StepResult<()> {
        self.check()?;
        let node = self.dom.resolve(element)?;
        if self.dom.tag(node) == Some("select") {
            let options = self
                .dom
                .evaluate(&XPath::scoped().descendant("option"), Some(node));
            let matched = options.into_iter().any(|option| {
                self.dom.attr(option, "value") == Some(value)
                    || normalize_space(&self.dom.string_value(option)) == value
            });
            if !matched {
                return Err(StepError::not_found(
                    format!("Option \"{value}\""),
                    element.id.clone(),
                ));
            }
        }
        self.dom.set_attr(node, "value", value);
        self.call_history
            .push(format!("set_value:{}:{value}", element.id));
        Ok(())
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> StepResult<Option<String>> {
        self.check()?;
        let node = self.dom.resolve(element)?;
        Ok(self.dom.attr(node, name).map(str::to_string))
    }

    fn wait(&mut self, duration: Duration) {
        self.call_history
            .push(format!("wait:{}", duration.as_millis()));
    }

    fn visit(&mut self, path: &str) -> StepResult<()> {
        self.check()?;
        self.call_history.push(format!("visit:{path}"));
        self.current_url = path.to_string();
        Ok(())
    }

    fn is_javascript_enabled(&self) -> bool {
        self.javascript
    }
}

/// Activity rendered inside a [`SectionSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySpec {
    /// Display name
    pub name: String,
    /// Module type, e.g. `forum`
    pub modname: String,
    /// Rendered dimmed (hidden from students)
    pub hidden: bool,
}

impl ActivitySpec {
    /// Visible activity
    #[must_use]
    pub fn new(name: &str, modname: &str) -> Self {
        Self {
            name: name.to_string(),
            modname: modname.to_string(),
            hidden: false,
        }
    }

    /// Mark as hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Section rendered by [`CoursePage`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionSpec {
    /// Section number
    pub number: u32,
    /// Carries the `hidden` class
    pub hidden: bool,
    /// Highlighted as the current section
    pub highlighted: bool,
    /// Activities inside the section
    pub activities: Vec<ActivitySpec>,
}

impl SectionSpec {
    /// Visible, unhighlighted, empty section
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark highlighted
    #[must_use]
    pub const fn highlighted(mut self) -> Self {
        self.highlighted = true;
        self
    }

    /// Add an activity
    #[must_use]
    pub fn activity(mut self, activity: ActivitySpec) -> Self {
        self.activities.push(activity);
        self
    }
}

/// Builds course-page markup the way the course view renders it
#[derive(Debug, Clone)]
pub struct CoursePage {
    format: Option<String>,
    editing: Option<bool>,
    sections: Vec<SectionSpec>,
    add_menu: Vec<String>,
    chooser: Vec<String>,
    strings: CoreStrings,
}

impl CoursePage {
    /// Course page in the given format (`topics`, `weeks`, …), non-editor view
    #[must_use]
    pub fn new(format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            editing: None,
            sections: Vec::new(),
            add_menu: Vec::new(),
            chooser: Vec::new(),
            strings: CoreStrings::default(),
        }
    }

    /// A page that is not a course page
    #[must_use]
    pub fn non_course() -> Self {
        Self {
            format: None,
            ..Self::new("topics")
        }
    }

    /// Render the editor view; `on` is whether editing mode is currently on
    #[must_use]
    pub const fn editor(mut self, on: bool) -> Self {
        self.editing = Some(on);
        self
    }

    /// Add a section
    #[must_use]
    pub fn section(mut self, section: SectionSpec) -> Self {
        self.sections.push(section);
        self
    }

    /// Options offered by each section's non-javascript "add" menu
    #[must_use]
    pub fn add_menu(mut self, options: &[&str]) -> Self {
        self.add_menu = options.iter().map(ToString::to_string).collect();
        self
    }

    /// Module types offered by the javascript activity chooser
    #[must_use]
    pub fn chooser(mut self, types: &[&str]) -> Self {
        self.chooser = types.iter().map(ToString::to_string).collect();
        self
    }

    fn is_editor(&self) -> bool {
        self.editing.is_some()
    }

    fn format_component(&self) -> Option<String> {
        self.format.as_ref().map(|f| format!("format_{f}"))
    }

    fn icon_link(caption: &str, icon: &str) -> El {
        El::new("a")
            .attr("href", "#")
            .attr("title", caption)
            .child(
                El::new("img")
                    .attr("alt", caption)
                    .attr("src", &format!("/theme/image.php?image={icon}")),
            )
    }

    fn render_activity(&self, index: usize, activity: &ActivitySpec) -> El {
        let mut link = El::new("a")
            .attr("href", &format!("/mod/{}/view.php?id={index}", activity.modname))
            .child(El::new("span").class("instancename").text(&activity.name));
        if activity.hidden {
            link = link.class("dimmed");
        }
        let mut item = El::new("li")
            .id(&format!("module-{index}"))
            .class("activity")
            .class(&format!("modtype_{}", activity.modname))
            .child(El::new("div").class("activityinstance").child(link));
        if self.is_editor() {
            let (class, key, icon) = if activity.hidden {
                ("editing_show", "show", "t/show")
            } else {
                ("editing_hide", "hide", "t/hide")
            };
            item = item.child(
                Self::icon_link(&self.strings.localize(key, None), icon).class(class),
            );
        }
        item
    }

    fn render_section(&self, section: &SectionSpec, first_module: usize) -> El {
        let component = self.format_component();
        let mut content = El::new("div").class("content");
        if self.is_editor() || section.highlighted {
            content = content.child(if section.highlighted {
                Self::icon_link(&self.strings.localize("markedthistopic", None), "i/marked")
            } else {
                Self::icon_link(&self.strings.localize("markthistopic", None), "i/marker")
            });
        }
        if self.is_editor() {
            let (key, icon) = if section.hidden {
                ("showfromothers", "i/show")
            } else {
                ("hidefromothers", "i/hide")
            };
            content = content.child(Self::icon_link(
                &self.strings.localize(key, component.as_deref()),
                icon,
            ));
        }
        content = content.child(
            El::new("ul").class("section").children(
                section
                    .activities
                    .iter()
                    .enumerate()
                    .map(|(i, a)| self.render_activity(first_module + i, a)),
            ),
        );
        if self.is_editor() {
            content = content
                .child(
                    El::new("div").class("section_add_menus").child(
                        El::new("form")
                            .attr("action", "/course/jumpto.php")
                            .child(
                                El::new("select")
                                    .attr("name", "jump")
                                    .child(El::new("option").attr("value", "").text("Add an activity..."))
                                    .children(self.add_menu.iter().map(|option| {
                                        El::new("option").attr("value", option).text(option)
                                    })),
                            )
                            .child(El::new("input").attr("type", "submit").attr("value", "Go")),
                    ),
                )
                .child(
                    El::new("div").attr("class", "section-modchooser").child(
                        El::new("span").child(
                            El::new("a")
                                .attr("href", "#")
                                .text("Add an activity or resource"),
                        ),
                    ),
                );
        }
        let mut item = El::new("li")
            .id(&format!("section-{}", section.number))
            .class("section")
            .class("main");
        if section.hidden {
            item = item.class("hidden");
        }
        if section.highlighted {
            item = item.class("current");
        }
        item.child(content)
    }

    /// Render the page
    #[must_use]
    pub fn build(&self) -> El {
        let body_id = self
            .format
            .as_ref()
            .map_or_else(|| "page-site-index".to_string(), |f| format!("page-course-view-{f}"));
        let mut body = El::new("body").id(&body_id);
        if let Some(on) = self.editing {
            let key = if on { "turneditingoff" } else { "turneditingon" };
            body = body.child(
                El::new("form").child(
                    El::new("input")
                        .attr("type", "submit")
                        .attr("value", &self.strings.localize(key, None)),
                ),
            );
        }
        let mut first_module = 1;
        let mut sections = Vec::new();
        for section in &self.sections {
            sections.push(self.render_section(section, first_module));
            first_module += section.activities.len();
        }
        body = body.child(El::new("ul").class("topics").children(sections));
        if !self.chooser.is_empty() {
            body = body.child(
                El::new("div").id("chooseform").children(self.chooser.iter().map(|name| {
                    El::new("label")
                        .child(El::new("input").attr("type", "radio").attr("name", "jumplink"))
                        .child(El::new("span").class("typename").text(name))
                })),
            );
        }
        El::new("html").child(body)
    }

    /// Mock session over the rendered page
    #[must_use]
    pub fn session(&self) -> MockSession {
        MockSession::new(self.build())
    }
}
