//! Composable XPath builder.
//!
//! Locators are built from steps and predicates instead of concatenated
//! strings, then rendered to XPath 1.0 for the driver. The structured form is
//! also what [`crate::mock::MockSession`] evaluates, so the rendered
//! expression and the in-memory matcher share a single definition.
//!
//! ```
//! use course_steps::XPath;
//!
//! let section = XPath::root().descendant("li").by_id("section-2");
//! assert_eq!(section.to_string(), "//li[@id='section-2']");
//! ```

use std::fmt;

/// Traversal axis of a path step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Any depth below the context node
    Descendant,
    /// Direct children
    Child,
    /// Direct parent
    Parent,
    /// Any ancestor
    Ancestor,
}

/// What kind of node a step selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// Any element
    Any,
    /// Element with this tag name
    Tag(String),
    /// `<button>` or a button-like `<input>`
    Button,
    /// `<a>` link
    Link,
    /// `<input>`, `<select>` or `<textarea>`
    Field,
}

impl NodeTest {
    fn from_tag(tag: &str) -> Self {
        if tag == "*" {
            Self::Any
        } else {
            Self::Tag(tag.to_ascii_lowercase())
        }
    }
}

/// Filter applied to the nodes selected by a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Attribute equals value
    AttrEquals {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Attribute contains substring
    AttrContains {
        /// Attribute name
        name: String,
        /// Substring
        needle: String,
    },
    /// Whitespace-separated class list contains the class
    Class(String),
    /// String value contains text
    Text(String),
    /// Named-selector match (id, caption, title, label) for buttons, links and fields
    Locator(String),
    /// Negation
    Not(Box<Predicate>),
}

/// One `axis::node[predicates]` segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    axis: Axis,
    node: NodeTest,
    predicates: Vec<Predicate>,
}

impl PathStep {
    /// Traversal axis
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Node test
    #[must_use]
    pub const fn node(&self) -> &NodeTest {
        &self.node
    }

    /// Predicates in application order
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }
}

/// A structural XPath query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    relative: bool,
    steps: Vec<PathStep>,
}

impl XPath {
    /// Query anchored at the document root
    #[must_use]
    pub const fn root() -> Self {
        Self {
            relative: false,
            steps: Vec::new(),
        }
    }

    /// Query evaluated against a scope element
    #[must_use]
    pub const fn scoped() -> Self {
        Self {
            relative: true,
            steps: Vec::new(),
        }
    }

    /// Whether the query is relative to a scope element
    #[must_use]
    pub const fn is_relative(&self) -> bool {
        self.relative
    }

    /// Steps in evaluation order
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    fn push(mut self, axis: Axis, node: NodeTest) -> Self {
        self.steps.push(PathStep {
            axis,
            node,
            predicates: Vec::new(),
        });
        self
    }

    /// Descendant elements with this tag (`*` for any)
    #[must_use]
    pub fn descendant(self, tag: &str) -> Self {
        self.push(Axis::Descendant, NodeTest::from_tag(tag))
    }

    /// Child elements with this tag
    #[must_use]
    pub fn child(self, tag: &str) -> Self {
        self.push(Axis::Child, NodeTest::from_tag(tag))
    }

    /// Parent element with this tag
    #[must_use]
    pub fn parent(self, tag: &str) -> Self {
        self.push(Axis::Parent, NodeTest::from_tag(tag))
    }

    /// Ancestor elements with this tag
    #[must_use]
    pub fn ancestor(self, tag: &str) -> Self {
        self.push(Axis::Ancestor, NodeTest::from_tag(tag))
    }

    /// Descendant button matching a caption, id or title
    #[must_use]
    pub fn button(self, locator: &str) -> Self {
        self.push(Axis::Descendant, NodeTest::Button)
            .with(Predicate::Locator(locator.to_string()))
    }

    /// Descendant link matching a caption, id, title or image alt text
    #[must_use]
    pub fn link(self, locator: &str) -> Self {
        self.push(Axis::Descendant, NodeTest::Link)
            .with(Predicate::Locator(locator.to_string()))
    }

    /// Descendant form field matching an id, name or label text
    #[must_use]
    pub fn field(self, locator: &str) -> Self {
        self.push(Axis::Descendant, NodeTest::Field)
            .with(Predicate::Locator(locator.to_string()))
    }

    /// Add a predicate to the last step
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        if self.steps.is_empty() {
            self = self.descendant("*");
        }
        if let Some(step) = self.steps.last_mut() {
            step.predicates.push(predicate);
        }
        self
    }

    /// `[@id='…']`
    #[must_use]
    pub fn by_id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// `[@name='…']`
    #[must_use]
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.with(Predicate::AttrEquals {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// `[contains(@name, '…')]`
    #[must_use]
    pub fn attr_contains(self, name: &str, needle: &str) -> Self {
        self.with(Predicate::AttrContains {
            name: name.to_string(),
            needle: needle.to_string(),
        })
    }

    /// Class-list membership
    #[must_use]
    pub fn with_class(self, class: &str) -> Self {
        self.with(Predicate::Class(class.to_string()))
    }

    /// Negated class-list membership
    #[must_use]
    pub fn without_class(self, class: &str) -> Self {
        self.with(Predicate::Not(Box::new(Predicate::Class(class.to_string()))))
    }

    /// `[contains(., '…')]`
    #[must_use]
    pub fn containing_text(self, text: &str) -> Self {
        self.with(Predicate::Text(text.to_string()))
    }

    /// Descendant element of `tag` carrying `class`
    #[must_use]
    pub fn descendant_with_class(self, tag: &str, class: &str) -> Self {
        self.descendant(tag).with_class(class)
    }

    /// Render to an XPath 1.0 expression
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.relative {
            out.push('.');
        }
        for (index, step) in self.steps.iter().enumerate() {
            match step.axis {
                Axis::Descendant if index == 0 && !self.relative => out.push_str("//"),
                Axis::Descendant => out.push_str("/descendant::"),
                Axis::Child => out.push('/'),
                Axis::Parent => out.push_str("/parent::"),
                Axis::Ancestor => out.push_str("/ancestor::"),
            }
            out.push_str(&render_node(&step.node));
            for predicate in &step.predicates {
                out.push('[');
                out.push_str(&render_predicate(predicate, &step.node));
                out.push(']');
            }
        }
        out
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn render_node(node: &NodeTest) -> String {
    match node {
        NodeTest::Any => "*".to_string(),
        NodeTest::Tag(tag) => tag.clone(),
        NodeTest::Button => "*[self::button or self::input[@type='submit' or @type='button' or @type='reset' or @type='image']]".to_string(),
        NodeTest::Link => "a".to_string(),
        NodeTest::Field => "*[self::input or self::select or self::textarea]".to_string(),
    }
}

fn render_predicate(predicate: &Predicate, node: &NodeTest) -> String {
    match predicate {
        Predicate::AttrEquals { name, value } => format!("@{name}={}", literal(value)),
        Predicate::AttrContains { name, needle } => {
            format!("contains(@{name}, {})", literal(needle))
        }
        Predicate::Class(class) => format!(
            "contains(concat(' ', normalize-space(@class), ' '), {})",
            literal(&format!(" {class} "))
        ),
        Predicate::Text(text) => format!("contains(., {})", literal(text)),
        Predicate::Locator(locator) => {
            let l = literal(locator);
            let text = format!("contains(normalize-space(string(.)), {l})");
            match node {
                NodeTest::Button => format!(
                    "@id={l} or @name={l} or contains(@value, {l}) or contains(@title, {l}) or {text}"
                ),
                NodeTest::Link => format!(
                    "@id={l} or contains(@title, {l}) or {text} or ./descendant::img[contains(@alt, {l})]"
                ),
                NodeTest::Field => format!(
                    "@id={l} or @name={l} or contains(@placeholder, {l}) or @id=//label[contains(normalize-space(string(.)), {l})]/@for"
                ),
                NodeTest::Any | NodeTest::Tag(_) => format!("@id={l} or {text}"),
            }
        }
        Predicate::Not(inner) => format!("not({})", render_predicate(inner, node)),
    }
}

/// Quote a string as an XPath literal, using `concat()` when it holds both quote kinds
#[must_use]
pub fn literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Capitalise the first character, leaving the rest untouched
#[must_use]
pub fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
