// src/sanitizer/policy.rs

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Elements every policy retains.
const STRUCTURAL_ELEMENTS: &[&str] = &[
    "p", "br", "strong", "b", "em", "i", "u", "s", "blockquote", "pre", "code", "ul", "ol", "li",
    "a", "h1", "h2", "h3", "h4", "h5", "h6", "img",
];

/// Generic grouping elements some editors emit around pasted content.
/// They carry no attributes, but retaining them still widens what authors can
/// shape on the page, so `Policy::strict` unwraps them instead.
const CONTAINER_ELEMENTS: &[&str] = &["span", "div"];

/// Attributes permitted per element. Anything missing here is dropped.
const ELEMENT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target", "rel"]),
    ("img", &["src", "alt", "title", "width", "height", "loading"]),
    ("ol", &["start", "type", "reversed"]),
    ("li", &["value"]),
];

/// Elements that never get a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "img"];

static STANDARD: LazyLock<Policy> = LazyLock::new(|| Policy::build(true));
static STRICT: LazyLock<Policy> = LazyLock::new(|| Policy::build(false));

/// Allowlist of elements and, per element, the attributes kept on it.
///
/// Policies are built once per process and never mutated afterwards, so a
/// `&'static Policy` can be shared freely between threads.
#[derive(Debug)]
pub struct Policy {
    elements: HashSet<&'static str>,
    attributes: HashMap<&'static str, HashSet<&'static str>>,
}

impl Policy {
    /// The editor policy: structural markup plus `span`/`div` containers.
    pub fn standard() -> &'static Policy {
        &STANDARD
    }

    /// Same as `standard` without the generic containers.
    pub fn strict() -> &'static Policy {
        &STRICT
    }

    fn build(retain_containers: bool) -> Self {
        let mut elements: HashSet<&'static str> = STRUCTURAL_ELEMENTS.iter().copied().collect();
        if retain_containers {
            elements.extend(CONTAINER_ELEMENTS.iter().copied());
        }

        let attributes = ELEMENT_ATTRIBUTES
            .iter()
            .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
            .collect();

        Self {
            elements,
            attributes,
        }
    }

    /// `tag` must already be lowercase.
    pub fn allows_element(&self, tag: &str) -> bool {
        self.elements.contains(tag)
    }

    /// Whether `attr` may appear on `tag`. Both must already be lowercase.
    pub fn allows_attribute(&self, tag: &str, attr: &str) -> bool {
        self.allows_element(tag)
            && self
                .attributes
                .get(tag)
                .is_some_and(|allowed| allowed.contains(attr))
    }

    pub fn is_void(tag: &str) -> bool {
        VOID_ELEMENTS.contains(&tag)
    }

    pub fn elements(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.elements.iter().copied()
    }

    pub fn attributes_for(&self, tag: &str) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .get(tag)
            .into_iter()
            .flat_map(|allowed| allowed.iter().copied())
    }
}
