// src/sanitizer/tree.rs

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{LocalName, Namespace, ParseOpts, QualName, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::attributes::sanitize_attributes;
use super::node::{RetainedNode, serialize};
use super::policy::Policy;
use super::{Strategy, StructuralFilter};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements removed together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &["script", "style", "template"];

/// Upper bound on re-filtering the filter's own output.
const MAX_PASSES: usize = 4;

/// DOM-based filter: parses the markup as a `<body>` fragment, then rebuilds
/// it from allowed elements only. Disallowed elements are unwrapped so their
/// children take their place.
pub struct TreeFilter {
    policy: &'static Policy,
    max_depth: usize,
}

impl TreeFilter {
    pub fn new(policy: &'static Policy, max_depth: usize) -> Self {
        Self { policy, max_depth }
    }

    fn pass(&self, html: &str) -> String {
        let dom = parse(html);
        let root = fragment_root(&dom.document);

        let mut nodes = Vec::new();
        self.filter_children(&root, 0, &mut nodes);
        serialize(&nodes)
    }

    fn filter_children(&self, parent: &Handle, depth: usize, out: &mut Vec<RetainedNode>) {
        for child in parent.children.borrow().iter() {
            self.filter_node(child, depth, out);
        }
    }

    fn filter_node(&self, node: &Handle, depth: usize, out: &mut Vec<RetainedNode>) {
        let NodeData::Element { name, attrs, .. } = &node.data else {
            if let NodeData::Text { contents } = &node.data {
                push_text(out, &contents.borrow());
            }
            // Comments, doctypes and processing instructions are dropped.
            return;
        };

        let tag = name.local.to_string().to_ascii_lowercase();
        let is_html = &*name.ns == HTML_NAMESPACE;

        if is_html && DROPPED_WITH_CONTENT.contains(&tag.as_str()) {
            return;
        }

        if depth >= self.max_depth {
            tracing::trace!("Sanitizer nesting ceiling reached at <{}>, flattening to text", tag);
            push_text(out, &text_content(node));
            return;
        }

        if !is_html || !self.policy.allows_element(&tag) {
            self.filter_children(node, depth + 1, out);
            return;
        }

        let attrs = {
            let attrs = attrs.borrow();
            sanitize_attributes(
                self.policy,
                &tag,
                attrs.iter().map(|a| (&*a.name.local, &*a.value)),
            )
        };
        let mut children = Vec::new();
        self.filter_children(node, depth + 1, &mut children);

        out.push(RetainedNode::Element {
            tag,
            attrs,
            children,
        });
    }
}

impl StructuralFilter for TreeFilter {
    fn strategy(&self) -> Strategy {
        Strategy::Tree
    }

    /// Unwrapping can leave nesting the parser itself would rearrange (a `<p>`
    /// promoted into another `<p>`), so the output is filtered again until it
    /// reaches a fixed point.
    fn filter(&self, html: &str) -> String {
        let mut current = self.pass(html);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

fn parse(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            // Parse <noscript> content as markup, the way the token filter sees it.
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let context = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body"));
    parse_fragment(RcDom::default(), opts, context, Vec::new()).one(html)
}

/// Fragment parsing puts the content under a synthetic `<html>` element.
fn fragment_root(document: &Handle) -> Handle {
    let children = document.children.borrow();
    children
        .iter()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .unwrap_or_else(|| document.clone())
}

fn push_text(out: &mut Vec<RetainedNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(RetainedNode::Text(prev)) => prev.push_str(text),
        _ => out.push(RetainedNode::Text(text.to_owned())),
    }
}

/// Concatenated text of a subtree, without recursion.
fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    let mut stack = vec![node.clone()];

    while let Some(current) = stack.pop() {
        match &current.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            NodeData::Element { name, .. }
                if DROPPED_WITH_CONTENT.contains(&&*name.local) => {}
            _ => stack.extend(current.children.borrow().iter().rev().cloned()),
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(html: &str) -> String {
        TreeFilter::new(Policy::standard(), 128).filter(html)
    }

    #[test]
    fn unwraps_disallowed_containers() {
        assert_eq!(
            filter(r#"<div class="x"><unknownTag>Hello</unknownTag></div>"#),
            "<div>Hello</div>"
        );
        assert_eq!(
            filter("<section><p>kept <em>here</em></p></section>"),
            "<p>kept <em>here</em></p>"
        );
    }

    #[test]
    fn leftover_script_is_removed_with_content() {
        assert_eq!(filter("<p>a</p><script>alert(1)"), "<p>a</p>");
        assert_eq!(filter("<p>a<style>p{}</style>b</p>"), "<p>ab</p>");
    }

    #[test]
    fn foreign_content_is_unwrapped() {
        assert_eq!(
            filter(r#"<svg><a href="https://example.com">x</a></svg>"#),
            "x"
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(filter("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        assert_eq!(filter("  <b>x</b> "), "  <b>x</b> ");
    }

    #[test]
    fn deep_nesting_is_flattened() {
        let filter = TreeFilter::new(Policy::standard(), 3);
        assert_eq!(
            filter.filter("<div><div><div><div><b>deep</b> text</div></div></div></div>"),
            "<div><div><div>deep text</div></div></div>"
        );
    }

    #[test]
    fn promoted_paragraphs_settle() {
        let out = filter("<p>a<table><tr><td><p>b</p></td></tr></table></p>");
        assert_eq!(filter(&out), out);
        assert!(out.contains('a') && out.contains('b'));
    }
}
