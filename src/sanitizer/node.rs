// src/sanitizer/node.rs

use super::attributes::Attribute;
use super::escape::{escape_attribute, escape_text};
use super::policy::Policy;

/// Output of the tree strategy, built fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetainedNode {
    Element {
        /// Lowercase, always an allowed element name.
        tag: String,
        attrs: Vec<Attribute>,
        children: Vec<RetainedNode>,
    },
    /// Unescaped character data.
    Text(String),
}

impl RetainedNode {
    pub fn write(&self, out: &mut String) {
        match self {
            RetainedNode::Text(text) => escape_text(out, text),
            RetainedNode::Element {
                tag,
                attrs,
                children,
            } => {
                write_start_tag(out, tag, attrs);
                if Policy::is_void(tag) {
                    return;
                }
                for child in children {
                    child.write(out);
                }
                write_end_tag(out, tag);
            }
        }
    }
}

pub fn serialize(nodes: &[RetainedNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write(&mut out);
    }
    out
}

/// `<tag name="value" ...>`; values are escaped here.
pub fn write_start_tag(out: &mut String, tag: &str, attrs: &[Attribute]) {
    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_attribute(out, &attr.value);
        out.push('"');
    }
    out.push('>');
}

pub fn write_end_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
