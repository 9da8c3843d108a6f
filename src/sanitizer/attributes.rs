// src/sanitizer/attributes.rs

use std::collections::HashSet;

use super::policy::Policy;
use super::url_policy::is_safe_url;

/// Value forced onto every retained `target`.
pub const TARGET_BLANK: &str = "_blank";
/// `rel` synthesized next to every retained `target`.
pub const REL_NOOPENER: &str = "noopener noreferrer";

/// A retained attribute. `value` is unescaped; escaping happens on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

/// Filters the attributes of an allowed element, in source order.
///
/// `tag` must be lowercase. Attribute values must already be entity-decoded.
/// When a name repeats, only its first occurrence is considered.
pub fn sanitize_attributes<'a, I>(policy: &Policy, tag: &str, attrs: I) -> Vec<Attribute>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<Attribute> = Vec::new();
    let mut has_target = false;

    for (raw_name, value) in attrs {
        let name = raw_name.to_ascii_lowercase();
        if !seen.insert(name.clone()) {
            continue;
        }

        if !policy.allows_attribute(tag, &name) {
            continue;
        }
        // Never allowlisted, enforced regardless of the table.
        if is_event_handler(&name) || name == "style" {
            continue;
        }

        match name.as_str() {
            "href" | "src" => {
                let url = value.trim();
                if is_safe_url(url, tag) {
                    kept.push(Attribute::new(&name, url));
                }
            }
            "target" => {
                kept.push(Attribute::new("target", TARGET_BLANK));
                has_target = true;
            }
            _ => kept.push(Attribute::new(&name, value.trim())),
        }
    }

    if has_target {
        kept.retain(|attr| attr.name != "rel");
        let at = kept
            .iter()
            .position(|attr| attr.name == "target")
            .map_or(kept.len(), |i| i + 1);
        kept.insert(at, Attribute::new("rel", REL_NOOPENER));
    }

    kept
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2 && name.as_bytes()[..2].eq_ignore_ascii_case(b"on")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tag: &str, attrs: &[(&str, &str)]) -> Vec<(String, String)> {
        sanitize_attributes(Policy::standard(), tag, attrs.iter().copied())
            .into_iter()
            .map(|a| (a.name, a.value))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn drops_attributes_outside_the_element_allowlist() {
        let out = run("p", &[("class", "x"), ("id", "y"), ("title", "t")]);
        assert!(out.is_empty());

        let out = run("img", &[("src", "/a.png"), ("onerror", "x()"), ("style", "a:b"), ("alt", "A")]);
        assert_eq!(out, pairs(&[("src", "/a.png"), ("alt", "A")]));
    }

    #[test]
    fn names_are_case_insensitive() {
        let out = run("a", &[("HREF", "https://example.com"), ("OnClick", "x()")]);
        assert_eq!(out, pairs(&[("href", "https://example.com")]));
    }

    #[test]
    fn unsafe_urls_are_dropped() {
        let out = run("a", &[("href", "javascript:alert(1)"), ("title", "t")]);
        assert_eq!(out, pairs(&[("title", "t")]));

        let out = run("a", &[("href", "data:text/html,x")]);
        assert!(out.is_empty());

        let out = run("img", &[("src", "data:image/png;base64,AAAA")]);
        assert_eq!(out, pairs(&[("src", "data:image/png;base64,AAAA")]));
    }

    #[test]
    fn urls_are_trimmed() {
        let out = run("a", &[("href", "  https://example.com/x \n")]);
        assert_eq!(out, pairs(&[("href", "https://example.com/x")]));
    }

    #[test]
    fn target_is_forced_blank_with_rel() {
        let out = run("a", &[("href", "https://example.com"), ("target", "_self")]);
        assert_eq!(
            out,
            pairs(&[
                ("href", "https://example.com"),
                ("target", "_blank"),
                ("rel", "noopener noreferrer"),
            ])
        );
    }

    #[test]
    fn synthesized_rel_replaces_author_rel() {
        let out = run("a", &[("rel", "opener"), ("target", "x"), ("title", "t")]);
        assert_eq!(
            out,
            pairs(&[("target", "_blank"), ("rel", "noopener noreferrer"), ("title", "t")])
        );

        let out = run("a", &[("rel", "nofollow")]);
        assert_eq!(out, pairs(&[("rel", "nofollow")]));
    }

    #[test]
    fn first_duplicate_wins() {
        let out = run("a", &[("href", "javascript:x"), ("href", "https://example.com")]);
        assert!(out.is_empty());

        let out = run("ol", &[("start", "3"), ("START", "9"), ("reversed", "")]);
        assert_eq!(out, pairs(&[("start", "3"), ("reversed", "")]));
    }

    #[test]
    fn event_handler_prefix() {
        assert!(is_event_handler("onclick"));
        assert!(is_event_handler("ONLOAD"));
        assert!(!is_event_handler("on"));
        assert!(!is_event_handler("alt"));
    }
}
