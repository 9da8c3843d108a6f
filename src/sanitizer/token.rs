// src/sanitizer/token.rs

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;

use super::attributes::sanitize_attributes;
use super::escape::escape_text;
use super::node::{write_end_tag, write_start_tag};
use super::policy::Policy;
use super::{Strategy, StructuralFilter};

/// One tag or markup declaration. Quoted attribute values may contain `>`.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"<(?:(?P<decl>[!?][^>]*|/(?:[^A-Za-z>][^>]*)?)|(?P<close>/)?(?P<name>[A-Za-z][^\s/>]*)(?P<attrs>(?:[^>"']|"[^"]*"|'[^']*')*))>"#,
    )
});

/// `name`, `name=value`, `name="value"` or `name='value'`.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"(?P<name>[^\s"'>/=]+)(?:\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"']\S*)))?"#)
});

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid tag pattern {pattern}: {e}"))
}

/// Tag-at-a-time filter for environments without an HTML parser.
///
/// Every recognised tag is either re-serialized from its filtered attributes
/// or dropped on its own; the text around it is kept. Without a tree there is
/// no notion of a disallowed container, so its content simply stays in place.
pub struct TokenFilter {
    policy: &'static Policy,
}

impl TokenFilter {
    pub fn new(policy: &'static Policy) -> Self {
        Self { policy }
    }

    fn write_tag(&self, out: &mut String, closing: bool, name: &str, attrs: &str) {
        let tag = name.to_ascii_lowercase();
        if !self.policy.allows_element(&tag) {
            return;
        }

        if closing {
            // Browsers read `</br>` as a line break; other void end tags are ignored.
            if tag == "br" {
                write_start_tag(out, &tag, &[]);
            } else if !Policy::is_void(&tag) {
                write_end_tag(out, &tag);
            }
            return;
        }

        let parsed = parse_attributes(attrs);
        let kept = sanitize_attributes(
            self.policy,
            &tag,
            parsed.iter().map(|(n, v)| (n.as_str(), v.as_str())),
        );
        write_start_tag(out, &tag, &kept);
    }
}

impl StructuralFilter for TokenFilter {
    fn strategy(&self) -> Strategy {
        Strategy::Token
    }

    fn filter(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut last = 0;

        for caps in TAG.captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            write_text(&mut out, &html[last..whole.start()]);
            last = whole.end();

            // Declarations, processing instructions and bogus end tags vanish.
            if caps.name("decl").is_some() {
                continue;
            }
            if let Some(name) = caps.name("name") {
                let attrs = caps.name("attrs").map_or("", |m| m.as_str());
                self.write_tag(&mut out, caps.name("close").is_some(), name.as_str(), attrs);
            }
        }
        write_text(&mut out, &html[last..]);

        out
    }
}

fn write_text(out: &mut String, raw: &str) {
    if !raw.is_empty() {
        escape_text(out, &decode_html_entities(raw));
    }
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.name("name")?.as_str().to_ascii_lowercase();
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .map_or("", |m| m.as_str());
            Some((name, decode_html_entities(value).into_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(html: &str) -> String {
        TokenFilter::new(Policy::standard()).filter(html)
    }

    #[test]
    fn allowed_tags_are_canonicalised() {
        assert_eq!(filter("<P>Hi <STRONG>there</Strong></p>"), "<p>Hi <strong>there</strong></p>");
    }

    #[test]
    fn disallowed_tags_are_dropped_one_at_a_time() {
        assert_eq!(
            filter(r#"<div class="x"><unknownTag>Hello</unknownTag></div>"#),
            "<div>Hello</div>"
        );
        assert_eq!(
            filter("<section><p>kept</p><iframe src=x></iframe></section>"),
            "<p>kept</p>"
        );
    }

    #[test]
    fn attributes_are_filtered() {
        assert_eq!(
            filter(r#"<a href="https://example.com" target=_self onclick="x()">x</a>"#),
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">x</a>"#
        );
        assert_eq!(filter(r#"<img src='javascript:x' alt=pic onerror=alert(1)>"#), r#"<img alt="pic">"#);
    }

    #[test]
    fn quoted_values_may_contain_angle_brackets() {
        assert_eq!(
            filter(r#"<a title="a > b" href="/x">link</a>"#),
            r#"<a title="a &gt; b" href="/x">link</a>"#
        );
    }

    #[test]
    fn entities_are_normalised() {
        assert_eq!(filter("Tom &amp; Jerry &lt;3 &copy;"), "Tom &amp; Jerry &lt;3 ©");
        assert_eq!(filter("a & b < c"), "a &amp; b &lt; c");
        assert_eq!(
            filter(r#"<a title="&quot;q&quot; &amp; a">x</a>"#),
            r#"<a title="&quot;q&quot; &amp; a">x</a>"#
        );
    }

    #[test]
    fn void_elements() {
        assert_eq!(filter("a<br/>b<BR>c</br>d"), "a<br>b<br>c<br>d");
        assert_eq!(filter(r#"<img src="/a.png" /></img>"#), r#"<img src="/a.png">"#);
    }

    #[test]
    fn declarations_and_bogus_tags() {
        assert_eq!(filter("<!DOCTYPE html><?xml version=\"1.0\"?><p>x</p></3>"), "<p>x</p>");
        assert_eq!(filter("1 <3 you"), "1 &lt;3 you");
    }

    #[test]
    fn leftover_script_tag_loses_its_markup() {
        assert_eq!(filter("<script>alert(1)"), "alert(1)");
        assert_eq!(filter("<ScRiPt src=//evil>"), "");
    }

    #[test]
    fn unterminated_tag_is_text() {
        assert_eq!(filter("<p>a<b"), "<p>a&lt;b");
    }
}
