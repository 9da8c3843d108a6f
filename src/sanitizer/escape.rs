// src/sanitizer/escape.rs

use std::borrow::Cow;
use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute_to_string, encode_text_to_string};
use regex::Regex;

static SCRIPT_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:java|vb)script):")
        .unwrap_or_else(|e| panic!("invalid scheme pattern: {e}"))
});

/// Escapes character data for output between tags.
pub fn escape_text(out: &mut String, text: &str) {
    encode_with_nbsp(out, text, |segment, out| {
        encode_text_to_string(segment, out);
    });
}

/// Escapes a value for output inside a double-quoted attribute.
pub fn escape_attribute(out: &mut String, value: &str) {
    encode_with_nbsp(out, value, |segment, out| {
        encode_double_quoted_attribute_to_string(segment, out);
    });
}

/// Non-breaking spaces are written as `&nbsp;` so they survive editing as
/// source.
fn encode_with_nbsp(out: &mut String, value: &str, encode: impl Fn(&str, &mut String)) {
    let mut segments = value.split('\u{a0}');
    if let Some(first) = segments.next() {
        encode(first, out);
    }
    for segment in segments {
        out.push_str("&nbsp;");
        encode(segment, out);
    }
}

/// Rewrites literal `javascript:` / `vbscript:` sequences left in text or
/// attribute values so the colon is a character reference. The rendered text
/// is unchanged, but the output never spells out a script scheme.
pub fn neutralize_script_schemes(html: &str) -> Cow<'_, str> {
    SCRIPT_SCHEME.replace_all(html, "$1&#58;")
}
