// src/sanitizer/url_policy.rs

use url::Url;

/// Decides whether `value` may be used as an `href`/`src` on `tag`.
///
/// Accepted: same-page fragments, root-relative paths, inline `data:image/`
/// payloads on `<img>`, and absolute `http`/`https` URLs. Everything else,
/// including values that do not parse as a URL, is rejected.
pub fn is_safe_url(value: &str, tag: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    if value.starts_with('#') || value.starts_with('/') {
        return true;
    }
    if tag == "img" && value.starts_with("data:image/") {
        return true;
    }

    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
