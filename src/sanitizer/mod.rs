// src/sanitizer/mod.rs

//! HTML sanitization for author-supplied post content.
//!
//! Raw editor markup goes through three stages:
//!
//! 1. [`prefilter`] drops comments and `<script>`/`<style>` blocks outright.
//! 2. A [`StructuralFilter`] walks what is left, keeping allowlisted elements
//!    (see [`policy`]), unwrapping everything else and passing each kept
//!    element's attributes through [`attributes`].
//! 3. The result is normalised (script schemes neutralised, outer whitespace
//!    trimmed).
//!
//! Two structural filters exist. The tree filter builds a DOM with
//! `html5ever` and is compiled in with the `tree-parser` feature; the token
//! filter scans tags one at a time and needs nothing but regexes. Both apply
//! the same policy and produce the same output for well-formed markup.
//!
//! Sanitizing never fails: whatever the input, the caller gets markup that is
//! safe to render.

pub mod attributes;
pub mod escape;
pub mod node;
pub mod policy;
pub mod prefilter;
pub mod token;
#[cfg(feature = "tree-parser")]
pub mod tree;
pub mod url_policy;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::Serialize;

use self::escape::neutralize_script_schemes;
use self::policy::Policy;
use self::token::TokenFilter;

/// Default recursion ceiling for the tree filter.
pub const DEFAULT_MAX_DEPTH: usize = 128;

static DEFAULT_SANITIZER: LazyLock<Sanitizer> =
    LazyLock::new(|| Sanitizer::new(&SanitizerOptions::default()));

/// Sanitizes `raw` with the default options.
pub fn sanitize(raw: &str) -> String {
    DEFAULT_SANITIZER.sanitize(raw)
}

/// Walks pre-filtered markup and enforces the element/attribute policy.
pub trait StructuralFilter: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// `html` has already been through the pre-filter. The returned markup
    /// contains only allowed elements and attributes.
    fn filter(&self, html: &str) -> String;
}

/// Which structural filter is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Tree,
    Token,
}

impl Strategy {
    /// The tree filter when an HTML parser is compiled in, the token filter
    /// otherwise.
    pub fn detect() -> Self {
        if cfg!(feature = "tree-parser") {
            Strategy::Tree
        } else {
            Strategy::Token
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Tree => "tree",
            Strategy::Token => "token",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy requested through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyPreference {
    #[default]
    Auto,
    Tree,
    Token,
}

impl FromStr for StrategyPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(StrategyPreference::Auto),
            "tree" | "dom" => Ok(StrategyPreference::Tree),
            "token" | "regex" => Ok(StrategyPreference::Token),
            other => Err(format!("unknown sanitizer strategy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SanitizerOptions {
    pub strategy: StrategyPreference,
    /// Element nesting below this depth is flattened to text (tree filter).
    pub max_depth: usize,
    /// Keep `span`/`div` wrappers instead of unwrapping them.
    pub retain_containers: bool,
}

impl Default for SanitizerOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyPreference::Auto,
            max_depth: DEFAULT_MAX_DEPTH,
            retain_containers: true,
        }
    }
}

impl SanitizerOptions {
    pub fn policy(&self) -> &'static Policy {
        if self.retain_containers {
            Policy::standard()
        } else {
            Policy::strict()
        }
    }
}

/// Entry point. Cheap to share: holds a static policy and the chosen filter.
pub struct Sanitizer {
    filter: Box<dyn StructuralFilter>,
}

impl Sanitizer {
    pub fn new(options: &SanitizerOptions) -> Self {
        let strategy = match options.strategy {
            StrategyPreference::Auto => Strategy::detect(),
            StrategyPreference::Token => Strategy::Token,
            StrategyPreference::Tree if Strategy::detect() == Strategy::Tree => Strategy::Tree,
            StrategyPreference::Tree => {
                tracing::warn!("Tree sanitizer requested but no HTML parser is compiled in, using token scanner");
                Strategy::Token
            }
        };
        Self::with_strategy(strategy, options)
    }

    /// Builds a sanitizer around a specific filter. Requesting `Tree` without
    /// the `tree-parser` feature yields the token filter.
    pub fn with_strategy(strategy: Strategy, options: &SanitizerOptions) -> Self {
        let policy = options.policy();
        let filter: Box<dyn StructuralFilter> = match strategy {
            #[cfg(feature = "tree-parser")]
            Strategy::Tree => Box::new(tree::TreeFilter::new(policy, options.max_depth)),
            _ => Box::new(TokenFilter::new(policy)),
        };
        tracing::debug!("HTML sanitizer using {} strategy", filter.strategy());

        Self { filter }
    }

    pub fn strategy(&self) -> Strategy {
        self.filter.strategy()
    }

    /// Returns markup that is safe to inject into a page. Never fails.
    pub fn sanitize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let cleaned = prefilter::strip_dangerous_blocks(raw);
        let out = self.filter.filter(&cleaned);

        neutralize_script_schemes(out.trim()).into_owned()
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("strategy", &self.strategy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_sanitizer() -> Sanitizer {
        Sanitizer::with_strategy(Strategy::Token, &SanitizerOptions::default())
    }

    #[test]
    fn empty_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(token_sanitizer().sanitize(""), "");
    }

    #[test]
    fn preference_parsing() {
        assert_eq!("AUTO".parse(), Ok(StrategyPreference::Auto));
        assert_eq!(" tree ".parse(), Ok(StrategyPreference::Tree));
        assert_eq!("token".parse(), Ok(StrategyPreference::Token));
        assert!("xml".parse::<StrategyPreference>().is_err());
    }

    #[test]
    fn auto_detects_compiled_parser() {
        let sanitizer = Sanitizer::new(&SanitizerOptions::default());
        assert_eq!(sanitizer.strategy(), Strategy::detect());

        let forced = Sanitizer::new(&SanitizerOptions {
            strategy: StrategyPreference::Token,
            ..SanitizerOptions::default()
        });
        assert_eq!(forced.strategy(), Strategy::Token);
    }

    #[test]
    fn long_input_keeps_late_markup() {
        let input = format!("<p>{}</p><strong>end</strong>", "a".repeat(64 * 1024));
        let out = token_sanitizer().sanitize(&input);
        assert_eq!(out, input);
        assert_eq!(token_sanitizer().sanitize(&out), out);
    }

    #[test]
    fn output_is_trimmed() {
        assert_eq!(token_sanitizer().sanitize("  <p>x</p>\n"), "<p>x</p>");
    }
}
