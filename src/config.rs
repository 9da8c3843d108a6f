// src/config.rs

use std::env;
use std::str::FromStr;

use crate::sanitizer::{DEFAULT_MAX_DEPTH, SanitizerOptions, StrategyPreference};

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means posts live in memory for the lifetime of the process.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub port: u16,
    pub sanitizer: SanitizerOptions,
}

impl Config {
    /// Reads the environment. `.env` is loaded once by `main` beforehand.
    /// Missing or unparsable optional values fall back to their defaults.
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let sanitizer = SanitizerOptions {
            strategy: parse_var("SANITIZER_STRATEGY", StrategyPreference::Auto),
            max_depth: parse_var("SANITIZER_MAX_DEPTH", DEFAULT_MAX_DEPTH).max(1),
            retain_containers: parse_var("SANITIZER_RETAIN_CONTAINERS", true),
        };

        Self {
            database_url,
            rust_log,
            port: parse_var("PORT", 3000),
            sanitizer,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns its variable names; tests run in parallel.

    #[test]
    fn unset_variable_uses_default() {
        assert_eq!(parse_var("BLOG_CONFIG_TEST_UNSET", 42usize), 42);
    }

    #[test]
    fn values_are_trimmed_and_parsed() {
        unsafe { env::set_var("BLOG_CONFIG_TEST_DEPTH", " 64 ") };
        assert_eq!(parse_var("BLOG_CONFIG_TEST_DEPTH", DEFAULT_MAX_DEPTH), 64);

        unsafe { env::set_var("BLOG_CONFIG_TEST_STRATEGY", "token") };
        assert_eq!(
            parse_var("BLOG_CONFIG_TEST_STRATEGY", StrategyPreference::Auto),
            StrategyPreference::Token
        );
    }

    #[test]
    fn unparsable_value_falls_back() {
        unsafe { env::set_var("BLOG_CONFIG_TEST_PORT", "not-a-port") };
        assert_eq!(parse_var("BLOG_CONFIG_TEST_PORT", 3000u16), 3000);
    }
}
