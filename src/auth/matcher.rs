//! URL exclusion matchers
//!
//! A matcher decides whether a request URL (including `?query` when present)
//! bypasses authentication entirely. Matchers are pure: the same URL always
//! yields the same answer.

use std::str::FromStr;

use regex::Regex;

use super::error::ConfigError;

pub trait UrlPatternMatcher: Send + Sync {
    fn matches(&self, url: &str) -> bool;
}

/// Substring containment
#[derive(Debug, Clone)]
pub struct ContainsMatcher {
    pattern: String,
}

impl ContainsMatcher {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl UrlPatternMatcher for ContainsMatcher {
    fn matches(&self, url: &str) -> bool {
        url.contains(&self.pattern)
    }
}

/// Regular expression search (unanchored unless the pattern anchors itself)
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidIgnorePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }
}

impl UrlPatternMatcher for RegexMatcher {
    fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// Whole-URL equality
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    url: String,
}

impl ExactMatcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl UrlPatternMatcher for ExactMatcher {
    fn matches(&self, url: &str) -> bool {
        url == self.url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternKind {
    #[default]
    Contains,
    Regex,
    Exact,
}

impl FromStr for PatternKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CONTAINS" => Ok(PatternKind::Contains),
            "REGEX" => Ok(PatternKind::Regex),
            "EXACT" => Ok(PatternKind::Exact),
            other => Err(ConfigError::UnknownPatternType(other.to_string())),
        }
    }
}

/// Build the matcher for a configured pattern.
///
/// Regex patterns are compiled here so a bad pattern fails at startup.
pub fn build_matcher(
    kind: PatternKind,
    pattern: &str,
) -> Result<Box<dyn UrlPatternMatcher>, ConfigError> {
    Ok(match kind {
        PatternKind::Contains => Box::new(ContainsMatcher::new(pattern)),
        PatternKind::Regex => Box::new(RegexMatcher::new(pattern)?),
        PatternKind::Exact => Box::new(ExactMatcher::new(pattern)),
    })
}

/// Join a request URL and its query string the way matchers expect to see it
pub fn url_with_query(request_url: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{}?{}", request_url, q),
        None => request_url.to_string(),
    }
}
