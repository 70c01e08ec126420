use serde::{Deserialize, Serialize};
use std::fmt;

/// Collapse whitespace runs to single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text condition applied to a node's visible text.
///
/// Matching is case-insensitive and ignores whitespace layout: both sides are
/// whitespace-normalized and lower-cased before comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextMatch {
    Contains(String),
    Equals(String),
}

impl TextMatch {
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_whitespace(text).to_lowercase();
        match self {
            TextMatch::Contains(needle) => text.contains(needle.as_str()),
            TextMatch::Equals(expected) => text == *expected,
        }
    }

    /// Mode name and needle as passed to injected scripts
    pub fn as_js_args(&self) -> (&'static str, &str) {
        match self {
            TextMatch::Contains(v) => ("contains", v),
            TextMatch::Equals(v) => ("equals", v),
        }
    }
}

/// One way of locating nodes: a CSS selector, optionally narrowed by text.
///
/// A list of queries forms a fallback chain; see [`crate::scrapers::locator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub css: String,
    pub text: Option<TextMatch>,
}

impl Query {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            text: None,
        }
    }

    /// Nodes matching `css` whose text contains `needle`
    pub fn containing(css: impl Into<String>, needle: &str) -> Self {
        Self {
            css: css.into(),
            text: Some(TextMatch::Contains(normalize_whitespace(needle).to_lowercase())),
        }
    }

    /// Nodes matching `css` whose whole text equals `expected`
    pub fn with_text(css: impl Into<String>, expected: &str) -> Self {
        Self {
            css: css.into(),
            text: Some(TextMatch::Equals(normalize_whitespace(expected).to_lowercase())),
        }
    }

    pub fn matches_text(&self, text: &str) -> bool {
        self.text.as_ref().map_or(true, |m| m.matches(text))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            None => write!(f, "{}", self.css),
            Some(TextMatch::Contains(v)) => write!(f, "{} ~ \"{}\"", self.css, v),
            Some(TextMatch::Equals(v)) => write!(f, "{} = \"{}\"", self.css, v),
        }
    }
}
