//! Asset name matching.

use regex::Regex;

/// Selects asset names either literally or by regular expression.
///
/// Patterns use search semantics: `main.*\.js` matches `js/main-abc.js`
/// unless the pattern is anchored.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Matches exactly one name.
    Exact(String),
    /// Matches every name the regex finds a match in.
    Pattern(Regex),
}

impl NameMatcher {
    /// Check whether `name` is selected.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == name,
            Self::Pattern(regex) => regex.is_match(name),
        }
    }
}

impl std::fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(name) => write!(f, "\"{name}\""),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<Regex> for NameMatcher {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

impl From<&str> for NameMatcher {
    fn from(name: &str) -> Self {
        Self::Exact(name.to_owned())
    }
}

impl From<String> for NameMatcher {
    fn from(name: String) -> Self {
        Self::Exact(name)
    }
}

/// Final path segment of an asset name.
///
/// Both `/` and `\` count as separators so names produced on Windows hosts
/// reduce the same way.
#[must_use]
pub fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
