//! Rewrite targets and their substitution rules.

use regex::Regex;

use crate::matcher::NameMatcher;

/// One substitution: find a related asset by name, replace a placeholder with it.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Matched against asset names to find the related asset.
    pub source: Regex,
    /// Matched against target content; every match is replaced.
    pub placeholder: Regex,
}

impl Rule {
    /// Create a rule from compiled patterns.
    #[must_use]
    pub fn new(source: Regex, placeholder: Regex) -> Self {
        Self {
            source,
            placeholder,
        }
    }

    /// Compile a rule from pattern strings.
    pub fn parse(source: &str, placeholder: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(Regex::new(source)?, Regex::new(placeholder)?))
    }
}

/// A set of assets to rewrite and the rules applied to each of them.
#[derive(Debug, Clone)]
pub struct TargetSpec {
    /// Which assets to rewrite.
    pub matcher: NameMatcher,
    /// Substitute only the final path segment of the related asset name.
    pub basename_only: bool,
    /// Rules in application order.
    pub rules: Vec<Rule>,
}

impl TargetSpec {
    /// Create a target for any matcher with no rules.
    #[must_use]
    pub fn new(matcher: impl Into<NameMatcher>) -> Self {
        Self {
            matcher: matcher.into(),
            basename_only: false,
            rules: Vec::new(),
        }
    }

    /// Target exactly one asset name.
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self::new(NameMatcher::Exact(name.into()))
    }

    /// Target every asset name matching `regex`.
    #[must_use]
    pub fn pattern(regex: Regex) -> Self {
        Self::new(NameMatcher::Pattern(regex))
    }

    /// Set whether resolved names are reduced to their basename.
    #[must_use]
    pub fn basename_only(mut self, enabled: bool) -> Self {
        self.basename_only = enabled;
        self
    }

    /// Append a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}
