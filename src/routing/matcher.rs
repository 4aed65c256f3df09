//! Rule predicates.
//!
//! # Responsibilities
//! - Match the request path exactly, by prefix, by suffix or by substring
//! - Gate on deployment mode
//! - Combine conditions with AND / OR / NOT
//!
//! # Design Decisions
//! - Path tests are literal and case-sensitive
//! - Prefix tests are not segment-aware: `/apiary` starts with `/api`
//! - Empty `All` = always matches, empty `Any` = never matches
//! - No regex, every test is a plain string comparison

use crate::routing::request::EdgeRequest;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &EdgeRequest<'_>) -> bool;
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactPath {
    path: String,
}

impl ExactPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPath {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        req.path() == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefix {
    prefix: String,
}

impl PathPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefix {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        req.path().starts_with(&self.prefix)
    }
}

/// Matches the request path suffix.
#[derive(Debug, Clone)]
pub struct PathSuffix {
    suffix: String,
}

impl PathSuffix {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Matcher for PathSuffix {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        req.path().ends_with(&self.suffix)
    }
}

/// Matches when the needle occurs anywhere in the path.
#[derive(Debug, Clone)]
pub struct PathContains {
    needle: String,
}

impl PathContains {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl Matcher for PathContains {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        req.path().contains(self.needle.as_str())
    }
}

/// Matches only production deployments.
#[derive(Debug, Clone, Copy)]
pub struct Production;

impl Matcher for Production {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        req.is_production()
    }
}

/// Inverts a matcher.
#[derive(Debug)]
pub struct Not(Box<dyn Matcher>);

impl Not {
    pub fn new(inner: impl Matcher + 'static) -> Self {
        Self(Box::new(inner))
    }
}

impl Matcher for Not {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        !self.0.matches(req)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct All {
    matchers: Vec<Box<dyn Matcher>>,
}

impl All {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for All {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct Any {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Any {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// OR over literal path prefixes.
    pub fn prefixes<S: AsRef<str>>(prefixes: &[S]) -> Self {
        Self::new(
            prefixes
                .iter()
                .map(|p| Box::new(PathPrefix::new(p.as_ref())) as Box<dyn Matcher>)
                .collect(),
        )
    }

    /// OR over exact paths.
    pub fn paths<S: AsRef<str>>(paths: &[S]) -> Self {
        Self::new(
            paths
                .iter()
                .map(|p| Box::new(ExactPath::new(p.as_ref())) as Box<dyn Matcher>)
                .collect(),
        )
    }
}

impl Matcher for Any {
    fn matches(&self, req: &EdgeRequest<'_>) -> bool {
        self.matchers.iter().any(|m| m.matches(req))
    }
}
