//! Edge rules and their compilation from configuration.
//!
//! # Responsibilities
//! - Represent one predicate/action pair
//! - Compile the `[site]` section into an ordered rule list
//!
//! # Design Decisions
//! - Order is fixed: legacy aliases, trailing slash, blocked routes
//! - Every redirect is `301 Moved Permanently`
//! - Compiled once, immutable afterwards

use std::fmt;

use axum::http::StatusCode;

use crate::config::SiteConfig;
use crate::routing::matcher::{All, Any, ExactPath, Matcher, Not, PathContains, PathSuffix, Production};
use crate::routing::request::EdgeRequest;

/// Which family of rule produced a redirect. Used as a log field and
/// metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    LegacyAlias,
    TrailingSlash,
    BlockedRoute,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::LegacyAlias => "legacy_alias",
            RuleKind::TrailingSlash => "trailing_slash",
            RuleKind::BlockedRoute => "blocked_route",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a redirect points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A fixed path.
    Path(String),
    /// The request path with `/` appended.
    AppendSlash,
}

impl Target {
    pub fn resolve(&self, path: &str) -> String {
        match self {
            Target::Path(p) => p.clone(),
            Target::AppendSlash => format!("{path}/"),
        }
    }
}

/// What a rule does when its predicate matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Terminal: stop evaluation and redirect.
    Redirect { target: Target, status: StatusCode },
    /// Fall through to the next rule.
    Continue,
}

/// A predicate/action pair.
#[derive(Debug)]
pub struct Rule {
    kind: RuleKind,
    matcher: Box<dyn Matcher>,
    action: Action,
}

impl Rule {
    pub fn new(kind: RuleKind, matcher: impl Matcher + 'static, action: Action) -> Self {
        Self {
            kind,
            matcher: Box::new(matcher),
            action,
        }
    }

    /// A rule that permanently redirects to `target`.
    pub fn redirect(kind: RuleKind, matcher: impl Matcher + 'static, target: Target) -> Self {
        Self::new(
            kind,
            matcher,
            Action::Redirect {
                target,
                status: StatusCode::MOVED_PERMANENTLY,
            },
        )
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The action to take, or `None` when the predicate does not match.
    pub fn evaluate(&self, req: &EdgeRequest<'_>) -> Option<&Action> {
        self.matcher.matches(req).then_some(&self.action)
    }
}

/// The compiled, ordered rule chain plus the prefixes exempt from the
/// canonical link.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
    link_exempt: Any,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, link_exempt: Any) -> Self {
        Self { rules, link_exempt }
    }

    /// Compile a site configuration.
    pub fn from_site(site: &SiteConfig) -> Self {
        let mut rules = Vec::with_capacity(site.aliases.len() + 2);

        for alias in &site.aliases {
            rules.push(Rule::redirect(
                RuleKind::LegacyAlias,
                ExactPath::new(alias.from.as_str()),
                Target::Path(alias.to.clone()),
            ));
        }

        if site.trailing_slash {
            rules.push(Rule::redirect(
                RuleKind::TrailingSlash,
                All::new(vec![
                    Box::new(Not::new(PathSuffix::new("/"))),
                    Box::new(Not::new(PathContains::new("."))),
                    Box::new(Not::new(ExactPath::new("/"))),
                    Box::new(Not::new(Any::prefixes(&site.passthrough_prefixes))),
                ]),
                Target::AppendSlash,
            ));
        }

        if !site.blocked_prefixes.is_empty() || !site.blocked_paths.is_empty() {
            rules.push(Rule::redirect(
                RuleKind::BlockedRoute,
                All::new(vec![
                    Box::new(Production),
                    Box::new(Any::new(vec![
                        Box::new(Any::prefixes(&site.blocked_prefixes)),
                        Box::new(Any::paths(&site.blocked_paths)),
                    ])),
                ]),
                Target::Path(site.blocked_redirect.clone()),
            ));
        }

        Self::new(rules, Any::prefixes(&site.passthrough_prefixes))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `req` must not receive a canonical link.
    pub fn is_link_exempt(&self, req: &EdgeRequest<'_>) -> bool {
        self.link_exempt.matches(req)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}
