//! Edge routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, method, production flag, origin)
//!     → scope.rs (is the router invoked for this path?)
//!     → router.rs (evaluate rules in order, first match wins)
//!     → matcher.rs (literal path predicates)
//!     → Return: Redirect 301 or Continue + headers
//!
//! Rule Compilation (at startup and on reload):
//!     SiteConfig
//!     → rules.rs (aliases, trailing slash, blocked routes)
//!     → Freeze as immutable EdgeRouter
//! ```
//!
//! # Design Decisions
//! - Rules compiled from config, immutable at runtime
//! - No regex, plain prefix / suffix / substring tests
//! - Deterministic: same input always yields the same outcome
//! - First match wins; the default outcome is always reached otherwise

pub mod canonical;
pub mod matcher;
pub mod request;
pub mod router;
pub mod rules;
pub mod scope;

pub use canonical::{canonical_link, canonical_path, canonical_url};
pub use request::EdgeRequest;
pub use router::{route, EdgeRouter, Hop, Outcome, RedirectLoop, MAX_REDIRECT_HOPS};
pub use rules::{Action, Rule, RuleKind, RuleSet, Target};
pub use scope::InvocationScope;
