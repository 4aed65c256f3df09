//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, EDGE_ENV / EDGE_ORIGIN overrides)
//!     → validation.rs (semantic checks, redirect-loop detection)
//!     → EdgeConfig (validated, immutable)
//!
//! On reload (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → HTTP server recompiles the rules and swaps them atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Only `[site]` is hot-reloadable; listener and upstream need a restart

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AliasConfig, EdgeConfig, ListenerConfig, LogFormat, ObservabilityConfig, SiteConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use validation::ValidationError;
