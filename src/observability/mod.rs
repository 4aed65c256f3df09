//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Edge middleware and upstream forwarding produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (path, rule, location, request id) on every event
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
