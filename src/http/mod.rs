//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, limits)
//!     → middleware/edge.rs (scope check, rule chain)
//!         → Redirect: response.rs builds the 301
//!         → Continue: server.rs forwards upstream, edge headers merged
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{EdgeRequestId, X_REQUEST_ID};
pub use server::HttpServer;
