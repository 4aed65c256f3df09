//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Pass-through response:
//!     → headers.rs (security headers + canonical link merged in)
//!     → Send to client
//! ```

pub mod headers;

pub use headers::{ResponseHeaders, SECURITY_HEADERS};
