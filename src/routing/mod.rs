//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     (method, path, RouteOptions, handler)
//!     → table.rs (validate, normalize responses, detect conflicts)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request:
//!     → axum router (built from RouteTable)
//!     → matched Route (handler + RouteResponses)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - Conflicts rejected at registration instead of panicking in the router

pub mod table;

pub use table::{ApiBuilder, Route, RouteError, RouteResult, RouteTable};
