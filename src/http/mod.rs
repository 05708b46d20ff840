//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route mounting, platform failures)
//!     → request.rs (request ID, ApiRequest extraction)
//!     → handler.rs (invoke, settle into Outcome + DynamicResponse)
//!     → [response resolver shapes the reply]
//!     → reply.rs (ResolvedResponse → HTTP response)
//!     → Send to client
//! ```

pub mod handler;
pub mod reply;
pub mod request;
pub mod server;

pub use handler::{settle, HandlerResult, Rejection, Reply, Settled};
pub use request::{ApiRequest, X_REQUEST_ID};
pub use server::ApiServer;
