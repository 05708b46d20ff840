//! Response resolution engine for serverless HTTP APIs.
//!
//! Routes declare, once at setup time, how successful and failed handler
//! outcomes become HTTP responses. The engine turns every handler outcome
//! into a status code, content type, header set and body according to those
//! declarations and any dynamic response the handler returned. A separate
//! registry describes the responses the platform generates for requests that
//! never reach a handler.
//!
//! # Architecture Overview
//!
//! ```text
//!   setup                              request
//!   ─────                              ───────
//!   config ──▶ routing::ApiBuilder     http::server ──▶ Route handler
//!                 │ normalize                              │ settle
//!                 ▼                                        ▼
//!            RouteTable ──────────────▶ response::ResponseResolver ──▶ ResolvedResponse
//!
//!   config ──▶ gateway::GatewayResponseRegistry ──▶ GatewayResponses ──▶ gateway::render
//! ```

// Core subsystems
pub mod config;
pub mod gateway;
pub mod http;
pub mod response;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ApiConfig;
pub use gateway::{GatewayResponseRegistry, GatewayResponses};
pub use http::ApiServer;
pub use lifecycle::Shutdown;
pub use response::{Outcome, ResolvedResponse, ResponseResolver};
pub use routing::{ApiBuilder, RouteTable};
