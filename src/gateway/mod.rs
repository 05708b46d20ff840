//! Gateway response subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration phase:
//!     [gateway_responses.<TYPE>] / register()
//!     → registry.rs (expand header shortcuts, validate)
//!     → freeze() → GatewayResponses (read-only, shared)
//!
//! Consumers:
//!     → resolve_all() for the deployment collaborator
//!     → render.rs for platform-generated failures in the local server
//! ```
//!
//! # Design Decisions
//! - Single writer before many readers: no locks after freezing
//! - Parameters set directly always beat header shortcuts

pub mod registry;
pub mod render;
pub mod response_type;

pub use registry::{
    GatewayError, GatewayResponseConfig, GatewayResponseEntry, GatewayResponseRegistry,
    GatewayResponses, GatewayResult, HEADER_PARAMETER_PREFIX,
};
pub use render::render;
pub use response_type::ResponseType;
