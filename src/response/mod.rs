//! Response resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (once):
//!     ResponseDeclaration (bare code | structured)
//!     → route.rs (normalize, validate content type and headers)
//!     → RouteResponses (immutable, per outcome kind)
//!
//! Per request:
//!     Outcome + RouteResponses + Option<DynamicResponse>
//!     → resolver.rs (status code precedence, redirect handling)
//!     → headers.rs (fixed / allow-list / pass-through)
//!     → body.rs (content-type driven serialization)
//!     → ResolvedResponse
//! ```
//!
//! # Design Decisions
//! - Configuration shape is resolved once at registration, never per request
//! - Content type comes only from static configuration
//! - Resolution never fails: serialization errors fall back to the error branch

pub mod body;
pub mod content_type;
pub mod error;
pub mod headers;
pub mod outcome;
pub mod resolver;
pub mod route;

pub use body::{BodySerializer, RawBody};
pub use content_type::{BodyPolicy, ContentType, ContentTypeRegistry};
pub use error::{ConfigurationError, SerializeError};
pub use headers::{HeaderDecl, HeaderMaterializer, HeaderSet};
pub use outcome::{DynamicResponse, Fault, Outcome, OutcomeKind};
pub use resolver::{ResolvedResponse, ResponseResolver};
pub use route::{
    HeaderDeclaration, ResponseDeclaration, ResponseSpec, RouteOptions, RouteResponses,
    StructuredResponse,
};
