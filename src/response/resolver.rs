//! Response resolution.
//!
//! # Responsibilities
//! - Pick the route branch matching the outcome kind
//! - Apply status code precedence: dynamic, then static, then default
//! - Materialize headers and serialize the body
//! - Turn successful 3xx responses into redirects
//! - Recover from serialization failures through the error branch
//!
//! # Design Decisions
//! - Pure and synchronous; no state is kept between requests
//! - Always produces a well-formed response

use axum::http::StatusCode;

use crate::config::ResolverConfig;
use crate::observability::metrics;
use crate::response::body::{self, BodySerializer, RawBody};
use crate::response::error::SerializeError;
use crate::response::headers::{HeaderMaterializer, HeaderSet, LOCATION};
use crate::response::outcome::{DynamicResponse, Fault, Outcome, OutcomeKind};
use crate::response::route::{ResponseSpec, RouteResponses};

/// Message used when a response cannot be serialized.
pub const SERIALIZATION_FAILURE_MESSAGE: &str = "Response could not be serialized";

/// Fully specified response, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResponse {
    pub status_code: StatusCode,
    pub content_type: String,
    pub headers: HeaderSet,
    pub body: String,
}

/// Maps `(outcome, route configuration, dynamic response)` to a response.
#[derive(Debug, Clone, Default)]
pub struct ResponseResolver {
    serializer: BodySerializer,
    headers: HeaderMaterializer,
}

impl ResponseResolver {
    pub fn new(serializer: BodySerializer, headers: HeaderMaterializer) -> Self {
        Self { serializer, headers }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(
            BodySerializer::new(config.max_body_bytes),
            HeaderMaterializer::new(&config.passthrough_headers),
        )
    }

    pub fn resolve(
        &self,
        outcome: &Outcome,
        route: &RouteResponses,
        dynamic: Option<&DynamicResponse>,
    ) -> ResolvedResponse {
        let kind = outcome.kind();
        match self.try_resolve(outcome, route.branch(kind), dynamic) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!(
                    outcome = kind.as_str(),
                    error = %err,
                    "Failed to serialize response, answering through the error branch"
                );
                metrics::record_serialization_fallback();
                self.fallback(&route.error)
            }
        }
    }

    fn try_resolve(
        &self,
        outcome: &Outcome,
        spec: &ResponseSpec,
        dynamic: Option<&DynamicResponse>,
    ) -> Result<ResolvedResponse, SerializeError> {
        let kind = outcome.kind();

        let status_code = match dynamic.and_then(|d| d.http_code) {
            Some(code) => {
                StatusCode::from_u16(code).map_err(|_| SerializeError::InvalidStatusCode(code))?
            }
            None => spec.code.unwrap_or(kind.default_status()),
        };

        let empty = HeaderSet::new();
        let runtime = dynamic.map_or(&empty, |d| &d.headers);
        let mut headers = self.headers.materialize(&spec.headers, runtime);

        let raw = match (dynamic, outcome) {
            (Some(dynamic), _) => RawBody::Value(&dynamic.body),
            (None, Outcome::Success(value)) => RawBody::Value(value),
            (None, Outcome::Failure(fault)) => RawBody::Fault(fault),
        };

        let body = if kind == OutcomeKind::Success && status_code.is_redirection() {
            headers.insert(LOCATION, raw.text());
            String::new()
        } else {
            self.serializer.serialize(raw, &spec.content_type, kind)?
        };

        Ok(ResolvedResponse {
            status_code,
            content_type: spec.content_type.to_string(),
            headers,
            body,
        })
    }

    /// Generic error response that cannot fail.
    fn fallback(&self, spec: &ResponseSpec) -> ResolvedResponse {
        let fault = Fault::new(SERIALIZATION_FAILURE_MESSAGE);
        let raw = RawBody::Fault(&fault);
        let body = self
            .serializer
            .serialize(raw, &spec.content_type, OutcomeKind::Error)
            .or_else(|_| body::render(raw, spec.content_type.policy(), OutcomeKind::Error))
            .unwrap_or_else(|_| SERIALIZATION_FAILURE_MESSAGE.to_string());

        ResolvedResponse {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            content_type: spec.content_type.to_string(),
            headers: self.headers.materialize(&spec.headers, &HeaderSet::new()),
            body,
        }
    }
}
