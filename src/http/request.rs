//! Request extraction for handlers.
//!
//! # Responsibilities
//! - Assign a request ID before anything else sees the request
//! - Flatten the HTTP request into the value handlers receive
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Bodies are buffered and passed as text; handlers parse what they need
//! - Repeated query keys keep the last value

use std::collections::BTreeMap;

use axum::http::{request::Parts, HeaderMap, HeaderName, Method, Request};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::response::headers::HeaderSet;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns `x-request-id` to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer that copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Request ID carried by `headers`, or `"unknown"`.
pub fn request_id_of(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for one request, tagged with its request ID.
pub fn request_span<B>(request: &Request<B>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id_of(request.headers()),
    )
}

/// The request as a handler sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    pub request_id: Option<String>,
    pub method: Method,
    pub path: String,
    pub path_params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub headers: HeaderSet,
    pub body: String,
}

impl ApiRequest {
    pub fn from_parts(
        parts: &Parts,
        path_params: BTreeMap<String, String>,
        query: BTreeMap<String, String>,
        body: String,
    ) -> Self {
        let headers: HeaderSet = parts
            .headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
            .collect();

        Self {
            request_id: headers.get(X_REQUEST_ID).map(str::to_string),
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            path_params,
            query,
            headers,
            body,
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn request_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let (parts, _) = Request::builder()
            .method(Method::POST)
            .uri("/people/ann?x=1")
            .header("X-Request-Id", "abc")
            .header("X-Custom", "yes")
            .body(())
            .unwrap()
            .into_parts();

        let params = BTreeMap::from([("name".to_string(), "ann".to_string())]);
        let query = BTreeMap::from([("x".to_string(), "1".to_string())]);
        let request = ApiRequest::from_parts(&parts, params, query, "{}".into());

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/people/ann");
        assert_eq!(request.path_params["name"], "ann");
        assert_eq!(request.query["x"], "1");
        assert_eq!(request.request_id(), "abc");
        assert_eq!(request.header("x-custom"), Some("yes"));
        assert_eq!(request.body, "{}");
    }

    #[test]
    fn test_missing_request_id() {
        assert_eq!(ApiRequest::default().request_id(), "unknown");
        assert_eq!(request_id_of(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_request_id_of() {
        let request = Request::builder().header(X_REQUEST_ID, "abc").body(()).unwrap();
        assert_eq!(request_id_of(request.headers()), "abc");
        let _span = request_span(&request);
    }
}
