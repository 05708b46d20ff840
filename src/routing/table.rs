//! Route registration and lookup.
//!
//! # Responsibilities
//! - Validate method and path at registration
//! - Normalize response declarations once per route
//! - Reject duplicates and paths the HTTP router could not hold together
//! - Freeze into an immutable table shared by all requests
//!
//! # Design Decisions
//! - Registration errors are returned immediately, never deferred to requests
//! - Lookup by exact path is for tooling; request matching is axum's job

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::config::schema::ApiConfig;
use crate::http::handler::{canned_handler, echo, HandlerResult};
use crate::http::request::ApiRequest;
use crate::response::content_type::ContentTypeRegistry;
use crate::response::error::ConfigurationError;
use crate::response::route::{RouteOptions, RouteResponses};

/// Errors raised while registering routes.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("unsupported method '{0}'")]
    InvalidMethod(String),

    #[error("invalid path '{0}'")]
    InvalidPath(String),

    #[error("route {method} {path} is already registered")]
    DuplicateRoute { method: Method, path: String },

    #[error("path '{path}' conflicts with '{existing}'")]
    ConflictingPath { path: String, existing: String },

    #[error("invalid response configuration for {method} {path}: {source}")]
    Configuration {
        method: Method,
        path: String,
        #[source]
        source: ConfigurationError,
    },

    #[error("invalid content type configuration: {0}")]
    ContentTypes(#[from] ConfigurationError),
}

/// Result type for route registration.
pub type RouteResult<T> = Result<T, RouteError>;

type BoxedHandler = Arc<dyn Fn(ApiRequest) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Parse a configured method name (case-insensitive).
///
/// HEAD is answered by the GET route of the same path.
pub fn parse_method(method: &str) -> RouteResult<Method> {
    let parsed = match method.trim().to_ascii_uppercase().as_str() {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "PATCH" => Method::PATCH,
        "OPTIONS" => Method::OPTIONS,
        _ => return Err(RouteError::InvalidMethod(method.to_string())),
    };
    Ok(parsed)
}

/// Normalize a route path: leading slash, no trailing slash, valid captures.
pub fn normalize_path(path: &str) -> RouteResult<String> {
    let invalid = || RouteError::InvalidPath(path.to_string());
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() || segment.chars().any(|c| c.is_whitespace() || "?#".contains(c)) {
            return Err(invalid());
        }
        let is_capture = segment.starts_with('{') && segment.ends_with('}');
        if segment.contains(['{', '}']) && !is_capture {
            return Err(invalid());
        }
        if is_capture {
            let name = &segment[1..segment.len() - 1];
            let name = match name.strip_prefix('*') {
                Some(rest) if i + 1 == segments.len() => rest,
                Some(_) => return Err(invalid()),
                None => name,
            };
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(invalid());
            }
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Path with capture names erased, used to detect router conflicts.
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix("{*") {
            Some(_) => "{*}",
            None if segment.starts_with('{') => "{}",
            None => segment,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether a catch-all in one shape sits where the other has a parameter.
///
/// The router cannot hold both under the same prefix.
fn catch_all_collides(a: &str, b: &str) -> bool {
    for (x, y) in a.split('/').zip(b.split('/')) {
        match (x, y) {
            ("{*}", "{}") | ("{}", "{*}") => return true,
            _ if x != y => return false,
            _ => {}
        }
    }
    false
}

/// A registered route.
pub struct Route {
    pub method: Method,
    pub path: String,
    pub responses: RouteResponses,
    handler: BoxedHandler,
}

impl Route {
    pub fn invoke(&self, request: ApiRequest) -> BoxFuture<'static, HandlerResult> {
        (self.handler)(request)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("responses", &self.responses)
            .finish_non_exhaustive()
    }
}

/// Collects routes during setup.
#[derive(Debug, Default)]
pub struct ApiBuilder {
    content_types: ContentTypeRegistry,
    routes: Vec<Route>,
    shapes: HashMap<String, String>,
}

impl ApiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_types(mut self, content_types: ContentTypeRegistry) -> Self {
        self.content_types = content_types;
        self
    }

    /// Register every configured route with a canned or echo handler.
    pub fn from_config(config: &ApiConfig) -> RouteResult<Self> {
        let content_types = ContentTypeRegistry::with_extras(&config.resolver.extra_content_types)?;
        let mut builder = Self::new().with_content_types(content_types);
        for route in &config.routes {
            match &route.reply {
                Some(reply) => {
                    builder.route(&route.method, &route.path, route.options(), canned_handler(reply.clone()))?
                }
                None => builder.route(&route.method, &route.path, route.options(), |request| async move {
                    echo(request)
                })?,
            };
        }
        Ok(builder)
    }

    pub fn route<H, Fut>(
        &mut self,
        method: &str,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> RouteResult<&mut Self>
    where
        H: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let method = parse_method(method)?;
        let path = normalize_path(path)?;

        if self.routes.iter().any(|r| r.method == method && r.path == path) {
            return Err(RouteError::DuplicateRoute { method, path });
        }
        let shape = path_shape(&path);
        let conflict = self
            .shapes
            .iter()
            .find(|(known, existing)| {
                (**known == shape && **existing != path) || catch_all_collides(known, &shape)
            })
            .map(|(_, existing)| existing.clone());
        if let Some(existing) = conflict {
            return Err(RouteError::ConflictingPath { path, existing });
        }

        let responses = options
            .normalize(&self.content_types)
            .map_err(|source| RouteError::Configuration {
                method: method.clone(),
                path: path.clone(),
                source,
            })?;

        tracing::debug!(
            method = %method,
            path = %path,
            success_type = %responses.success.content_type,
            error_type = %responses.error.content_type,
            api_key_required = responses.api_key_required,
            "Route registered"
        );

        self.shapes.insert(shape, path.clone());
        self.routes.push(Route {
            method,
            path,
            responses,
            handler: Arc::new(move |request| -> BoxFuture<'static, HandlerResult> {
                Box::pin(handler(request))
            }),
        });
        Ok(self)
    }

    pub fn get<H, Fut>(&mut self, path: &str, options: RouteOptions, handler: H) -> RouteResult<&mut Self>
    where
        H: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route("GET", path, options, handler)
    }

    pub fn post<H, Fut>(&mut self, path: &str, options: RouteOptions, handler: H) -> RouteResult<&mut Self>
    where
        H: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.route("POST", path, options, handler)
    }

    /// End the setup phase.
    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes.into_iter().map(Arc::new).collect(),
        }
    }
}

/// Immutable route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find a route by method and registered path.
    pub fn find(&self, method: &Method, path: &str) -> Option<&Arc<Route>> {
        let path = normalize_path(path).ok()?;
        self.routes
            .iter()
            .find(|r| r.method == *method && r.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::Reply;
    use crate::response::outcome::OutcomeKind;
    use serde_json::json;

    async fn ok(_: ApiRequest) -> HandlerResult {
        Ok(Reply::from(json!("ok")))
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("").unwrap(), "/");
        assert_eq!(normalize_path("greeting").unwrap(), "/greeting");
        assert_eq!(normalize_path("/people/{name}/").unwrap(), "/people/{name}");
        assert_eq!(normalize_path("/files/{*rest}").unwrap(), "/files/{*rest}");
        assert!(normalize_path("/a//b").is_err());
        assert!(normalize_path("/a/{}").is_err());
        assert!(normalize_path("/a/{*rest}/b").is_err());
        assert!(normalize_path("/a?b").is_err());
        assert!(normalize_path("/a{b}").is_err());
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert!(matches!(parse_method("FETCH"), Err(RouteError::InvalidMethod(_))));
        assert!(matches!(parse_method("HEAD"), Err(RouteError::InvalidMethod(_))));
    }

    #[test]
    fn test_register_and_find() {
        let mut builder = ApiBuilder::new();
        builder.get("/echo", RouteOptions::new().success(201), ok).unwrap();
        builder.post("/echo", RouteOptions::new(), ok).unwrap();
        let table = builder.build();

        assert_eq!(table.len(), 2);
        let route = table.find(&Method::GET, "echo").unwrap();
        assert_eq!(
            route.responses.branch(OutcomeKind::Success).code.map(|c| c.as_u16()),
            Some(201)
        );
        assert!(table.find(&Method::PUT, "/echo").is_none());
    }

    #[tokio::test]
    async fn test_invoke_runs_handler() {
        let mut builder = ApiBuilder::new();
        builder.get("/", RouteOptions::new(), ok).unwrap();
        let table = builder.build();
        let route = table.find(&Method::GET, "/").unwrap();

        let result = route.invoke(ApiRequest::default()).await;
        assert!(matches!(result, Ok(Reply::Value(v)) if v == json!("ok")));
    }

    #[test]
    fn test_rejects_duplicates_and_conflicts() {
        let mut builder = ApiBuilder::new();
        builder.get("/items/{id}", RouteOptions::new(), ok).unwrap();

        assert!(matches!(
            builder.get("/items/{id}/", RouteOptions::new(), ok),
            Err(RouteError::DuplicateRoute { .. })
        ));
        assert!(matches!(
            builder.post("/items/{name}", RouteOptions::new(), ok),
            Err(RouteError::ConflictingPath { .. })
        ));
        assert!(builder.post("/items/{id}", RouteOptions::new(), ok).is_ok());
    }

    #[test]
    fn test_rejects_catch_all_beside_parameter() {
        let mut builder = ApiBuilder::new();
        builder.get("/items/{id}", RouteOptions::new(), ok).unwrap();

        assert!(matches!(
            builder.get("/items/{*rest}", RouteOptions::new(), ok),
            Err(RouteError::ConflictingPath { ref existing, .. }) if existing == "/items/{id}"
        ));
        assert!(matches!(
            builder.post("/items/{*rest}", RouteOptions::new(), ok),
            Err(RouteError::ConflictingPath { .. })
        ));

        let mut builder = ApiBuilder::new();
        builder.get("/files/{*rest}", RouteOptions::new(), ok).unwrap();
        assert!(matches!(
            builder.get("/files/{name}/raw", RouteOptions::new(), ok),
            Err(RouteError::ConflictingPath { .. })
        ));
        assert!(builder.get("/files/index", RouteOptions::new(), ok).is_ok());
        assert!(builder.get("/other/{id}", RouteOptions::new(), ok).is_ok());
        assert!(builder.post("/files/{*rest}", RouteOptions::new(), ok).is_ok());
    }

    #[test]
    fn test_catch_all_collides() {
        assert!(catch_all_collides("/items/{}", "/items/{*}"));
        assert!(catch_all_collides("/items/{*}", "/items/{}/x"));
        assert!(!catch_all_collides("/items/{}", "/other/{*}"));
        assert!(!catch_all_collides("/items/{}", "/items/{}/{*}"));
        assert!(!catch_all_collides("/items/{*}", "/items/static"));
    }

    #[test]
    fn test_rejects_bad_response_configuration() {
        let mut builder = ApiBuilder::new();
        let err = builder
            .get("/", RouteOptions::new().error(700), ok)
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::Configuration { source: ConfigurationError::InvalidStatusCode { code: 700 }, .. }
        ));
        assert!(builder.build().is_empty());
    }
}
