//! Local gateway emulator.
//!
//! # Responsibilities
//! - Mount every registered route on an Axum router
//! - Answer platform failures from the gateway response registry
//! - Enforce API keys, request size limits and handler timeouts
//! - Invoke handlers, settle their results and resolve the response
//! - Wire up middleware (tracing, request ID)
//!
//! # Design Decisions
//! - Routes are mounted per path so Axum does the matching
//! - Unknown paths and methods both answer `MISSING_AUTHENTICATION_TOKEN`
//! - Nothing here shapes a handler response; that is the resolver's job

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
    routing::{MethodFilter, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::schema::ApiConfig;
use crate::gateway::{self, GatewayResponses, ResponseType};
use crate::http::handler::settle;
use crate::http::request::{
    propagate_request_id_layer, request_id_of, request_span, set_request_id_layer, ApiRequest,
};
use crate::observability::metrics;
use crate::response::resolver::ResponseResolver;
use crate::routing::table::{Route, RouteTable};

pub const X_API_KEY: &str = "x-api-key";

const MISSING_TOKEN_MESSAGE: &str = "Missing Authentication Token";
const INVALID_KEY_MESSAGE: &str = "Forbidden";
const TOO_LARGE_MESSAGE: &str = "Request Too Long";
const TIMEOUT_MESSAGE: &str = "Endpoint request timed out";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResponseResolver>,
    pub gateway: GatewayResponses,
    pub api_keys: Arc<HashSet<String>>,
    pub max_request_bytes: usize,
    pub request_timeout: Duration,
}

/// HTTP server serving a frozen route table.
pub struct ApiServer {
    router: Router,
    config: ApiConfig,
}

impl ApiServer {
    pub fn new(config: ApiConfig, table: RouteTable, gateway: GatewayResponses) -> Self {
        let state = AppState {
            resolver: Arc::new(ResponseResolver::from_config(&config.resolver)),
            gateway,
            api_keys: Arc::new(config.security.api_keys.iter().cloned().collect()),
            max_request_bytes: config.listener.max_body_bytes,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(&table, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(table: &RouteTable, state: AppState) -> Router {
        let mut paths: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();

        for route in table.iter() {
            let filter = match MethodFilter::try_from(route.method.clone()) {
                Ok(filter) => filter,
                Err(_) => {
                    tracing::warn!(method = %route.method, path = %route.path, "Skipping route with unroutable method");
                    continue;
                }
            };

            let target = Arc::clone(route);
            let endpoint = move |State(state): State<AppState>, request: Request<Body>| {
                dispatch(state, Arc::clone(&target), request)
            };

            let method_router = paths.remove(&route.path).unwrap_or_else(MethodRouter::new);
            paths.insert(route.path.clone(), method_router.on(filter, endpoint));
        }

        let router = paths
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| {
                router.route(&path, method_router.fallback(missing_route))
            });

        router
            .fallback(missing_route)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router without a listener, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

async fn missing_route(State(state): State<AppState>, request: Request<Body>) -> Response {
    tracing::debug!(method = %request.method(), path = %request.uri().path(), "No route matched");
    gateway::render(&state.gateway, ResponseType::MissingAuthenticationToken, MISSING_TOKEN_MESSAGE).into_response()
}

fn api_key_valid(state: &AppState, headers: &HeaderMap) -> bool {
    headers
        .get(X_API_KEY)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| state.api_keys.contains(key))
}

/// Extract capture values by walking the registered pattern.
fn path_params(pattern: &str, path: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let mut actual = path.trim_matches('/').split('/');

    for segment in pattern.trim_matches('/').split('/') {
        if let Some(name) = segment.strip_prefix("{*").and_then(|s| s.strip_suffix('}')) {
            params.insert(name.to_string(), actual.by_ref().collect::<Vec<_>>().join("/"));
            break;
        }
        let value = actual.next().unwrap_or_default();
        if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            params.insert(name.to_string(), value.to_string());
        }
    }
    params
}

async fn dispatch(state: AppState, route: Arc<Route>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id_of(&parts.headers).to_string();

    if route.responses.api_key_required && !api_key_valid(&state, &parts.headers) {
        tracing::warn!(request_id = %request_id, path = %route.path, "Rejected request without a valid API key");
        return gateway::render(&state.gateway, ResponseType::InvalidApiKey, INVALID_KEY_MESSAGE).into_response();
    }

    let query = match Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri) {
        Ok(Query(query)) => query,
        Err(e) => {
            return gateway::render(&state.gateway, ResponseType::BadRequestParameters, &e.body_text())
                .into_response();
        }
    };

    let body = match axum::body::to_bytes(body, state.max_request_bytes).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            return gateway::render(&state.gateway, ResponseType::RequestTooLarge, TOO_LARGE_MESSAGE).into_response();
        }
    };

    let params = path_params(&route.path, parts.uri.path());
    let request = ApiRequest::from_parts(&parts, params, query, body);

    let result = match tokio::time::timeout(state.request_timeout, route.invoke(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                method = %route.method,
                path = %route.path,
                timeout_secs = state.request_timeout.as_secs(),
                "Handler timed out"
            );
            return gateway::render(&state.gateway, ResponseType::IntegrationTimeout, TIMEOUT_MESSAGE).into_response();
        }
    };

    let settled = settle(result);
    let kind = settled.outcome.kind();
    let resolved = state
        .resolver
        .resolve(&settled.outcome, &route.responses, settled.dynamic.as_ref());

    metrics::record_resolution(kind, resolved.status_code.as_u16(), start);
    tracing::debug!(
        request_id = %request_id,
        method = %route.method,
        path = %route.path,
        outcome = kind.as_str(),
        status = resolved.status_code.as_u16(),
        content_type = %resolved.content_type,
        "Resolved response"
    );

    resolved.into_response()
}
