//! Rendering of platform-generated responses.
//!
//! Used by the local server for failures that never reach a handler
//! (no matching route, missing API key, oversized request, timeout).

use axum::http::StatusCode;

use crate::gateway::registry::GatewayResponses;
use crate::gateway::response_type::ResponseType;
use crate::observability::metrics;
use crate::response::headers::HeaderSet;
use crate::response::resolver::ResolvedResponse;

const JSON: &str = "application/json";

/// Build the response the platform would send for `response_type`.
///
/// The specific entry wins; otherwise the `DEFAULT_4XX`/`DEFAULT_5XX` entry
/// for the type's status class applies, and then the platform defaults.
pub fn render(responses: &GatewayResponses, response_type: ResponseType, message: &str) -> ResolvedResponse {
    metrics::record_gateway_response(response_type);

    let specific = responses.get(response_type);
    let class = response_type
        .class_default()
        .and_then(|class| responses.get(class));
    let entry = specific.or(class);

    let status_code = specific
        .and_then(|e| e.status_code)
        .or_else(|| class.and_then(|e| e.status_code))
        .or_else(|| response_type.default_status())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let headers: HeaderSet = entry
        .map(|e| e.literal_headers().collect())
        .unwrap_or_default();

    let body = match entry.and_then(|e| e.response_templates.get(JSON)) {
        Some(template) => fill_template(template, message),
        None => serde_json::json!({ "message": message }).to_string(),
    };

    tracing::debug!(
        response_type = %response_type,
        status = status_code.as_u16(),
        "Rendered gateway response"
    );

    ResolvedResponse {
        status_code,
        content_type: JSON.to_string(),
        headers,
        body,
    }
}

fn fill_template(template: &str, message: &str) -> String {
    let quoted = serde_json::Value::String(message.to_string()).to_string();
    template
        .replace("$context.error.messageString", &quoted)
        .replace("$context.error.message", message)
}
