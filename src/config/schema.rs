//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for an API.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::gateway::GatewayResponseConfig;
use crate::response::body::DEFAULT_MAX_BODY_BYTES;
use crate::response::headers::RESERVED_HEADERS;
use crate::response::route::{ResponseDeclaration, RouteOptions};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    /// Listener configuration for the local server.
    pub listener: ListenerConfig,

    /// Response resolution settings.
    pub resolver: ResolverConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// API key settings.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions.
    pub routes: Vec<RouteConfig>,

    /// Overrides for platform-generated responses, keyed by response type.
    pub gateway_responses: BTreeMap<String, GatewayResponseConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Response resolution configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Largest serialized response body in bytes.
    pub max_body_bytes: usize,

    /// Runtime headers kept for routes that declare no headers.
    pub passthrough_headers: Vec<String>,

    /// Content types registered on top of the built-in set.
    pub extra_content_types: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            passthrough_headers: RESERVED_HEADERS.iter().map(|s| s.to_string()).collect(),
            extra_content_types: Vec::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Handler timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// API key configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Keys accepted in `x-api-key` for routes that require one.
    pub api_keys: Vec<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// A route and its static response configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    /// HTTP method (GET, POST, ...).
    pub method: String,

    /// Path, with `{param}` captures.
    pub path: String,

    /// Reject requests without a configured API key.
    #[serde(default)]
    pub api_key_required: bool,

    /// Success branch: a bare code or a structured table.
    #[serde(default)]
    pub success: Option<ResponseDeclaration>,

    /// Error branch: a bare code or a structured table.
    #[serde(default)]
    pub error: Option<ResponseDeclaration>,

    /// Canned handler result. Routes without one echo the request.
    #[serde(default)]
    pub reply: Option<CannedReply>,
}

impl RouteConfig {
    pub fn options(&self) -> RouteOptions {
        RouteOptions {
            success: self.success.clone(),
            error: self.error.clone(),
            api_key_required: self.api_key_required,
        }
    }
}

/// Fixed handler result for stub routes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CannedReply {
    /// Return a plain value.
    Return {
        #[serde(default)]
        body: Value,
    },
    /// Throw an error.
    Throw {
        message: String,
        #[serde(default)]
        error_type: Option<String>,
    },
    /// Return a dynamic response.
    Respond {
        #[serde(default)]
        body: Value,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        #[serde(default)]
        code: Option<u16>,
    },
    /// Throw a dynamic response.
    Reject {
        #[serde(default)]
        body: Value,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        #[serde(default)]
        code: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ApiConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.resolver.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.resolver.passthrough_headers.len(), RESERVED_HEADERS.len());
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_parse_routes_and_gateway_responses() {
        let config: ApiConfig = toml::from_str(
            r#"
            [[routes]]
            method = "GET"
            path = "/greeting"
            success = { content_type = "text/plain" }
            error = 403
            reply = { kind = "return", body = "hi" }

            [[routes]]
            method = "POST"
            path = "/items/{id}"
            api_key_required = true
            reply = { kind = "reject", body = "<error>NOT OK</error>", code = 500, headers = { "Content-Type" = "text/xml" } }

            [routes.error]
            content_type = "text/xml"
            headers = ["X-Trace"]

            [gateway_responses.DEFAULT_4XX]
            status_code = 411
            headers = { "x-response-claudia" = "yes" }
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.len(), 2);
        let greeting = &config.routes[0];
        assert_eq!(greeting.error, Some(ResponseDeclaration::code(403)));
        assert_eq!(
            greeting.reply,
            Some(CannedReply::Return { body: Value::String("hi".into()) })
        );

        let items = &config.routes[1];
        assert!(items.api_key_required);
        assert!(matches!(items.reply, Some(CannedReply::Reject { code: Some(500), .. })));
        let error = items.error.as_ref().and_then(|e| e.structured.as_ref()).unwrap();
        assert_eq!(error.content_type.as_deref(), Some("text/xml"));

        let gateway = &config.gateway_responses["DEFAULT_4XX"];
        assert_eq!(gateway.status_code, Some(411));
        assert_eq!(gateway.headers["x-response-claudia"], "yes");
    }
}
