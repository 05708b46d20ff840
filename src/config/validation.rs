//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject route declarations that would fail registration
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate and conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Runs the same registration code the server uses, on a scratch table
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ApiConfig;
use crate::gateway::{GatewayResponseConfig, GatewayResponseRegistry};
use crate::http::handler::Reply;
use crate::response::content_type::ContentTypeRegistry;
use crate::routing::table::ApiBuilder;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl ToString) -> Self {
        Self {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

pub fn validate_config(config: &ApiConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than zero"));
    }
    if config.resolver.max_body_bytes == 0 {
        errors.push(ValidationError::new("resolver.max_body_bytes", "must be greater than zero"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    let content_types = match ContentTypeRegistry::with_extras(&config.resolver.extra_content_types) {
        Ok(registry) => registry,
        Err(e) => {
            errors.push(ValidationError::new("resolver.extra_content_types", e));
            ContentTypeRegistry::default()
        }
    };

    let mut scratch = ApiBuilder::new().with_content_types(content_types);
    for (i, route) in config.routes.iter().enumerate() {
        let result = scratch.route(&route.method, &route.path, route.options(), |_| async {
            Ok(Reply::from(serde_json::Value::Null))
        });
        if let Err(e) = result {
            errors.push(ValidationError::new(format!("routes[{}]", i), e));
        }
    }

    let mut gateway = GatewayResponseRegistry::new();
    for (name, response) in &config.gateway_responses {
        if let Err(e) = gateway.register(name, GatewayResponseConfig::clone(response)) {
            errors.push(ValidationError::new(format!("gateway_responses.{}", name), e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
