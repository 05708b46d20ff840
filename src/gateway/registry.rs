//! Gateway response registry.
//!
//! # Responsibilities
//! - Store overrides for platform-generated responses, keyed by type
//! - Expand the `headers` shortcut into `gatewayresponse.header.*` parameters
//! - Hand the expanded entries to the deployment collaborator
//!
//! # Design Decisions
//! - Expansion happens once, at registration
//! - Header values become single-quoted literals unless already quoted
//! - Directly supplied parameters win over shortcut expansion

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::response_type::ResponseType;

/// Parameter prefix the platform uses for response headers.
pub const HEADER_PARAMETER_PREFIX: &str = "gatewayresponse.header.";

/// Errors raised while registering gateway responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("unknown gateway response type '{0}'")]
    UnknownResponseType(String),

    #[error("invalid status code {code} for {response_type} (expected 100-599)")]
    InvalidStatusCode { response_type: ResponseType, code: u16 },

    #[error("gateway response header names must not be empty")]
    EmptyHeaderName,
}

/// Result type for gateway registry operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Operator-facing configuration of one gateway response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayResponseConfig {
    pub status_code: Option<u16>,
    pub response_parameters: BTreeMap<String, String>,
    pub response_templates: BTreeMap<String, String>,
    /// Shortcut for `gatewayresponse.header.<name>` parameters.
    pub headers: BTreeMap<String, String>,
}

impl GatewayResponseConfig {
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_parameters.insert(name.into(), value.into());
        self
    }

    pub fn template(mut self, content_type: impl Into<String>, template: impl Into<String>) -> Self {
        self.response_templates.insert(content_type.into(), template.into());
        self
    }
}

/// A registered gateway response in the platform's native shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponseEntry {
    pub response_type: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub response_parameters: BTreeMap<String, String>,
    pub response_templates: BTreeMap<String, String>,
}

impl GatewayResponseEntry {
    /// Literal header values, unquoted. Expression parameters are skipped.
    pub fn literal_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.response_parameters.iter().filter_map(|(key, value)| {
            let name = key.strip_prefix(HEADER_PARAMETER_PREFIX)?;
            let literal = value.strip_prefix('\'')?.strip_suffix('\'')?;
            Some((name, literal))
        })
    }
}

fn literal(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value.to_string()
    } else {
        format!("'{}'", value)
    }
}

/// Mutable registry used during the configuration phase.
#[derive(Debug, Default)]
pub struct GatewayResponseRegistry {
    entries: BTreeMap<ResponseType, GatewayResponseEntry>,
}

impl GatewayResponseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured responses keyed by type name.
    pub fn from_config(configs: &BTreeMap<String, GatewayResponseConfig>) -> GatewayResult<Self> {
        let mut registry = Self::new();
        for (response_type, config) in configs {
            registry.register(response_type, config.clone())?;
        }
        Ok(registry)
    }

    /// Register by platform name, e.g. `"DEFAULT_4XX"`.
    pub fn register(&mut self, response_type: &str, config: GatewayResponseConfig) -> GatewayResult<()> {
        let response_type = response_type
            .parse::<ResponseType>()
            .map_err(GatewayError::UnknownResponseType)?;
        self.register_type(response_type, config)
    }

    pub fn register_type(
        &mut self,
        response_type: ResponseType,
        config: GatewayResponseConfig,
    ) -> GatewayResult<()> {
        let entry = expand(response_type, config)?;
        if self.entries.insert(response_type, entry).is_some() {
            tracing::warn!(response_type = %response_type, "Gateway response registered twice, replacing");
        } else {
            tracing::debug!(response_type = %response_type, "Gateway response registered");
        }
        Ok(())
    }

    pub fn get(&self, response_type: ResponseType) -> Option<&GatewayResponseEntry> {
        self.entries.get(&response_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every registered entry, ordered by response type.
    pub fn resolve_all(&self) -> Vec<GatewayResponseEntry> {
        self.entries.values().cloned().collect()
    }

    /// End the configuration phase.
    pub fn freeze(self) -> GatewayResponses {
        GatewayResponses {
            entries: Arc::new(self.entries),
        }
    }
}

fn expand(
    response_type: ResponseType,
    config: GatewayResponseConfig,
) -> GatewayResult<GatewayResponseEntry> {
    if let Some(code) = config.status_code {
        if !(100..=599).contains(&code) {
            return Err(GatewayError::InvalidStatusCode { response_type, code });
        }
    }

    let mut response_parameters = config.response_parameters;
    for (name, value) in &config.headers {
        if name.trim().is_empty() {
            return Err(GatewayError::EmptyHeaderName);
        }
        response_parameters
            .entry(format!("{}{}", HEADER_PARAMETER_PREFIX, name))
            .or_insert_with(|| literal(value));
    }

    Ok(GatewayResponseEntry {
        response_type,
        status_code: config.status_code,
        response_parameters,
        response_templates: config.response_templates,
    })
}

/// Frozen, cheaply cloneable view of the registry.
#[derive(Debug, Clone, Default)]
pub struct GatewayResponses {
    entries: Arc<BTreeMap<ResponseType, GatewayResponseEntry>>,
}

impl GatewayResponses {
    pub fn get(&self, response_type: ResponseType) -> Option<&GatewayResponseEntry> {
        self.entries.get(&response_type)
    }

    pub fn resolve_all(&self) -> Vec<GatewayResponseEntry> {
        self.entries.values().cloned().collect()
    }
}
