//! Static per-route response configuration.
//!
//! # Responsibilities
//! - Accept the two declaration styles: a bare status code or a structured table
//! - Accept headers as fixed values or as an allow-list of names
//! - Normalize both once, at registration, into [`RouteResponses`]
//!
//! # Design Decisions
//! - A structured declaration wins over a bare code when both are present
//! - Every structured field defaults independently
//! - Invalid codes and unregistered content types fail the registration

use std::collections::{BTreeMap, HashSet};

use axum::http::StatusCode;
use serde::Deserialize;

use crate::response::content_type::{ContentType, ContentTypeRegistry};
use crate::response::error::{ConfigurationError, ConfigurationResult};
use crate::response::headers::{HeaderDecl, HeaderSet};
use crate::response::outcome::OutcomeKind;

/// Header declaration as written by the route author.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HeaderDeclaration {
    /// `{ "X-Version": "1" }`
    Fixed(BTreeMap<String, String>),
    /// `["X-Version"]`
    AllowList(Vec<String>),
}

impl HeaderDeclaration {
    fn normalize(&self) -> ConfigurationResult<HeaderDecl> {
        match self {
            HeaderDeclaration::Fixed(values) => {
                if values.keys().any(|name| name.trim().is_empty()) {
                    return Err(ConfigurationError::EmptyHeaderName);
                }
                Ok(HeaderDecl::Fixed(values.iter().collect::<HeaderSet>()))
            }
            HeaderDeclaration::AllowList(names) => {
                let mut seen = HashSet::new();
                for name in names {
                    if name.trim().is_empty() {
                        return Err(ConfigurationError::EmptyHeaderName);
                    }
                    if !seen.insert(name.to_ascii_lowercase()) {
                        return Err(ConfigurationError::DuplicateAllowedHeader {
                            name: name.clone(),
                        });
                    }
                }
                Ok(HeaderDecl::AllowList(names.clone()))
            }
        }
    }
}

/// Structured branch declaration. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredResponse {
    pub code: Option<u16>,
    pub content_type: Option<String>,
    pub headers: Option<HeaderDeclaration>,
}

impl StructuredResponse {
    pub fn code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn headers(mut self, headers: HeaderDeclaration) -> Self {
        self.headers = Some(headers);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDeclaration {
    Bare(u16),
    Structured(StructuredResponse),
}

/// One branch (success or error) of a route's static configuration.
///
/// Deserializes from either an integer or a table; built programmatically
/// both forms can be set at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDeclaration")]
pub struct ResponseDeclaration {
    pub bare: Option<u16>,
    pub structured: Option<StructuredResponse>,
}

impl From<RawDeclaration> for ResponseDeclaration {
    fn from(raw: RawDeclaration) -> Self {
        match raw {
            RawDeclaration::Bare(code) => Self::code(code),
            RawDeclaration::Structured(spec) => Self::structured(spec),
        }
    }
}

impl From<u16> for ResponseDeclaration {
    fn from(code: u16) -> Self {
        Self::code(code)
    }
}

impl From<StructuredResponse> for ResponseDeclaration {
    fn from(spec: StructuredResponse) -> Self {
        Self::structured(spec)
    }
}

impl ResponseDeclaration {
    pub fn code(code: u16) -> Self {
        Self {
            bare: Some(code),
            structured: None,
        }
    }

    pub fn structured(spec: StructuredResponse) -> Self {
        Self {
            bare: None,
            structured: Some(spec),
        }
    }

    pub fn normalize(&self, registry: &ContentTypeRegistry) -> ConfigurationResult<ResponseSpec> {
        let spec = match (self.bare, &self.structured) {
            (Some(bare), Some(spec)) => {
                tracing::warn!(
                    bare_code = bare,
                    structured_code = ?spec.code,
                    "Both a bare code and a structured response declared, using the structured one"
                );
                spec.clone()
            }
            (Some(bare), None) => StructuredResponse::default().code(bare),
            (None, Some(spec)) => spec.clone(),
            (None, None) => StructuredResponse::default(),
        };

        Ok(ResponseSpec {
            code: spec.code.map(status_code).transpose()?,
            content_type: match &spec.content_type {
                Some(declared) => registry.resolve(declared)?,
                None => ContentType::json(),
            },
            headers: match &spec.headers {
                Some(headers) => headers.normalize()?,
                None => HeaderDecl::Undeclared,
            },
        })
    }
}

/// Validate a configured status code.
pub fn status_code(code: u16) -> ConfigurationResult<StatusCode> {
    if !(100..=599).contains(&code) {
        return Err(ConfigurationError::InvalidStatusCode { code });
    }
    StatusCode::from_u16(code).map_err(|_| ConfigurationError::InvalidStatusCode { code })
}

/// Normalized branch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseSpec {
    pub code: Option<StatusCode>,
    pub content_type: ContentType,
    pub headers: HeaderDecl,
}

/// Options supplied when a route is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    pub success: Option<ResponseDeclaration>,
    pub error: Option<ResponseDeclaration>,
    pub api_key_required: bool,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(mut self, declaration: impl Into<ResponseDeclaration>) -> Self {
        self.success = Some(declaration.into());
        self
    }

    pub fn error(mut self, declaration: impl Into<ResponseDeclaration>) -> Self {
        self.error = Some(declaration.into());
        self
    }

    pub fn api_key_required(mut self, required: bool) -> Self {
        self.api_key_required = required;
        self
    }

    pub fn normalize(&self, registry: &ContentTypeRegistry) -> ConfigurationResult<RouteResponses> {
        let branch = |declaration: &Option<ResponseDeclaration>| match declaration {
            Some(declaration) => declaration.normalize(registry),
            None => Ok(ResponseSpec::default()),
        };
        Ok(RouteResponses {
            success: branch(&self.success)?,
            error: branch(&self.error)?,
            api_key_required: self.api_key_required,
        })
    }
}

/// Immutable static configuration for one route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteResponses {
    pub success: ResponseSpec,
    pub error: ResponseSpec,
    /// Enforced by the HTTP layer, not by resolution.
    pub api_key_required: bool,
}

impl RouteResponses {
    pub fn branch(&self, kind: OutcomeKind) -> &ResponseSpec {
        match kind {
            OutcomeKind::Success => &self.success,
            OutcomeKind::Error => &self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::content_type::BodyPolicy;

    #[derive(Deserialize)]
    struct Wrapper {
        success: ResponseDeclaration,
    }

    fn parse(toml_src: &str) -> ResponseDeclaration {
        toml::from_str::<Wrapper>(toml_src).unwrap().success
    }

    #[test]
    fn test_deserialize_bare_code() {
        assert_eq!(parse("success = 201"), ResponseDeclaration::code(201));
    }

    #[test]
    fn test_deserialize_structured() {
        let declaration = parse(
            r#"success = { content_type = "text/plain", headers = ["X-Version"] }"#,
        );
        let spec = declaration.structured.unwrap();
        assert_eq!(spec.code, None);
        assert_eq!(spec.content_type.as_deref(), Some("text/plain"));
        assert_eq!(
            spec.headers,
            Some(HeaderDeclaration::AllowList(vec!["X-Version".to_string()]))
        );
    }

    #[test]
    fn test_fields_default_independently() {
        let registry = ContentTypeRegistry::default();
        let spec = ResponseDeclaration::structured(StructuredResponse::default().code(202))
            .normalize(&registry)
            .unwrap();
        assert_eq!(spec.code, Some(StatusCode::ACCEPTED));
        assert_eq!(spec.content_type.policy(), BodyPolicy::Json);
        assert_eq!(spec.headers, HeaderDecl::Undeclared);
    }

    #[test]
    fn test_structured_wins_over_bare() {
        let registry = ContentTypeRegistry::default();
        let declaration = ResponseDeclaration {
            bare: Some(302),
            structured: Some(StructuredResponse::default().content_type("text/html")),
        };
        let spec = declaration.normalize(&registry).unwrap();
        assert_eq!(spec.code, None);
        assert_eq!(spec.content_type.as_str(), "text/html");
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        let registry = ContentTypeRegistry::default();
        assert_eq!(
            ResponseDeclaration::code(42).normalize(&registry),
            Err(ConfigurationError::InvalidStatusCode { code: 42 })
        );

        let declaration = ResponseDeclaration::structured(
            StructuredResponse::default().content_type("application/x-unknown"),
        );
        assert!(matches!(
            declaration.normalize(&registry),
            Err(ConfigurationError::UnregisteredContentType { .. })
        ));

        let declaration = ResponseDeclaration::structured(StructuredResponse::default().headers(
            HeaderDeclaration::AllowList(vec!["X-A".into(), "x-a".into()]),
        ));
        assert_eq!(
            declaration.normalize(&registry),
            Err(ConfigurationError::DuplicateAllowedHeader { name: "x-a".into() })
        );
    }

    #[test]
    fn test_route_options_select_branch() {
        let registry = ContentTypeRegistry::default();
        let responses = RouteOptions::new()
            .success(StructuredResponse::default().content_type("text/plain"))
            .error(403)
            .api_key_required(true)
            .normalize(&registry)
            .unwrap();

        assert_eq!(responses.branch(OutcomeKind::Success).content_type.as_str(), "text/plain");
        assert_eq!(responses.branch(OutcomeKind::Error).code, Some(StatusCode::FORBIDDEN));
        assert!(responses.api_key_required);
    }
}
