//! Content types and the registry of types routes may declare.
//!
//! # Responsibilities
//! - Parse declared content types (parameters allowed, e.g. `; charset=utf-8`)
//! - Map a content type to the body policy the serializer applies
//! - Reject types nobody registered, at registration time
//!
//! # Design Decisions
//! - Matching uses the MIME essence (`type/subtype`, lowercase)
//! - The declared string is what gets emitted on the wire

use std::collections::BTreeSet;
use std::fmt;

use mime::Mime;

use crate::response::error::{ConfigurationError, ConfigurationResult};

/// Content types accepted without extra configuration.
pub const DEFAULT_CONTENT_TYPES: &[&str] = &[
    "application/json",
    "text/plain",
    "text/html",
    "text/xml",
    "application/xml",
    "text/css",
    "text/csv",
    "text/javascript",
    "application/javascript",
    "application/x-www-form-urlencoded",
    "application/octet-stream",
];

/// How the serializer treats a body for a given content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// JSON-encode the value; errors keep their full structure.
    Json,
    /// Raw text; errors are reduced to their message.
    Text,
    /// Raw text for both outcomes.
    Markup,
    /// Raw text, no special handling.
    PassThrough,
}

/// A validated content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    declared: String,
    essence: String,
}

impl ContentType {
    /// Parse a declared content type. Returns `None` for malformed MIME types.
    pub fn parse(declared: &str) -> Option<Self> {
        let declared = declared.trim();
        let mime: Mime = declared.parse().ok()?;
        Some(Self {
            declared: declared.to_string(),
            essence: mime.essence_str().to_ascii_lowercase(),
        })
    }

    /// `application/json`, the default for every route branch.
    pub fn json() -> Self {
        Self {
            declared: mime::APPLICATION_JSON.to_string(),
            essence: mime::APPLICATION_JSON.essence_str().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.declared
    }

    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn policy(&self) -> BodyPolicy {
        match self.essence.as_str() {
            "application/json" => BodyPolicy::Json,
            "text/plain" | "text/html" => BodyPolicy::Text,
            "text/xml" | "application/xml" => BodyPolicy::Markup,
            _ => BodyPolicy::PassThrough,
        }
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.declared)
    }
}

/// Set of content types routes are allowed to declare.
#[derive(Debug, Clone)]
pub struct ContentTypeRegistry {
    essences: BTreeSet<String>,
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        Self {
            essences: DEFAULT_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ContentTypeRegistry {
    /// Default registry extended with operator-supplied types.
    pub fn with_extras<I, S>(extras: I) -> ConfigurationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        for extra in extras {
            registry.register(extra.as_ref())?;
        }
        Ok(registry)
    }

    /// Register one more content type.
    pub fn register(&mut self, content_type: &str) -> ConfigurationResult<()> {
        let parsed = ContentType::parse(content_type).ok_or_else(|| {
            ConfigurationError::UnregisteredContentType {
                content_type: content_type.to_string(),
            }
        })?;
        self.essences.insert(parsed.essence);
        Ok(())
    }

    pub fn contains(&self, essence: &str) -> bool {
        self.essences.contains(&essence.to_ascii_lowercase())
    }

    /// Validate a declared content type against the registry.
    pub fn resolve(&self, declared: &str) -> ConfigurationResult<ContentType> {
        ContentType::parse(declared)
            .filter(|ct| self.essences.contains(&ct.essence))
            .ok_or_else(|| ConfigurationError::UnregisteredContentType {
                content_type: declared.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_parameters_for_emission() {
        let ct = ContentType::parse("Text/Plain; charset=utf-8").unwrap();
        assert_eq!(ct.essence(), "text/plain");
        assert_eq!(ct.as_str(), "Text/Plain; charset=utf-8");
        assert_eq!(ct.policy(), BodyPolicy::Text);
    }

    #[test]
    fn test_policies() {
        let policy = |s: &str| ContentType::parse(s).unwrap().policy();
        assert_eq!(policy("application/json"), BodyPolicy::Json);
        assert_eq!(policy("text/html"), BodyPolicy::Text);
        assert_eq!(policy("application/xml"), BodyPolicy::Markup);
        assert_eq!(policy("text/xml"), BodyPolicy::Markup);
        assert_eq!(policy("text/csv"), BodyPolicy::PassThrough);
        assert_eq!(ContentType::default().policy(), BodyPolicy::Json);
    }

    #[test]
    fn test_registry_rejects_unregistered() {
        let registry = ContentTypeRegistry::default();
        assert!(registry.resolve("text/plain").is_ok());
        assert_eq!(
            registry.resolve("application/vnd.custom+json"),
            Err(ConfigurationError::UnregisteredContentType {
                content_type: "application/vnd.custom+json".to_string()
            })
        );
        assert!(registry.resolve("not a mime").is_err());
    }

    #[test]
    fn test_registry_extras() {
        let registry = ContentTypeRegistry::with_extras(["application/vnd.custom+json"]).unwrap();
        assert!(registry.contains("application/vnd.custom+json"));
        let ct = registry.resolve("application/vnd.custom+json").unwrap();
        assert_eq!(ct.policy(), BodyPolicy::PassThrough);

        assert!(ContentTypeRegistry::with_extras(["garbage"]).is_err());
    }
}
