//! Body serialization.
//!
//! | policy        | success             | error                      |
//! |---------------|---------------------|----------------------------|
//! | `Json`        | JSON-encode value   | JSON-encode whole error    |
//! | `Text`        | raw text            | message only               |
//! | `Markup`      | raw text            | raw text                   |
//! | `PassThrough` | raw text            | raw text                   |

use serde_json::Value;

use crate::response::content_type::{BodyPolicy, ContentType};
use crate::response::error::SerializeError;
use crate::response::outcome::{Fault, OutcomeKind};

/// Largest body the platform accepts (6 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// The raw value handed to the serializer.
#[derive(Debug, Clone, Copy)]
pub enum RawBody<'a> {
    /// A success value or a dynamic response body.
    Value(&'a Value),
    /// An error thrown without a dynamic response.
    Fault(&'a Fault),
}

impl RawBody<'_> {
    /// Unreduced text form, as used for raw bodies and redirect targets.
    pub fn text(&self) -> String {
        match self {
            RawBody::Value(value) => raw_text(value),
            RawBody::Fault(fault) => fault.raw_text(),
        }
    }

    fn message(&self) -> String {
        match self {
            RawBody::Value(value) => message_of(value),
            RawBody::Fault(fault) => fault.message.clone(),
        }
    }

    fn json(&self) -> Result<String, serde_json::Error> {
        match self {
            RawBody::Value(value) => serde_json::to_string(value),
            RawBody::Fault(fault) => serde_json::to_string(fault),
        }
    }
}

/// Text form of a JSON value: strings verbatim, `null` empty, the rest as JSON.
pub fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Message carried by an error value.
pub fn message_of(value: &Value) -> String {
    if let Value::String(s) = value {
        return s.clone();
    }
    ["errorMessage", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| raw_text(value))
}

/// Renders raw values into wire-ready bodies.
#[derive(Debug, Clone)]
pub struct BodySerializer {
    max_body_bytes: usize,
}

impl Default for BodySerializer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_BYTES)
    }
}

impl BodySerializer {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn serialize(
        &self,
        raw: RawBody<'_>,
        content_type: &ContentType,
        kind: OutcomeKind,
    ) -> Result<String, SerializeError> {
        let body = render(raw, content_type.policy(), kind)?;
        if body.len() > self.max_body_bytes {
            return Err(SerializeError::BodyTooLarge {
                size: body.len(),
                limit: self.max_body_bytes,
            });
        }
        Ok(body)
    }
}

/// Apply the policy table without the size ceiling.
pub fn render(
    raw: RawBody<'_>,
    policy: BodyPolicy,
    kind: OutcomeKind,
) -> Result<String, SerializeError> {
    let body = match (policy, kind) {
        (BodyPolicy::Json, _) => raw.json()?,
        (BodyPolicy::Text, OutcomeKind::Error) => raw.message(),
        _ => raw.text(),
    };
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ct(s: &str) -> ContentType {
        ContentType::parse(s).unwrap()
    }

    #[test]
    fn test_json_success_quotes_strings() {
        let serializer = BodySerializer::default();
        let value = json!("hi");
        let body = serializer
            .serialize(RawBody::Value(&value), &ct("application/json"), OutcomeKind::Success)
            .unwrap();
        assert_eq!(body, r#""hi""#);
    }

    #[test]
    fn test_json_error_keeps_structure() {
        let serializer = BodySerializer::default();
        let fault = Fault::new("boom").with_type("TypeError");
        let body = serializer
            .serialize(RawBody::Fault(&fault), &ct("application/json"), OutcomeKind::Error)
            .unwrap();
        let decoded: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(decoded, json!({"errorMessage": "boom", "errorType": "TypeError"}));
    }

    #[test]
    fn test_text_error_is_message_only() {
        let serializer = BodySerializer::default();
        let fault = Fault::from_value(json!({"message": "denied"}));
        for content_type in ["text/plain", "text/html"] {
            let body = serializer
                .serialize(RawBody::Fault(&fault), &ct(content_type), OutcomeKind::Error)
                .unwrap();
            assert_eq!(body, "denied");
        }

        let value = json!({"errorMessage": "from body"});
        let body = serializer
            .serialize(RawBody::Value(&value), &ct("text/plain"), OutcomeKind::Error)
            .unwrap();
        assert_eq!(body, "from body");
    }

    #[test]
    fn test_markup_error_is_not_reduced() {
        let serializer = BodySerializer::default();
        let fault = Fault::from_value(json!("<error>NOT OK</error>"));
        let body = serializer
            .serialize(RawBody::Fault(&fault), &ct("text/xml"), OutcomeKind::Error)
            .unwrap();
        assert_eq!(body, "<error>NOT OK</error>");

        let fault = Fault::from_value(json!({"message": "m"}));
        let body = serializer
            .serialize(RawBody::Fault(&fault), &ct("application/xml"), OutcomeKind::Error)
            .unwrap();
        assert_eq!(body, r#"{"message":"m"}"#);
    }

    #[test]
    fn test_raw_pass_through() {
        let serializer = BodySerializer::default();
        let value = json!("a,b\n1,2");
        let body = serializer
            .serialize(RawBody::Value(&value), &ct("text/csv"), OutcomeKind::Success)
            .unwrap();
        assert_eq!(body, "a,b\n1,2");

        let value = json!(42);
        let body = serializer
            .serialize(RawBody::Value(&value), &ct("text/html"), OutcomeKind::Success)
            .unwrap();
        assert_eq!(body, "42");

        let body = serializer
            .serialize(RawBody::Value(&Value::Null), &ct("text/plain"), OutcomeKind::Success)
            .unwrap();
        assert_eq!(body, "");
    }

    #[test]
    fn test_body_limit() {
        let serializer = BodySerializer::new(4);
        let value = json!("too long");
        let err = serializer
            .serialize(RawBody::Value(&value), &ct("text/plain"), OutcomeKind::Success)
            .unwrap_err();
        assert!(matches!(err, SerializeError::BodyTooLarge { size: 8, limit: 4 }));
    }
}
