//! Handler outcomes and dynamic responses.
//!
//! An [`Outcome`] is the settled result of one handler invocation. A
//! [`DynamicResponse`] is the optional structured value a handler builds at
//! runtime to override status code, headers and body.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::response::body::{message_of, raw_text};
use crate::response::headers::HeaderSet;

/// Which static branch of a route applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    Error,
}

impl OutcomeKind {
    /// Status code used when neither the dynamic response nor the route sets one.
    pub fn default_status(self) -> StatusCode {
        match self {
            OutcomeKind::Success => StatusCode::OK,
            OutcomeKind::Error => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Error => "error",
        }
    }
}

/// An error raised by a handler.
///
/// Serializes as `{"errorMessage": .., "errorType": .., "errorPayload": ..}`,
/// skipping absent fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fault {
    #[serde(rename = "errorMessage")]
    pub message: String,

    #[serde(rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// The original thrown value, when it was not a plain error.
    #[serde(rename = "errorPayload", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            payload: None,
        }
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Wrap an arbitrary thrown value.
    pub fn from_value(value: Value) -> Self {
        Self {
            message: message_of(&value),
            error_type: None,
            payload: Some(value),
        }
    }

    /// Build a fault from any error type, keeping its display text.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        Self::new(err.to_string())
    }

    /// Unreduced text form: the payload if one was thrown, else the message.
    pub fn raw_text(&self) -> String {
        match &self.payload {
            Some(payload) => raw_text(payload),
            None => self.message.clone(),
        }
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Settled result of a handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(Fault),
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success(_) => OutcomeKind::Success,
            Outcome::Failure(_) => OutcomeKind::Error,
        }
    }
}

/// Structured response produced by a handler at runtime.
///
/// Consumed once by the resolver. `http_code` falls back to the route's code
/// and then to the outcome default when absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicResponse {
    pub body: Value,
    pub headers: HeaderSet,
    pub http_code: Option<u16>,
}

impl DynamicResponse {
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.http_code = Some(code);
        self
    }
}
