//! Handler results and their normalization into outcomes.
//!
//! Handlers return `Ok` with a plain value or a dynamic response, or `Err`
//! with an error or a dynamic response. [`settle`] turns either into an
//! [`Outcome`] plus an optional [`DynamicResponse`] so resolution never has
//! to inspect what the handler produced.

use std::future::{ready, Ready};

use serde_json::{json, Value};

use crate::config::schema::CannedReply;
use crate::http::request::ApiRequest;
use crate::response::headers::HeaderSet;
use crate::response::outcome::{DynamicResponse, Fault, Outcome};

/// Value a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Value),
    Dynamic(DynamicResponse),
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Value(value)
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Reply::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Reply::Value(Value::String(value))
    }
}

impl From<DynamicResponse> for Reply {
    fn from(response: DynamicResponse) -> Self {
        Reply::Dynamic(response)
    }
}

/// Value a handler throws.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Fault(Fault),
    Dynamic(DynamicResponse),
}

impl From<Fault> for Rejection {
    fn from(fault: Fault) -> Self {
        Rejection::Fault(fault)
    }
}

impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        Rejection::Fault(Fault::new(message))
    }
}

impl From<String> for Rejection {
    fn from(message: String) -> Self {
        Rejection::Fault(Fault::new(message))
    }
}

impl From<DynamicResponse> for Rejection {
    fn from(response: DynamicResponse) -> Self {
        Rejection::Dynamic(response)
    }
}

pub type HandlerResult = Result<Reply, Rejection>;

/// A handler result reduced to what the resolver consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    pub outcome: Outcome,
    pub dynamic: Option<DynamicResponse>,
}

pub fn settle(result: HandlerResult) -> Settled {
    let (outcome, dynamic) = match result {
        Ok(Reply::Value(value)) => (Outcome::Success(value), None),
        Ok(Reply::Dynamic(response)) => (Outcome::Success(response.body.clone()), Some(response)),
        Err(Rejection::Fault(fault)) => (Outcome::Failure(fault), None),
        Err(Rejection::Dynamic(response)) => (
            Outcome::Failure(Fault::from_value(response.body.clone())),
            Some(response),
        ),
    };
    Settled { outcome, dynamic }
}

/// Default handler for configured routes without a reply: echo the request.
pub fn echo(request: ApiRequest) -> HandlerResult {
    Ok(Reply::Value(json!({
        "method": request.method.as_str(),
        "path": request.path,
        "pathParams": request.path_params,
        "query": request.query,
        "body": request.body,
    })))
}

fn dynamic(body: Value, headers: std::collections::BTreeMap<String, String>, code: Option<u16>) -> DynamicResponse {
    DynamicResponse {
        body,
        headers: headers.into_iter().collect::<HeaderSet>(),
        http_code: code,
    }
}

/// Handler that always produces the configured reply.
pub fn canned_handler(reply: CannedReply) -> impl Fn(ApiRequest) -> Ready<HandlerResult> + Send + Sync + 'static {
    move |_request| {
        let result = match reply.clone() {
            CannedReply::Return { body } => Ok(Reply::Value(body)),
            CannedReply::Throw { message, error_type } => {
                let fault = Fault::new(message);
                Err(Rejection::Fault(match error_type {
                    Some(error_type) => fault.with_type(error_type),
                    None => fault,
                }))
            }
            CannedReply::Respond { body, headers, code } => Ok(Reply::Dynamic(dynamic(body, headers, code))),
            CannedReply::Reject { body, headers, code } => Err(Rejection::Dynamic(dynamic(body, headers, code))),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::outcome::OutcomeKind;

    #[test]
    fn test_settle_plain_values() {
        let settled = settle(Ok("hi".into()));
        assert_eq!(settled.outcome, Outcome::Success(json!("hi")));
        assert!(settled.dynamic.is_none());

        let settled = settle(Err("boom".into()));
        assert_eq!(settled.outcome, Outcome::Failure(Fault::new("boom")));
        assert!(settled.dynamic.is_none());
    }

    #[test]
    fn test_settle_dynamic_responses() {
        let response = DynamicResponse::new("<error>NOT OK</error>").with_code(500);
        let settled = settle(Err(response.clone().into()));
        assert_eq!(settled.outcome.kind(), OutcomeKind::Error);
        assert_eq!(settled.dynamic, Some(response));

        let response = DynamicResponse::new(json!({"id": 1})).with_code(201);
        let settled = settle(Ok(response.clone().into()));
        assert_eq!(settled.outcome, Outcome::Success(json!({"id": 1})));
        assert_eq!(settled.dynamic, Some(response));
    }

    #[tokio::test]
    async fn test_canned_handler() {
        let handler = canned_handler(CannedReply::Throw {
            message: "nope".into(),
            error_type: Some("Denied".into()),
        });
        let result = handler(ApiRequest::default()).await;
        assert_eq!(result, Err(Rejection::Fault(Fault::new("nope").with_type("Denied"))));

        let handler = canned_handler(CannedReply::Respond {
            body: json!("moved"),
            headers: [("X-A".to_string(), "1".to_string())].into_iter().collect(),
            code: Some(302),
        });
        let settled = settle(handler(ApiRequest::default()).await);
        let dynamic = settled.dynamic.unwrap();
        assert_eq!(dynamic.http_code, Some(302));
        assert_eq!(dynamic.headers.get("x-a"), Some("1"));
    }

    #[test]
    fn test_echo() {
        let mut request = ApiRequest::default();
        request.path = "/echo".into();
        request.body = "payload".into();
        request.query.insert("q".into(), "1".into());

        let Ok(Reply::Value(value)) = echo(request) else {
            panic!("echo must succeed");
        };
        assert_eq!(value["method"], "GET");
        assert_eq!(value["path"], "/echo");
        assert_eq!(value["query"]["q"], "1");
        assert_eq!(value["body"], "payload");
    }
}
