//! Property-based tests for resolution invariants.

use proptest::prelude::*;
use serde_json::Value;

use response_engine::response::{
    ContentTypeRegistry, DynamicResponse, Fault, Outcome, ResponseResolver, RouteOptions,
    RouteResponses, StructuredResponse,
};

fn json_value_strategy(max_depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(max_depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn responses(options: RouteOptions) -> RouteResponses {
    options.normalize(&ContentTypeRegistry::default()).unwrap()
}

proptest! {
    #[test]
    fn json_success_round_trips(value in json_value_strategy(3)) {
        let route = responses(RouteOptions::new());
        let resolved = ResponseResolver::default().resolve(&Outcome::Success(value.clone()), &route, None);

        let decoded: Value = serde_json::from_str(&resolved.body).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(resolved.content_type, "application/json");
    }

    #[test]
    fn text_plain_errors_carry_only_the_message(
        message in ".*",
        error_type in proptest::option::of("[A-Za-z]{1,12}"),
    ) {
        let route = responses(
            RouteOptions::new().error(StructuredResponse::default().content_type("text/plain")),
        );
        let fault = Fault::new(message.clone());
        let fault = match error_type {
            Some(error_type) => fault.with_type(error_type),
            None => fault,
        };
        let resolved = ResponseResolver::default().resolve(&Outcome::Failure(fault), &route, None);

        prop_assert_eq!(resolved.body, message);
    }

    #[test]
    fn success_redirects_move_value_to_location(code in 300u16..400, target in "[ -~]{0,64}") {
        let route = responses(RouteOptions::new().success(code));
        let resolved = ResponseResolver::default()
            .resolve(&Outcome::Success(Value::String(target.clone())), &route, None);

        prop_assert_eq!(resolved.status_code.as_u16(), code);
        prop_assert_eq!(resolved.headers.get("Location"), Some(target.as_str()));
        prop_assert!(resolved.body.is_empty());
    }

    #[test]
    fn resolution_is_idempotent(
        value in json_value_strategy(2),
        code in proptest::option::of(100u16..600),
        header in "[a-zA-Z]{1,8}",
        failed in any::<bool>(),
    ) {
        let route = responses(
            RouteOptions::new()
                .success(StructuredResponse::default().content_type("text/plain"))
                .error(418),
        );
        let mut dynamic = DynamicResponse::new(value.clone()).with_header(format!("X-{header}"), "1");
        dynamic.http_code = code;
        let outcome = if failed {
            Outcome::Failure(Fault::from_value(value))
        } else {
            Outcome::Success(value)
        };

        let resolver = ResponseResolver::default();
        let first = resolver.resolve(&outcome, &route, Some(&dynamic));
        let second = resolver.resolve(&outcome, &route, Some(&dynamic));
        prop_assert_eq!(first, second);
    }
}
