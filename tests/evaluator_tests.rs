#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use brrtcheck::error::UsageError;
use brrtcheck::exchange::OriginatingRequest;
use brrtcheck::OpenApiEvaluator;
use common::{evaluator, headers, messages};
use http::{HeaderMap, Method, StatusCode};
use serde_json::json;
use url::Url;

const USER: &str = "https://api.example.com/v1/user/42";

#[test]
fn test_valid_get_request() {
    let results = evaluator()
        .evaluate_request(USER, &Method::GET, &headers(&[("x-request-id", "req-1")]), None)
        .unwrap();
    assert!(results.is_valid(), "{results}");

    let annotations = results.annotations();
    assert_eq!(annotations["pathTemplate"], json!("/user/{id}"));
    assert_eq!(annotations["operationId"], json!("getUser"));
    assert_eq!(annotations["method"], json!("GET"));
    assert_eq!(annotations["pathVariables"], json!({"id": "42"}));
    assert_eq!(annotations["server"], json!("https://{env}.example.com/v1"));
}

#[test]
fn test_path_variable_schema_through_ref() {
    let results = evaluator()
        .evaluate_request(
            "https://api.example.com/v1/user/0",
            &Method::GET,
            &headers(&[("X-Request-Id", "req-1")]),
            None,
        )
        .unwrap();
    assert!(!results.is_valid());
    assert_eq!(results.failures().len(), 1);
}

#[test]
fn test_path_variable_wrong_type() {
    let results = evaluator()
        .evaluate_request(
            "https://api.example.com/v1/user/abc",
            &Method::GET,
            &headers(&[("X-Request-Id", "req-1")]),
            None,
        )
        .unwrap();
    assert!(!results.is_valid());
}

#[test]
fn test_missing_required_header() {
    let results = evaluator()
        .evaluate_request(USER, &Method::GET, &HeaderMap::new(), None)
        .unwrap();
    assert!(!results.is_valid());
    let messages = messages(&results);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("X-Request-Id"), "{messages:?}");
}

#[test]
fn test_header_schema_violation() {
    let results = evaluator()
        .evaluate_request(USER, &Method::GET, &headers(&[("X-Request-Id", "ab")]), None)
        .unwrap();
    assert!(!results.is_valid());
}

#[test]
fn test_server_variable_enum() {
    let ok = evaluator()
        .evaluate_request(
            "https://staging.example.com/v1/user/42",
            &Method::GET,
            &headers(&[("X-Request-Id", "req-1")]),
            None,
        )
        .unwrap();
    assert!(ok.is_valid(), "{ok}");

    let bad = evaluator()
        .evaluate_request(
            "https://prod.example.com/v1/user/42",
            &Method::GET,
            &headers(&[("X-Request-Id", "req-1")]),
            None,
        )
        .unwrap();
    assert!(!bad.is_valid());
    assert!(messages(&bad)[0].contains("no server matches"));
}

#[test]
fn test_unknown_path_and_method() {
    let evaluator = evaluator();
    let unknown = evaluator
        .evaluate_request(
            "https://api.example.com/v1/orders/1",
            &Method::GET,
            &HeaderMap::new(),
            None,
        )
        .unwrap();
    assert!(!unknown.is_valid());
    assert!(messages(&unknown)[0].contains("no path template matches"));
    assert!(unknown.details().is_empty());

    let method = evaluator
        .evaluate_request(USER, &Method::PATCH, &HeaderMap::new(), None)
        .unwrap();
    assert!(!method.is_valid());
    let message = &messages(&method)[0];
    assert!(message.contains("allowed: [GET, PUT]"), "{message}");
}

#[test]
fn test_json_request_body() {
    let evaluator = evaluator();
    let json_headers = headers(&[("Content-Type", "application/json")]);

    let ok = evaluator
        .evaluate_request(
            USER,
            &Method::PUT,
            &json_headers,
            Some(br#"{"first-name":"Ada","last-name":"Lovelace"}"#.as_slice()),
        )
        .unwrap();
    assert!(ok.is_valid(), "{ok}");

    let missing = evaluator
        .evaluate_request(
            USER,
            &Method::PUT,
            &json_headers,
            Some(br#"{"first-name":"Ada"}"#.as_slice()),
        )
        .unwrap();
    assert!(!missing.is_valid());
    assert!(messages(&missing).iter().any(|m| m.contains("last-name")));

    let garbage = evaluator
        .evaluate_request(USER, &Method::PUT, &json_headers, Some(b"{not json".as_slice()))
        .unwrap();
    assert!(!garbage.is_valid());
    assert!(messages(&garbage)[0].contains("not valid JSON"));
}

#[test]
fn test_text_body_uses_range() {
    let evaluator = evaluator();
    let text = headers(&[("Content-Type", "text/plain")]);
    let ok = evaluator
        .evaluate_request(USER, &Method::PUT, &text, Some(b"short".as_slice()))
        .unwrap();
    assert!(ok.is_valid(), "{ok}");

    let long = evaluator
        .evaluate_request(USER, &Method::PUT, &text, Some(b"far too long for this".as_slice()))
        .unwrap();
    assert!(!long.is_valid());
}

#[test]
fn test_unmatched_content_type() {
    let results = evaluator()
        .evaluate_request(
            USER,
            &Method::PUT,
            &headers(&[("Content-Type", "application/xml")]),
            Some(b"<user/>".as_slice()),
        )
        .unwrap();
    assert!(!results.is_valid());
}

#[test]
fn test_required_body_absent() {
    let evaluator = evaluator();
    let results = evaluator
        .evaluate_request(USER, &Method::PUT, &HeaderMap::new(), None)
        .unwrap();
    assert!(!results.is_valid());
    assert!(messages(&results)[0].contains("required"));

    // an empty body counts as absent
    let empty = evaluator
        .evaluate_request(USER, &Method::PUT, &HeaderMap::new(), Some(b"".as_slice()))
        .unwrap();
    assert!(!empty.is_valid());
}

#[test]
fn test_optional_body_absent() {
    let results = evaluator()
        .evaluate_request(
            "https://api.example.com/v1/user",
            &Method::POST,
            &HeaderMap::new(),
            None,
        )
        .unwrap();
    assert!(results.is_valid(), "{results}");
}

#[test]
fn test_usage_errors() {
    let evaluator = evaluator();
    assert_eq!(
        evaluator
            .evaluate_request("/v1/user/42", &Method::GET, &HeaderMap::new(), None)
            .unwrap_err(),
        UsageError::MissingUri("/v1/user/42".to_string())
    );
    assert_eq!(
        evaluator
            .evaluate_request(USER, &Method::PUT, &HeaderMap::new(), Some(b"{}".as_slice()))
            .unwrap_err(),
        UsageError::MissingContentType
    );
}

#[test]
fn test_response_exact_status() {
    let evaluator = evaluator();
    let ok = evaluator
        .evaluate_response(
            USER,
            &Method::GET,
            StatusCode::OK,
            &headers(&[("Content-Type", "application/json"), ("X-Rate-Limit", "100")]),
            Some(br#"{"first-name":"Ada","last-name":"Lovelace"}"#.as_slice()),
        )
        .unwrap();
    assert!(ok.is_valid(), "{ok}");
    assert_eq!(ok.annotations()["statusCode"], json!(200));
    assert_eq!(ok.annotations()["responseKey"], json!("200"));

    let bad_header = evaluator
        .evaluate_response(
            USER,
            &Method::GET,
            StatusCode::OK,
            &headers(&[("Content-Type", "application/json"), ("X-Rate-Limit", "lots")]),
            Some(br#"{"first-name":"Ada","last-name":"Lovelace"}"#.as_slice()),
        )
        .unwrap();
    assert!(!bad_header.is_valid());

    let no_header = evaluator
        .evaluate_response(
            USER,
            &Method::GET,
            StatusCode::OK,
            &headers(&[("Content-Type", "application/json")]),
            Some(br#"{"first-name":"Ada","last-name":"Lovelace"}"#.as_slice()),
        )
        .unwrap();
    assert!(messages(&no_header)[0].contains("X-Rate-Limit"));
}

#[test]
fn test_response_range_and_default() {
    let evaluator = evaluator();
    let not_found = evaluator
        .evaluate_response(
            USER,
            &Method::GET,
            StatusCode::NOT_FOUND,
            &headers(&[("Content-Type", "application/problem+json")]),
            Some(br#"{"title":"Not Found"}"#.as_slice()),
        )
        .unwrap();
    assert!(not_found.is_valid(), "{not_found}");
    assert_eq!(not_found.annotations()["responseKey"], json!("4XX"));

    let problem = evaluator
        .evaluate_response(
            USER,
            &Method::GET,
            StatusCode::CONFLICT,
            &headers(&[("Content-Type", "application/problem+json")]),
            Some(br#"{"detail":"no title"}"#.as_slice()),
        )
        .unwrap();
    assert!(!problem.is_valid());

    let server_error = evaluator
        .evaluate_response(
            USER,
            &Method::GET,
            StatusCode::INTERNAL_SERVER_ERROR,
            &HeaderMap::new(),
            None,
        )
        .unwrap();
    assert!(server_error.is_valid(), "{server_error}");
    assert_eq!(server_error.annotations()["responseKey"], json!("default"));
}

#[test]
fn test_undeclared_status_without_default() {
    let results = evaluator()
        .evaluate_response(
            USER,
            &Method::PUT,
            StatusCode::OK,
            &HeaderMap::new(),
            None,
        )
        .unwrap();
    assert!(!results.is_valid());
    let message = &messages(&results)[0];
    assert!(message.contains("status 200"), "{message}");
    assert!(message.contains("declared: [204]"), "{message}");
}

#[test]
fn test_http_types() {
    let evaluator = evaluator();
    let request = http::Request::get(USER)
        .header("X-Request-Id", "req-1")
        .body(Vec::<u8>::new())
        .unwrap();
    assert!(evaluator.evaluate_http_request(&request).unwrap().is_valid());

    let mut response = http::Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/problem+json")
        .body(br#"{"title":"gone"}"#.to_vec())
        .unwrap();
    assert_eq!(
        evaluator.evaluate_http_response(&response).unwrap_err(),
        UsageError::UnknownRequest
    );
    response
        .extensions_mut()
        .insert(OriginatingRequest::of(&request));
    assert!(evaluator.evaluate_http_response(&response).unwrap().is_valid());
}

#[test]
fn test_base_uri_override() {
    let evaluator = OpenApiEvaluator::builder(common::document(common::USER_SPEC))
        .base_uri(Url::parse("http://localhost:8080/api").unwrap())
        .build();
    let local = evaluator
        .evaluate_request(
            "http://localhost:8080/api/user/42",
            &Method::GET,
            &headers(&[("X-Request-Id", "req-1")]),
            None,
        )
        .unwrap();
    assert!(local.is_valid(), "{local}");

    let declared = evaluator
        .evaluate_request(USER, &Method::GET, &headers(&[("X-Request-Id", "req-1")]), None)
        .unwrap();
    assert!(!declared.is_valid());
}

#[test]
fn test_serialized_tree_elides_valid_branches() {
    let results = evaluator()
        .evaluate_request(
            "https://api.example.com/v1/user/0",
            &Method::GET,
            &headers(&[("X-Request-Id", "req-1")]),
            None,
        )
        .unwrap();
    let compact = serde_json::to_value(&results).unwrap();
    let verbose = results.to_verbose_json();
    assert!(compact.to_string().len() < verbose.to_string().len());
    // the valid header parameter only shows up in the verbose form
    assert!(!compact.to_string().contains("req-1"));
    assert!(verbose.to_string().contains("req-1"));
}

#[test]
fn test_evaluator_is_shareable() {
    let evaluator = std::sync::Arc::new(evaluator());
    let handles: Vec<_> = (1..=4)
        .map(|id| {
            let evaluator = std::sync::Arc::clone(&evaluator);
            std::thread::spawn(move || {
                evaluator
                    .evaluate_request(
                        &format!("https://api.example.com/v1/user/{id}"),
                        &Method::GET,
                        &headers(&[("X-Request-Id", "req-1")]),
                        None,
                    )
                    .unwrap()
                    .is_valid()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_get_user_response_end_to_end() {
    let evaluator = OpenApiEvaluator::new(common::document(
        r##"
openapi: 3.1.0
info: {title: Users, version: '1'}
paths:
  /v1/user/{id}:
    get:
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema:
                type: object
                required: [first-name, last-name]
"##,
    ));
    let json = headers(&[("Content-Type", "application/json")]);
    let uri = "http://localhost/v1/user/133e4564-e89b-12d3-a456-426614174000";

    let ok = evaluator
        .evaluate_response(
            uri,
            &Method::GET,
            StatusCode::OK,
            &json,
            Some(br#"{"first-name":"Foo","last-name":"Bar"}"#.as_slice()),
        )
        .unwrap();
    assert!(ok.is_valid(), "{ok}");
    assert_eq!(
        ok.annotations()["pathVariables"],
        json!({"id": "133e4564-e89b-12d3-a456-426614174000"})
    );

    let empty = evaluator
        .evaluate_response(uri, &Method::GET, StatusCode::OK, &json, Some(b"{}".as_slice()))
        .unwrap();
    assert!(!empty.is_valid());
    let failures = messages(&empty);
    assert!(failures.iter().any(|m| m.contains("first-name")), "{failures:?}");
    assert!(failures.iter().any(|m| m.contains("last-name")), "{failures:?}");
}

const ACCOUNTS_SPEC: &str = r#"
openapi: 3.1.0
info:
  title: Accounts
  version: '1'
servers:
  - url: https://api.example.com
paths:
  /acc/{id}:
    post:
      parameters:
        - name: id
          in: path
          required: true
          schema: {type: integer}
        - name: q
          in: query
          schema: {type: integer}
        - name: X-H
          in: header
          schema: {type: boolean}
        - name: c
          in: cookie
          schema: {type: integer}
      requestBody:
        content:
          application/json:
            schema:
              type: object
              required: [x]
      responses:
        200:
          description: ok
"#;

#[test]
fn test_every_location_evaluated_after_first_failure() {
    let evaluator = OpenApiEvaluator::new(common::document(ACCOUNTS_SPEC));
    let results = evaluator
        .evaluate_request(
            "https://api.example.com/acc/zz?q=bad",
            &Method::POST,
            &headers(&[
                ("X-H", "nope"),
                ("Cookie", "c=bad"),
                ("Content-Type", "application/json"),
            ]),
            Some(b"{}".as_slice()),
        )
        .unwrap();
    assert!(!results.is_valid());

    let failures = results.failures();
    assert_eq!(failures.len(), 5, "{failures:?}");
    for index in 0..4 {
        let marker = format!("/parameters/{index}");
        assert!(
            failures.iter().any(|(location, _)| location.contains(&marker)),
            "no failure under {marker}: {failures:?}"
        );
    }
    assert!(failures
        .iter()
        .any(|(location, message)| location.contains("requestBody") && message.contains("\"x\"")));
}
