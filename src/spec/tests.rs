use http::Method;
use serde_json::{json, Value};
use url::Url;

use super::*;
use crate::decode::ParameterStyle;
use crate::error::SpecError;

fn parse(value: Value) -> Result<OpenApiDocument, SpecError> {
    OpenApiDocument::from_value(value, Url::parse("urn:test").unwrap())
}

fn with_paths(paths: Value) -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {"title": "Users", "version": "1"},
        "paths": paths
    })
}

fn with_parameters(parameters: Value) -> Value {
    with_paths(json!({"/u/{id}": {"get": {"parameters": parameters}}}))
}

#[test]
fn test_version_range() {
    for ok in ["3.1.0", "3.1.1", "3.1.9"] {
        assert!(check_version(ok).is_ok(), "{ok}");
    }
    for bad in ["3.0.3", "3.2.0", "4.1.0", "3.1", "three"] {
        assert!(
            matches!(check_version(bad), Err(SpecError::UnsupportedVersion { .. })),
            "{bad}"
        );
    }
}

#[test]
fn test_missing_info_fails() {
    let err = parse(json!({"openapi": "3.1.0", "paths": {}})).unwrap_err();
    assert!(matches!(err, SpecError::MissingKey { key, .. } if key == "info"));
}

#[test]
fn test_paths_in_declaration_order() {
    let spec = parse(with_paths(json!({
        "/b": {"get": {}},
        "/a": {"get": {}, "post": {}},
        "x-internal": {}
    })))
    .unwrap();
    let templates: Vec<&str> = spec.paths().iter().map(|p| p.template().as_str()).collect();
    assert_eq!(templates, vec!["/b", "/a"]);
    assert_eq!(spec.path("/a").unwrap().operations().len(), 2);
    assert_eq!(spec.servers().len(), 1);
    assert_eq!(spec.servers()[0].url(), "/");
}

#[test]
fn test_path_parameter_always_required() {
    let spec = parse(with_parameters(json!([
        {"name": "id", "in": "path", "schema": {"type": "string"}}
    ])))
    .unwrap();
    let op = spec.path("/u/{id}").unwrap().operation(&Method::GET).unwrap();
    assert!(op.parameters()[0].required());

    let err = parse(with_parameters(json!([
        {"name": "id", "in": "path", "required": false}
    ])))
    .unwrap_err();
    assert!(matches!(err, SpecError::InvalidValue { .. }));
}

#[test]
fn test_style_allowed_per_location() {
    let err = parse(with_parameters(json!([
        {"name": "X-Trace", "in": "header", "style": "form"}
    ])))
    .unwrap_err();
    assert!(matches!(err, SpecError::DisallowedStyle { style, .. } if style == "form"));

    let err = parse(with_parameters(json!([
        {"name": "q", "in": "query", "style": "matrix"}
    ])))
    .unwrap_err();
    assert!(matches!(err, SpecError::DisallowedStyle { .. }));

    let spec = parse(with_parameters(json!([
        {"name": "id", "in": "path", "style": "label", "explode": true},
        {"name": "q", "in": "query", "style": "deepObject", "explode": true},
        {"name": "c", "in": "cookie"}
    ])))
    .unwrap();
    let params = spec.path("/u/{id}").unwrap().operations()[0].parameters();
    assert_eq!(params[0].style(), ParameterStyle::Label);
    assert!(params[0].explode());
    assert_eq!(params[2].style(), ParameterStyle::Form);
    assert!(params[2].explode());
}

#[test]
fn test_duplicate_parameter_rejected() {
    let err = parse(with_parameters(json!([
        {"name": "q", "in": "query"},
        {"name": "q", "in": "query"}
    ])))
    .unwrap_err();
    assert!(matches!(err, SpecError::DuplicateParameter { name, .. } if name == "q"));

    // same name, different location is fine
    assert!(parse(with_parameters(json!([
        {"name": "q", "in": "query"},
        {"name": "q", "in": "header"}
    ])))
    .is_ok());
}

#[test]
fn test_reserved_headers_dropped() {
    let spec = parse(with_parameters(json!([
        {"name": "Accept", "in": "header"},
        {"name": "authorization", "in": "header"},
        {"name": "X-Request-Id", "in": "header"}
    ])))
    .unwrap();
    let params = spec.path("/u/{id}").unwrap().operations()[0].parameters();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name(), "X-Request-Id");
}

#[test]
fn test_operation_parameters_override_path_parameters() {
    let spec = parse(with_paths(json!({
        "/u/{id}": {
            "parameters": [
                {"name": "id", "in": "path", "schema": {"type": "string"}},
                {"name": "verbose", "in": "query"}
            ],
            "get": {
                "parameters": [{"name": "id", "in": "path", "schema": {"type": "integer"}}]
            }
        }
    })))
    .unwrap();
    let params = spec.path("/u/{id}").unwrap().operations()[0].parameters();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name(), "id");
    assert_eq!(params[0].schema().unwrap().value(), &json!({"type": "integer"}));
    assert_eq!(params[1].name(), "verbose");
}

#[test]
fn test_duplicate_operation_id_rejected() {
    let err = parse(with_paths(json!({
        "/u": {
            "get": {"operationId": "users"},
            "post": {"operationId": "users"}
        }
    })))
    .unwrap_err();
    assert!(matches!(err, SpecError::DuplicateOperationId { operation_id, .. } if operation_id == "users"));

    // same id on different paths is not checked here
    assert!(parse(with_paths(json!({
        "/a": {"get": {"operationId": "x"}},
        "/b": {"get": {"operationId": "x"}}
    })))
    .is_ok());
}

#[test]
fn test_content_parameter_needs_one_entry() {
    let err = parse(with_parameters(json!([{
        "name": "filter", "in": "query",
        "content": {"application/json": {}, "text/plain": {}}
    }])))
    .unwrap_err();
    assert!(matches!(err, SpecError::InvalidValue { .. }));
}

#[test]
fn test_content_sorted_by_precedence() {
    let spec = parse(with_paths(json!({
        "/u": {"post": {
            "requestBody": {"content": {
                "*/*": {},
                "application/*": {},
                "application/json": {"schema": {"type": "object"}}
            }}
        }}
    })))
    .unwrap();
    let body = spec.path("/u").unwrap().operations()[0].request_body().unwrap();
    assert!(!body.required());
    let keys: Vec<&str> = body
        .content()
        .media_types()
        .iter()
        .map(|m| m.range().as_str())
        .collect();
    assert_eq!(keys, vec!["application/json", "application/*", "*/*"]);
    assert!(body.content().media_types()[0].schema().is_some());
}

#[test]
fn test_invalid_content_key() {
    let err = parse(with_paths(json!({
        "/u": {"post": {"requestBody": {"content": {"json": {}}}}}
    })))
    .unwrap_err();
    assert!(matches!(err, SpecError::InvalidMediaType { .. }));
}

#[test]
fn test_response_selection_order() {
    let spec = parse(with_paths(json!({
        "/u": {"get": {"responses": {
            "200": {"description": "ok"},
            "2XX": {"description": "success"},
            "default": {"description": "other"}
        }}}
    })))
    .unwrap();
    let responses = spec.path("/u").unwrap().operations()[0].responses();
    assert_eq!(responses.select(200).unwrap().key(), "200");
    assert_eq!(responses.select(204).unwrap().key(), "2XX");
    assert_eq!(responses.select(404).unwrap().key(), "default");
}

#[test]
fn test_response_headers_skip_content_type() {
    let spec = parse(with_paths(json!({
        "/u": {"get": {"responses": {"200": {
            "description": "ok",
            "headers": {
                "Content-Type": {"schema": {"type": "string"}},
                "X-Rate-Limit": {"schema": {"type": "integer"}}
            }
        }}}}
    })))
    .unwrap();
    let response = spec.path("/u").unwrap().operations()[0].responses().select(200).unwrap();
    assert_eq!(response.headers().len(), 1);
    assert_eq!(response.headers()[0].name(), "X-Rate-Limit");
    assert_eq!(response.headers()[0].location(), ParameterLocation::Header);
}

#[test]
fn test_bad_response_key() {
    let err = parse(with_paths(json!({
        "/u": {"get": {"responses": {"ok": {"description": "ok"}}}}
    })))
    .unwrap_err();
    assert!(matches!(err, SpecError::InvalidValue { .. }));
}

#[test]
fn test_server_templates() {
    let mut doc = with_paths(json!({}));
    doc["servers"] = json!([
        {"url": "https://{env}.example.com/v1", "variables": {
            "env": {"default": "api", "enum": ["api", "staging"]}
        }},
        {"url": "/relative"}
    ]);
    let spec = parse(doc).unwrap();
    let server = &spec.servers()[0];
    assert_eq!(server.variables()[0].candidates().collect::<Vec<_>>(), vec!["api", "staging"]);
    assert_eq!(
        server.authority_parts().unwrap(),
        &[UrlPart::Variable(0), UrlPart::Literal(".example.com".to_string())]
    );
    assert_eq!(server.path_parts(), &[UrlPart::Literal("v1".to_string())]);
    assert!(spec.servers()[1].authority_parts().is_none());
}

#[test]
fn test_server_template_errors() {
    for (url, vars) in [
        ("https://{env.example.com", json!({"env": {"default": "a"}})),
        ("https://{nope}.example.com", json!({})),
        ("https://a}.example.com", json!({})),
    ] {
        let mut doc = with_paths(json!({}));
        doc["servers"] = json!([{"url": url, "variables": vars}]);
        assert!(
            matches!(parse(doc), Err(SpecError::MalformedServerUrl { .. })),
            "{url}"
        );
    }

    let mut doc = with_paths(json!({}));
    doc["servers"] = json!([{"url": "https://{env}", "variables": {
        "env": {"default": "prod", "enum": ["a", "b"]}
    }}]);
    assert!(matches!(parse(doc), Err(SpecError::InvalidValue { .. })));
}

#[test]
fn test_reference_cycle_surfaces() {
    let mut doc = with_paths(json!({"/u": {"$ref": "#/x-loop/a"}}));
    doc["x-loop"] = json!({"a": {"$ref": "#/x-loop/b"}, "b": {"$ref": "#/x-loop/a"}});
    assert!(matches!(parse(doc), Err(SpecError::ReferenceCycle { .. })));
}

#[test]
fn test_referenced_parameter_keeps_trail() {
    let mut doc = with_parameters(json!([{"$ref": "#/components/parameters/Id"}]));
    doc["components"] = json!({"parameters": {"Id": {"name": "id", "in": "path"}}});
    let spec = parse(doc).unwrap();
    let param = &spec.path("/u/{id}").unwrap().operations()[0].parameters()[0];
    assert_eq!(param.node().location().as_str(), "/components/parameters/Id");
    assert_eq!(
        param.node().trail().as_str(),
        "/paths/~1u~1{id}/get/parameters/0/$ref"
    );
}
