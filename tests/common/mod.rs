#![allow(dead_code)]

use brrtcheck::{parse_document_str, DocumentFormat, OpenApiDocument, OpenApiEvaluator};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::io::Write;

/// Users API used across the integration tests.
pub const USER_SPEC: &str = r##"
openapi: 3.1.0
info:
  title: Users
  version: 1.0.0
servers:
  - url: https://{env}.example.com/v1
    variables:
      env:
        default: api
        enum: [api, staging]
paths:
  /user/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema:
          $ref: '#/components/schemas/Id'
    get:
      operationId: getUser
      parameters:
        - name: fields
          in: query
          schema:
            type: array
            items:
              type: string
        - name: X-Request-Id
          in: header
          required: true
          schema:
            type: string
            minLength: 4
      responses:
        200:
          description: The user
          headers:
            X-Rate-Limit:
              required: true
              schema:
                type: integer
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/User'
        4XX:
          description: Client error
          content:
            application/problem+json:
              schema:
                type: object
                required: [title]
        default:
          description: Anything else
    put:
      operationId: updateUser
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/User'
          text/*:
            schema:
              type: string
              maxLength: 10
      responses:
        204:
          description: Updated
  /user:
    post:
      operationId: createUser
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/User'
      responses:
        201:
          description: Created
components:
  schemas:
    Id:
      type: integer
      minimum: 1
    User:
      type: object
      required: [first-name, last-name]
      properties:
        first-name:
          type: string
        last-name:
          type: string
"##;

pub fn document(yaml: &str) -> OpenApiDocument {
    parse_document_str(yaml, DocumentFormat::Yaml).expect("document should parse")
}

pub fn evaluator() -> OpenApiEvaluator {
    OpenApiEvaluator::new(document(USER_SPEC))
}

pub fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    map
}

/// A named temp file with the given extension; removed on drop.
pub fn temp_document(content: &str, ext: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("brrtcheck_")
        .suffix(&format!(".{ext}"))
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Failure messages of a results tree, flattened.
pub fn messages(results: &brrtcheck::OpenApiEvaluationResults) -> Vec<String> {
    results
        .failures()
        .into_iter()
        .map(|(_, message)| message.to_string())
        .collect()
}
