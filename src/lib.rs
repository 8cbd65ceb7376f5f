//! # brrtcheck
//!
//! **brrtcheck** evaluates live HTTP traffic against an
//! [OpenAPI 3.1](https://spec.openapis.org/oas/v3.1.0) document and reports every
//! deviation in one structured results tree, instead of ad-hoc assertions.
//!
//! ## Overview
//!
//! The document is parsed once into an immutable model and shared by every
//! evaluation. Each request (or response) is routed to its operation, each
//! parameter is decoded from its serialization style into a JSON instance, the body
//! is matched to a media type, and every instance is checked by a JSON Schema
//! 2020-12 engine. The outcome mirrors the document: one results node per
//! document node that was evaluated.
//!
//! ## Architecture
//!
//! - **[`document`]** - JSON pointers, local `$ref` resolution, `SpecNode` handles
//! - **[`spec`]** - Loading and the validated model (servers, paths, operations, parameters, content)
//! - **[`router`]** - Path templates and server matching
//! - **[`decode`]** - Parameter style decoding (`simple`, `form`, `matrix`, `label`, ...)
//! - **[`media_type`]** - Media types, ranges and precedence
//! - **[`evaluation`]** - The results tree and the schema engine seam
//! - **[`evaluator`]** - `OpenApiEvaluator`, the request/response entry points
//! - **[`exchange`]** - Glue between [`http`] types and the evaluator
//! - **[`middleware`]** - Send-decorator over blocking and async HTTP clients
//! - **[`config`]** / **[`telemetry`]** - Middleware switches and logging setup
//!
//! ### Evaluation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client as ValidatingClient
//!     participant Eval as OpenApiEvaluator
//!     participant Router as router
//!     participant Decode as decode
//!     participant Schema as SchemaEvaluator
//!     participant Net as Transport
//!
//!     Client->>Eval: evaluate_http_request(&request)
//!     Eval->>Router: route(uri, method)
//!     Router-->>Eval: RouteMatch (operation, server, path variables)
//!     Eval->>Decode: decode path/query/header/cookie values
//!     Decode-->>Eval: JSON instances
//!     Eval->>Schema: evaluate(schema, instance)
//!     Schema-->>Eval: SchemaReport
//!     Eval-->>Client: OpenApiEvaluationResults
//!     Client->>Net: send(request)
//!     Net-->>Client: response
//!     Client->>Eval: evaluate_http_response(&response)
//!     Eval-->>Client: OpenApiEvaluationResults
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use brrtcheck::{load_document, OpenApiEvaluator};
//! use http::{HeaderMap, Method};
//!
//! let spec = load_document("openapi.yaml").expect("Failed to load document");
//! let evaluator = OpenApiEvaluator::new(spec);
//!
//! let results = evaluator
//!     .evaluate_request(
//!         "https://api.example.com/v1/user/42",
//!         &Method::GET,
//!         &HeaderMap::new(),
//!         None,
//!     )
//!     .expect("absolute URI");
//! if !results.is_valid() {
//!     eprintln!("{results}");
//! }
//! ```
//!
//! ## Failure Model
//!
//! A document that is structurally broken fails at load time with a
//! [`SpecError`](error::SpecError) naming the offending pointer. Traffic that does not
//! conform never fails the call: it shows up as failed reports in the tree.
//! Only caller mistakes (relative URI, body without `Content-Type`) return
//! [`UsageError`](error::UsageError).

pub mod config;
pub mod decode;
pub mod document;
pub mod error;
pub mod evaluation;
pub mod evaluator;
pub mod exchange;
pub mod media_type;
pub mod middleware;
pub mod router;
pub mod spec;
pub mod telemetry;

pub use config::ValidationConfig;
pub use error::{MiddlewareError, SpecError, UsageError, ValidationFailure};
pub use evaluation::{JsonSchemaEvaluator, OpenApiEvaluationResults, SchemaEvaluator};
pub use evaluator::{EvaluatorBuilder, OpenApiEvaluator};
pub use exchange::OriginatingRequest;
pub use middleware::{EvaluatedResponse, ValidatingClient};
pub use spec::{load_document, parse_document_str, DocumentFormat, OpenApiDocument, ParameterLocation};
