//! # Spec Module
//!
//! The typed OpenAPI 3.1 model: servers, path items, operations, parameters,
//! content maps and responses, built once over a [`Document`](crate::document::Document).
//!
//! ## Overview
//!
//! Parsing is strict and fail-fast. The first structural problem aborts with a
//! [`SpecError`](crate::error::SpecError) naming the JSON pointer at fault:
//!
//! - `openapi` must be `3.1.x`
//! - parameter styles must be legal for their location
//! - path parameters are always required
//! - `(name, location)` is unique within one parameter list
//! - `operationId` is unique among the operations of one path item
//! - content-based parameters carry exactly one media type
//!
//! Reserved headers (`Accept`, `Content-Type`, `Authorization` on requests and
//! `Content-Type` on responses) are dropped from the explicit parameter lists.
//!
//! ## Loading
//!
//! ```rust,ignore
//! use brrtcheck::spec::load_document;
//!
//! let spec = load_document("openapi.yaml")?;
//! for path in spec.paths() {
//!     println!("{}", path.template());
//! }
//! ```

mod build;
mod content;
mod load;
mod operation;
mod parameter;
mod server;
#[cfg(test)]
mod tests;

pub use build::{check_version, OpenApiDocument, DEFAULT_DOCUMENT_URI};
pub use content::{Content, MediaType, RequestBody};
pub use load::{load_document, parse_document_str, DocumentFormat};
pub use operation::{Operation, PathItem, Response, Responses, HTTP_METHODS};
pub use parameter::{
    merge_parameters, parse_parameter_list, parse_response_headers, HeaderContext, Parameter,
    ParameterLocation, RESERVED_REQUEST_HEADERS, RESERVED_RESPONSE_HEADERS,
};
pub use server::{parse_servers, Server, ServerVariable, UrlPart};
