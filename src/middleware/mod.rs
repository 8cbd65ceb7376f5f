//! # Middleware Module
//!
//! A send-decorator over an HTTP client: evaluate the outgoing request, forward
//! it, evaluate the incoming response, and hand back the response with both
//! results trees.
//!
//! ## Overview
//!
//! ```text
//! request ──► evaluate_request ──► Transport::send ──► evaluate_response ──► EvaluatedResponse
//!                  │                                         │
//!                  └──── throw_on_failure ──► MiddlewareError::Validation
//! ```
//!
//! [`ValidationConfig`](crate::config::ValidationConfig) switches either side off and
//! decides whether failures are raised or only logged. Bodies are buffered as
//! [`Bytes`](bytes::Bytes), so evaluating them never consumes what the caller reads.
//!
//! ## Example
//!
//! ```rust,ignore
//! use brrtcheck::middleware::ValidatingClient;
//! use brrtcheck::{load_document, OpenApiEvaluator, ValidationConfig};
//! use std::sync::Arc;
//!
//! let evaluator = Arc::new(OpenApiEvaluator::new(load_document("openapi.yaml")?));
//! let client = ValidatingClient::new(
//!     reqwest::blocking::Client::new(),
//!     evaluator,
//!     ValidationConfig::default(),
//! );
//! let request = http::Request::get("https://api.example.com/v1/user/42")
//!     .body(bytes::Bytes::new())?;
//! let exchange = client.send(request)?;
//! assert!(exchange.is_valid());
//! ```

mod core;
mod transport;

pub use core::{AsyncTransport, EvaluatedResponse, Transport, ValidatingClient};
