//! # Evaluator Module
//!
//! The facade: evaluate one request or one response against the document and
//! return the complete results tree.
//!
//! ## Overview
//!
//! ```text
//! request URI + method ──► route ──► operation
//!                                     ├── parameters (path, query, header, cookie)
//!                                     │     raw values ─► decoder ─► schema
//!                                     └── request body
//!                                           Content-Type ─► media type ─► schema
//! ```
//!
//! Responses follow the same route, then select the response entry by status
//! (exact, `NXX`, `default`) and evaluate its headers and body.
//!
//! Problems with the traffic (unknown path, undecodable parameter, unexpected
//! media type, schema violations) are recorded as failed reports; evaluation
//! keeps going so every failure shows up in one tree. Only caller mistakes
//! ([`UsageError`]) abort.
//!
//! ## Example
//!
//! ```rust,ignore
//! use brrtcheck::{load_document, OpenApiEvaluator};
//! use http::{HeaderMap, Method};
//!
//! let evaluator = OpenApiEvaluator::new(load_document("openapi.yaml")?);
//! let results = evaluator.evaluate_request(
//!     "https://api.example.com/v1/user/42",
//!     &Method::GET,
//!     &HeaderMap::new(),
//!     None,
//! )?;
//! assert!(results.is_valid());
//! ```

mod body;
mod parameters;
mod request;
mod response;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::decode::ParameterValueDecoder;
use crate::error::{MediaTypeError, UsageError};
use crate::evaluation::{JsonSchemaEvaluator, SchemaEvaluator};
use crate::media_type::MediaTypeValue;
use crate::spec::{OpenApiDocument, ParameterLocation};

type DecoderKey = (String, ParameterLocation);

/// Evaluates HTTP traffic against one OpenAPI document.
///
/// Cheap to clone and safe to share across threads; nothing in it changes
/// after construction.
#[derive(Clone)]
pub struct OpenApiEvaluator {
    spec: Arc<OpenApiDocument>,
    engine: Arc<dyn SchemaEvaluator>,
    decoders: Arc<HashMap<DecoderKey, Arc<dyn ParameterValueDecoder>>>,
}

impl std::fmt::Debug for OpenApiEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiEvaluator")
            .field("title", &self.spec.title())
            .field("paths", &self.spec.paths().len())
            .field("custom_decoders", &self.decoders.len())
            .finish()
    }
}

impl OpenApiEvaluator {
    /// An evaluator with the default schema engine and no custom decoders.
    #[must_use]
    pub fn new(spec: OpenApiDocument) -> Self {
        Self::builder(spec).build()
    }

    #[must_use]
    pub fn builder(spec: OpenApiDocument) -> EvaluatorBuilder {
        EvaluatorBuilder {
            spec,
            base_uri: None,
            engine: None,
            cache_schemas: true,
            decoders: HashMap::new(),
        }
    }

    #[must_use]
    pub fn spec(&self) -> &OpenApiDocument {
        &self.spec
    }

    fn custom_decoder(
        &self,
        name: &str,
        location: ParameterLocation,
    ) -> Option<&Arc<dyn ParameterValueDecoder>> {
        self.decoders.get(&decoder_key(name, location))
    }
}

fn decoder_key(name: &str, location: ParameterLocation) -> DecoderKey {
    let name = if location == ParameterLocation::Header {
        name.to_ascii_lowercase()
    } else {
        name.to_string()
    };
    (name, location)
}

/// Configures an [`OpenApiEvaluator`].
pub struct EvaluatorBuilder {
    spec: OpenApiDocument,
    base_uri: Option<Url>,
    engine: Option<Arc<dyn SchemaEvaluator>>,
    cache_schemas: bool,
    decoders: HashMap<DecoderKey, Arc<dyn ParameterValueDecoder>>,
}

impl EvaluatorBuilder {
    /// Match requests against this base URI instead of the document-level servers.
    #[must_use]
    pub fn base_uri(mut self, base: Url) -> Self {
        self.base_uri = Some(base);
        self
    }

    /// Replace the default JSON Schema engine.
    #[must_use]
    pub fn schema_evaluator(mut self, engine: impl SchemaEvaluator + 'static) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Whether the default engine caches compiled schemas (on by default).
    #[must_use]
    pub fn cache_schemas(mut self, enabled: bool) -> Self {
        self.cache_schemas = enabled;
        self
    }

    /// Use `decoder` for the parameter (name, location) instead of the built-in one.
    #[must_use]
    pub fn decoder(
        mut self,
        name: &str,
        location: ParameterLocation,
        decoder: impl ParameterValueDecoder + 'static,
    ) -> Self {
        self.decoders
            .insert(decoder_key(name, location), Arc::new(decoder));
        self
    }

    #[must_use]
    pub fn build(self) -> OpenApiEvaluator {
        let spec = match &self.base_uri {
            Some(base) => self.spec.with_base_uri(base),
            None => self.spec,
        };
        let engine = self
            .engine
            .unwrap_or_else(|| {
                Arc::new(JsonSchemaEvaluator::new(self.cache_schemas)) as Arc<dyn SchemaEvaluator>
            });
        info!(
            title = %spec.title(),
            paths = spec.paths().len(),
            custom_decoders = self.decoders.len(),
            base_uri = ?self.base_uri.as_ref().map(Url::as_str),
            "OpenAPI evaluator ready"
        );
        OpenApiEvaluator {
            spec: Arc::new(spec),
            engine,
            decoders: Arc::new(self.decoders),
        }
    }
}

/// Content-Type of a body, checked up front.
///
/// A body without a `Content-Type` is a caller mistake. A header that is present
/// but malformed is reported during evaluation.
pub(crate) enum BodyContentType {
    Parsed(MediaTypeValue),
    Malformed(MediaTypeError),
}

pub(crate) fn body_content_type(
    headers: &http::HeaderMap,
    body: Option<&[u8]>,
) -> Result<Option<BodyContentType>, UsageError> {
    if body.is_none() {
        return Ok(None);
    }
    let raw = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(UsageError::MissingContentType)?;
    Ok(Some(match MediaTypeValue::parse(raw) {
        Ok(value) => BodyContentType::Parsed(value),
        Err(e) => BodyContentType::Malformed(e),
    }))
}
