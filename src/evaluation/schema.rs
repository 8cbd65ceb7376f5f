use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::results::SchemaReport;
use crate::document::{Document, SpecNode};

/// The JSON Schema engine the evaluator delegates to.
///
/// Given a schema node inside the document and an instance, report whether the
/// instance is valid. Implementations must resolve references relative to the
/// document the node belongs to.
pub trait SchemaEvaluator: Send + Sync {
    fn evaluate(&self, schema: &SpecNode, instance: &Value) -> SchemaReport;
}

/// Draft 2020-12 evaluation with the `jsonschema` crate.
///
/// Compiled validators are cached per schema location for the lifetime of the
/// evaluator; the document is read-only, so entries never go stale.
pub struct JsonSchemaEvaluator {
    cache: DashMap<String, Arc<jsonschema::Validator>>,
    enabled: bool,
}

impl std::fmt::Debug for JsonSchemaEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaEvaluator")
            .field("enabled", &self.enabled)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl Default for JsonSchemaEvaluator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl JsonSchemaEvaluator {
    /// `enabled = false` compiles on every call without caching.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        info!(enabled = enabled, "Initializing JSON Schema validator cache");
        Self {
            cache: DashMap::new(),
            enabled,
        }
    }

    /// Number of cached validators.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        let count = self.cache.len();
        self.cache.clear();
        info!(cleared = count, "Schema validator cache cleared");
    }

    /// Cached validator for `schema`, compiling it on a miss.
    ///
    /// # Errors
    ///
    /// The compilation error, as text.
    pub fn get_or_compile(&self, schema: &SpecNode) -> Result<Arc<jsonschema::Validator>, String> {
        let key = schema.location_uri();
        if self.enabled {
            if let Some(validator) = self.cache.get(&key) {
                debug!(schema_location = %key, "Schema validator cache hit");
                return Ok(Arc::clone(validator.value()));
            }
        }

        let wrapper = anchored_schema(schema.document(), schema);
        let validator = match jsonschema::draft202012::new(&wrapper) {
            Ok(v) => Arc::new(v),
            Err(e) => {
                error!(schema_location = %key, error = %e, "Failed to compile JSON Schema");
                return Err(e.to_string());
            }
        };

        if self.enabled {
            let entry = self
                .cache
                .entry(key.clone())
                .or_insert_with(|| Arc::clone(&validator));
            debug!(
                schema_location = %key,
                cache_size = self.cache.len(),
                "Schema validator compiled and cached"
            );
            return Ok(Arc::clone(entry.value()));
        }
        Ok(validator)
    }
}

impl SchemaEvaluator for JsonSchemaEvaluator {
    fn evaluate(&self, schema: &SpecNode, instance: &Value) -> SchemaReport {
        let location = schema.location_uri();
        match self.get_or_compile(schema) {
            Ok(validator) => {
                let errors: Vec<String> =
                    validator.iter_errors(instance).map(|e| e.to_string()).collect();
                SchemaReport::schema_failure(location, errors)
            }
            Err(e) => SchemaReport::schema_failure(
                location,
                vec![format!("schema could not be compiled: {e}")],
            ),
        }
    }
}

/// The document root with a `$ref` to `schema` on top, so local references
/// inside the schema resolve against the whole OpenAPI document.
fn anchored_schema(document: &Document, schema: &SpecNode) -> Value {
    let mut root = match document.root_value() {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    root.remove("$id");
    root.remove("$schema");
    root.insert(
        "$ref".to_string(),
        Value::String(schema.location().to_uri_fragment()),
    );
    Value::Object(root)
}
