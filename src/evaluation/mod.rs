//! # Evaluation Module
//!
//! The per-evaluation results tree and the bridge to the JSON Schema engine.
//!
//! ## Overview
//!
//! Every evaluation builds a fresh [`OpenApiEvaluationResults`] tree that mirrors
//! the parts of the document it visited: operation, parameters, request body,
//! media type, schema. Each node carries:
//!
//! - `evaluationPath`: the trail through the document, `$ref` hops included
//! - `specificationLocation`: the canonical URI of the spec node
//! - child details and [`SchemaReport`]s, both append-only
//!
//! A node is valid when all its reports and all its children are valid, so
//! adding a failure anywhere makes every ancestor invalid.
//!
//! Schemas are handed to a [`SchemaEvaluator`]; the default is
//! [`JsonSchemaEvaluator`], which compiles Draft 2020-12 validators with the
//! `jsonschema` crate and caches them per schema location.

mod results;
mod schema;

pub use results::{OpenApiEvaluationResults, SchemaReport};
pub use schema::{JsonSchemaEvaluator, SchemaEvaluator};

use serde_json::Value;

use crate::document::SpecNode;

/// Evaluate `instance` against `schema` and attach the outcome under `parent`.
pub fn evaluate_schema(
    engine: &dyn SchemaEvaluator,
    parent: &mut OpenApiEvaluationResults,
    schema: &SpecNode,
    instance: &Value,
) {
    let mut node = OpenApiEvaluationResults::for_node(schema);
    node.push_report(engine.evaluate(schema, instance));
    parent.push_detail(node);
}
