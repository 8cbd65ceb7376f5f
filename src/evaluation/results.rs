use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::document::{JsonPointer, SpecNode};

/// Outcome of one schema evaluation, or of a check performed by the engine
/// itself (routing, decoding, media type selection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaReport {
    pub valid: bool,
    /// Location of the schema that produced the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SchemaReport {
    #[must_use]
    pub fn success(schema_location: impl Into<String>) -> Self {
        Self {
            valid: true,
            schema_location: Some(schema_location.into()),
            errors: Vec::new(),
        }
    }

    /// A failed check with no schema behind it.
    #[must_use]
    pub fn failure(message: impl fmt::Display) -> Self {
        Self {
            valid: false,
            schema_location: None,
            errors: vec![message.to_string()],
        }
    }

    #[must_use]
    pub fn schema_failure(schema_location: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            schema_location: Some(schema_location.into()),
            errors,
        }
    }
}

/// One node of the results tree.
///
/// Mirrors the traversal of the document: each node names the evaluation path
/// (the trail through the document, `$ref` hops included) and the canonical
/// location of the spec node it reports on. Children and reports are
/// append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiEvaluationResults {
    evaluation_path: JsonPointer,
    specification_location: String,
    details: Vec<OpenApiEvaluationResults>,
    schema_evaluation_results: Vec<SchemaReport>,
    annotations: Map<String, Value>,
}

impl OpenApiEvaluationResults {
    #[must_use]
    pub fn new(evaluation_path: JsonPointer, specification_location: impl Into<String>) -> Self {
        Self {
            evaluation_path,
            specification_location: specification_location.into(),
            details: Vec::new(),
            schema_evaluation_results: Vec::new(),
            annotations: Map::new(),
        }
    }

    /// A node reporting on `node`.
    #[must_use]
    pub fn for_node(node: &SpecNode) -> Self {
        Self::new(node.trail().clone(), node.location_uri())
    }

    /// True when every report in this subtree is valid; vacuously true.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.schema_evaluation_results.iter().all(|r| r.valid)
            && self.details.iter().all(OpenApiEvaluationResults::is_valid)
    }

    #[must_use]
    pub fn evaluation_path(&self) -> &JsonPointer {
        &self.evaluation_path
    }

    #[must_use]
    pub fn specification_location(&self) -> &str {
        &self.specification_location
    }

    #[must_use]
    pub fn details(&self) -> &[OpenApiEvaluationResults] {
        &self.details
    }

    #[must_use]
    pub fn schema_evaluation_results(&self) -> &[SchemaReport] {
        &self.schema_evaluation_results
    }

    #[must_use]
    pub fn annotations(&self) -> &Map<String, Value> {
        &self.annotations
    }

    pub fn push_detail(&mut self, child: OpenApiEvaluationResults) {
        self.details.push(child);
    }

    pub fn push_report(&mut self, report: SchemaReport) {
        self.schema_evaluation_results.push(report);
    }

    /// Record a failed check on this node.
    pub fn fail(&mut self, message: impl fmt::Display) {
        self.push_report(SchemaReport::failure(message));
    }

    pub fn annotate(&mut self, key: &str, value: impl Into<Value>) {
        self.annotations.insert(key.to_string(), value.into());
    }

    /// Every failure message in the subtree, depth-first, paired with its specification location.
    #[must_use]
    pub fn failures(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_failures(&mut out);
        out
    }

    fn collect_failures<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        for report in self.schema_evaluation_results.iter().filter(|r| !r.valid) {
            for error in &report.errors {
                out.push((self.specification_location.as_str(), error.as_str()));
            }
        }
        for child in &self.details {
            child.collect_failures(out);
        }
    }

    /// The whole tree, valid subtrees included.
    #[must_use]
    pub fn to_verbose_json(&self) -> Value {
        let mut map = self.header();
        map.insert(
            "details".to_string(),
            Value::Array(self.details.iter().map(Self::to_verbose_json).collect()),
        );
        map.insert(
            "schemaEvaluationResults".to_string(),
            serde_json::to_value(&self.schema_evaluation_results).unwrap_or(Value::Null),
        );
        Value::Object(map)
    }

    fn header(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("valid".to_string(), Value::Bool(self.is_valid()));
        map.insert(
            "evaluationPath".to_string(),
            Value::String(self.evaluation_path.to_string()),
        );
        map.insert(
            "specificationLocation".to_string(),
            Value::String(self.specification_location.clone()),
        );
        if !self.annotations.is_empty() {
            map.insert(
                "annotations".to_string(),
                Value::Object(self.annotations.clone()),
            );
        }
        map
    }
}

/// Serializes the tree with valid subtrees elided: a valid node keeps only its
/// header, an invalid one lists its invalid children and failed reports.
impl Serialize for OpenApiEvaluationResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let valid = self.is_valid();
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("valid", &valid)?;
        map.serialize_entry("evaluationPath", self.evaluation_path.as_str())?;
        map.serialize_entry("specificationLocation", &self.specification_location)?;
        if !self.annotations.is_empty() {
            map.serialize_entry("annotations", &self.annotations)?;
        }
        if !valid {
            let failed_details: Vec<&OpenApiEvaluationResults> =
                self.details.iter().filter(|d| !d.is_valid()).collect();
            if !failed_details.is_empty() {
                map.serialize_entry("details", &failed_details)?;
            }
            let failed_reports: Vec<&SchemaReport> = self
                .schema_evaluation_results
                .iter()
                .filter(|r| !r.valid)
                .collect();
            if !failed_reports.is_empty() {
                map.serialize_entry("schemaEvaluationResults", &failed_reports)?;
            }
        }
        map.end()
    }
}

impl fmt::Display for OpenApiEvaluationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid ({})", self.specification_location);
        }
        write!(f, "invalid ({})", self.specification_location)?;
        for (location, error) in self.failures() {
            write!(f, "\n  {location}: {error}")?;
        }
        Ok(())
    }
}
