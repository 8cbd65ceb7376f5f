use http::HeaderMap;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::OpenApiEvaluator;
use crate::decode::ParameterStyle;
use crate::document::SpecNode;
use crate::evaluation::{evaluate_schema, OpenApiEvaluationResults};
use crate::exchange::{cookie_values, deep_object_values, header_values, query_values};
use crate::router::RoutePattern;
use crate::spec::{Parameter, ParameterLocation};

/// Where raw parameter values are read from.
pub(super) enum ParameterSource<'a> {
    Request {
        uri: &'a Url,
        headers: &'a HeaderMap,
        pattern: &'a RoutePattern,
    },
    Response {
        headers: &'a HeaderMap,
    },
}

impl ParameterSource<'_> {
    fn raw_values(&self, parameter: &Parameter) -> Vec<String> {
        let name = parameter.name();
        match (self, parameter.location()) {
            (ParameterSource::Request { headers, .. }, ParameterLocation::Header)
            | (ParameterSource::Response { headers }, ParameterLocation::Header) => {
                header_values(headers, name)
            }
            (ParameterSource::Request { pattern, .. }, ParameterLocation::Path) => pattern
                .get(name)
                .map(|v| vec![v.to_string()])
                .unwrap_or_default(),
            (ParameterSource::Request { uri, .. }, ParameterLocation::Query) => {
                if parameter.style() == ParameterStyle::DeepObject {
                    deep_object_values(uri, name)
                } else {
                    query_values(uri, name)
                }
            }
            (ParameterSource::Request { headers, .. }, ParameterLocation::Cookie) => {
                cookie_values(headers, name)
            }
            (ParameterSource::Response { .. }, _) => Vec::new(),
        }
    }
}

impl OpenApiEvaluator {
    /// Evaluate each parameter, appending one detail per parameter that is
    /// present or required.
    pub(super) fn evaluate_parameters(
        &self,
        parent: &mut OpenApiEvaluationResults,
        parameters: &[Parameter],
        source: &ParameterSource<'_>,
    ) {
        for parameter in parameters {
            let values = source.raw_values(parameter);
            let mut node = OpenApiEvaluationResults::for_node(parameter.node());
            if values.is_empty() {
                if parameter.required() {
                    node.fail(format!(
                        "required {} parameter '{}' is missing",
                        parameter.location(),
                        parameter.name()
                    ));
                    parent.push_detail(node);
                }
                continue;
            }

            match self.decode_parameter(parameter, &values) {
                Ok((instance, schema)) => {
                    node.annotate("value", instance.clone());
                    if let Some(schema) = schema {
                        evaluate_schema(self.engine.as_ref(), &mut node, &schema, &instance);
                    }
                }
                Err(message) => {
                    debug!(
                        name = %parameter.name(),
                        location = %parameter.location(),
                        error = %message,
                        "Parameter could not be decoded"
                    );
                    node.fail(message);
                }
            }
            parent.push_detail(node);
        }
    }

    /// The decoded instance plus the schema it must satisfy.
    fn decode_parameter(
        &self,
        parameter: &Parameter,
        values: &[String],
    ) -> Result<(Value, Option<SpecNode>), String> {
        if let Some(custom) = self.custom_decoder(parameter.name(), parameter.location()) {
            let instance = custom.decode(values).map_err(|e| e.to_string())?;
            return Ok((instance, parameter.schema().cloned()));
        }

        let Some(content) = parameter.content() else {
            let instance = parameter.decoder().decode(values).map_err(|e| e.to_string())?;
            return Ok((instance, parameter.schema().cloned()));
        };

        let Some(media) = content.media_types().first() else {
            return Ok((Value::Null, None));
        };
        let [raw] = values else {
            return Err(format!(
                "content parameter '{}' expects exactly one value, got {}",
                parameter.name(),
                values.len()
            ));
        };
        let instance = if media.range().value().is_json() {
            serde_json::from_str(raw)
                .map_err(|e| format!("parameter '{}' is not valid JSON: {e}", parameter.name()))?
        } else {
            Value::String(raw.clone())
        };
        Ok((instance, media.schema().cloned()))
    }
}
