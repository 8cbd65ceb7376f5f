use serde_json::Value;
use tracing::debug;

use super::{BodyContentType, OpenApiEvaluator};
use crate::evaluation::{evaluate_schema, OpenApiEvaluationResults};
use crate::spec::Content;

impl OpenApiEvaluator {
    /// Select the media type for the body and evaluate the body against its schema.
    ///
    /// JSON media types parse the body; anything else is evaluated as a string.
    pub(super) fn evaluate_content(
        &self,
        parent: &mut OpenApiEvaluationResults,
        content: &Content,
        content_type: &BodyContentType,
        body: &[u8],
    ) {
        let mut node = OpenApiEvaluationResults::for_node(content.node());
        let concrete = match content_type {
            BodyContentType::Parsed(value) => value,
            BodyContentType::Malformed(error) => {
                node.fail(error);
                parent.push_detail(node);
                return;
            }
        };
        node.annotate("contentType", concrete.to_string());

        let media = match content.select(concrete) {
            Ok(media) => media,
            Err(mismatch) => {
                debug!(error = %mismatch, "No media type matches the body");
                node.fail(mismatch);
                parent.push_detail(node);
                return;
            }
        };

        let mut media_node = OpenApiEvaluationResults::for_node(media.node());
        let instance = if concrete.is_json() {
            match serde_json::from_slice::<Value>(body) {
                Ok(v) => Some(v),
                Err(e) => {
                    media_node.fail(format!("body is not valid JSON: {e}"));
                    None
                }
            }
        } else {
            Some(Value::String(String::from_utf8_lossy(body).into_owned()))
        };
        if let (Some(instance), Some(schema)) = (instance, media.schema()) {
            evaluate_schema(self.engine.as_ref(), &mut media_node, schema, &instance);
        }
        node.push_detail(media_node);
        parent.push_detail(node);
    }
}
