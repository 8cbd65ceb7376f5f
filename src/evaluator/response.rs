use http::{HeaderMap, Method, StatusCode};
use tracing::{debug, info};

use super::parameters::ParameterSource;
use super::request::annotate_route;
use super::{body_content_type, OpenApiEvaluator};
use crate::error::{UndeclaredStatus, UsageError};
use crate::evaluation::OpenApiEvaluationResults;
use crate::exchange::absolute_uri;

impl OpenApiEvaluator {
    /// Evaluate one response to a request for `uri` and `method`.
    ///
    /// The response entry is picked by exact status, then `NXX`, then `default`.
    ///
    /// # Errors
    ///
    /// [`UsageError`] when the URI is not absolute or a body comes without a
    /// `Content-Type`.
    pub fn evaluate_response(
        &self,
        uri: &str,
        method: &Method,
        status: StatusCode,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<OpenApiEvaluationResults, UsageError> {
        let url = absolute_uri(uri)?;
        let body = body.filter(|b| !b.is_empty());
        let content_type = body_content_type(headers, body)?;

        let mut results = OpenApiEvaluationResults::for_node(&self.spec.document().root());
        results.annotate("statusCode", status.as_u16());
        let route = match self.spec.route(&url, method) {
            Ok(route) => route,
            Err(e) => {
                results.fail(e);
                info!(
                    uri = %uri,
                    method = %method,
                    status = status.as_u16(),
                    valid = false,
                    "Response evaluated (unrouted)"
                );
                return Ok(results);
            }
        };
        annotate_route(&mut results, &route);

        let operation = route.operation;
        let mut op_results = OpenApiEvaluationResults::for_node(operation.node());
        match operation.responses().select(status.as_u16()) {
            None => op_results.fail(UndeclaredStatus {
                status: status.as_u16(),
                declared: operation
                    .responses()
                    .entries()
                    .iter()
                    .map(|r| r.key().to_string())
                    .collect(),
            }),
            Some(response) => {
                results.annotate("responseKey", response.key());
                let mut response_results = OpenApiEvaluationResults::for_node(response.node());
                self.evaluate_parameters(
                    &mut response_results,
                    response.headers(),
                    &ParameterSource::Response { headers },
                );
                match (response.content(), body, &content_type) {
                    (Some(content), Some(bytes), Some(content_type)) => {
                        self.evaluate_content(&mut response_results, content, content_type, bytes);
                    }
                    (None, Some(_), _) => debug!(
                        response_key = %response.key(),
                        "Response body present but the response declares no content"
                    ),
                    _ => {}
                }
                op_results.push_detail(response_results);
            }
        }

        results.push_detail(op_results);
        info!(
            uri = %uri,
            method = %method,
            status = status.as_u16(),
            route_pattern = %route.pattern.template(),
            valid = results.is_valid(),
            "Response evaluated"
        );
        Ok(results)
    }
}
