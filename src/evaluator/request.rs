use http::{HeaderMap, Method};
use tracing::{debug, info};

use super::parameters::ParameterSource;
use super::{body_content_type, OpenApiEvaluator};
use crate::error::UsageError;
use crate::evaluation::OpenApiEvaluationResults;
use crate::exchange::absolute_uri;
use crate::router::RouteMatch;

impl OpenApiEvaluator {
    /// Evaluate one request.
    ///
    /// An empty body counts as no body.
    ///
    /// # Errors
    ///
    /// [`UsageError`] when the URI is not absolute or a body comes without a
    /// `Content-Type`. Everything else ends up in the returned tree.
    pub fn evaluate_request(
        &self,
        uri: &str,
        method: &Method,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<OpenApiEvaluationResults, UsageError> {
        let url = absolute_uri(uri)?;
        let body = body.filter(|b| !b.is_empty());
        let content_type = body_content_type(headers, body)?;

        let mut results = OpenApiEvaluationResults::for_node(&self.spec.document().root());
        let route = match self.spec.route(&url, method) {
            Ok(route) => route,
            Err(e) => {
                results.fail(e);
                info!(uri = %uri, method = %method, valid = false, "Request evaluated (unrouted)");
                return Ok(results);
            }
        };
        annotate_route(&mut results, &route);

        let operation = route.operation;
        let mut op_results = OpenApiEvaluationResults::for_node(operation.node());
        self.evaluate_parameters(
            &mut op_results,
            operation.parameters(),
            &ParameterSource::Request {
                uri: &url,
                headers,
                pattern: &route.pattern,
            },
        );

        if let Some(request_body) = operation.request_body() {
            match (body, &content_type) {
                (Some(bytes), Some(content_type)) => {
                    let mut body_results = OpenApiEvaluationResults::for_node(request_body.node());
                    self.evaluate_content(
                        &mut body_results,
                        request_body.content(),
                        content_type,
                        bytes,
                    );
                    op_results.push_detail(body_results);
                }
                _ if request_body.required() => {
                    let mut body_results = OpenApiEvaluationResults::for_node(request_body.node());
                    body_results.fail("request body is required but absent");
                    op_results.push_detail(body_results);
                }
                _ => {}
            }
        } else if body.is_some() {
            debug!(
                uri = %uri,
                route_pattern = %route.pattern.template(),
                "Request body present but the operation declares none"
            );
        }

        results.push_detail(op_results);
        info!(
            uri = %uri,
            method = %method,
            route_pattern = %route.pattern.template(),
            valid = results.is_valid(),
            "Request evaluated"
        );
        Ok(results)
    }
}

/// Root annotations describing the resolved route.
pub(super) fn annotate_route(results: &mut OpenApiEvaluationResults, route: &RouteMatch<'_>) {
    results.annotate("pathTemplate", route.pattern.template());
    results.annotate("method", route.operation.method().as_str());
    results.annotate("pathVariables", route.pattern.to_json());
    results.annotate("server", route.server.url());
    if let Some(id) = route.operation.operation_id() {
        results.annotate("operationId", id);
    }
}
