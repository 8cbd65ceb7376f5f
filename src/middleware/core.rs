use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::error::{MiddlewareError, ValidationFailure};
use crate::evaluation::OpenApiEvaluationResults;
use crate::evaluator::OpenApiEvaluator;
use crate::exchange::OriginatingRequest;

/// A blocking HTTP client.
pub trait Transport {
    type Error;

    /// Send the request and buffer the whole response body.
    fn send(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>, Self::Error>;
}

/// An async HTTP client.
pub trait AsyncTransport: Sync {
    type Error: Send;

    /// Send the request and buffer the whole response body.
    fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> impl Future<Output = Result<http::Response<Bytes>, Self::Error>> + Send;
}

/// A response together with the evaluations performed on its exchange.
///
/// A result is `None` when evaluation of that side is switched off.
#[derive(Debug)]
pub struct EvaluatedResponse {
    /// Carries an [`OriginatingRequest`] extension.
    pub response: http::Response<Bytes>,
    pub request_results: Option<OpenApiEvaluationResults>,
    pub response_results: Option<OpenApiEvaluationResults>,
}

impl EvaluatedResponse {
    /// True unless one of the evaluations failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.request_results.as_ref().is_none_or(OpenApiEvaluationResults::is_valid)
            && self.response_results.as_ref().is_none_or(OpenApiEvaluationResults::is_valid)
    }
}

/// Send-decorator that evaluates each exchange against the document.
#[derive(Debug, Clone)]
pub struct ValidatingClient<T> {
    transport: T,
    evaluator: Arc<OpenApiEvaluator>,
    config: ValidationConfig,
}

impl<T> ValidatingClient<T> {
    pub fn new(transport: T, evaluator: Arc<OpenApiEvaluator>, config: ValidationConfig) -> Self {
        Self {
            transport,
            evaluator,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    #[must_use]
    pub fn evaluator(&self) -> &OpenApiEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn check_request<E>(
        &self,
        request: &http::Request<Bytes>,
    ) -> Result<Option<OpenApiEvaluationResults>, MiddlewareError<E>> {
        if !self.config.evaluate_requests {
            return Ok(None);
        }
        let results = self.evaluator.evaluate_http_request(request)?;
        self.verdict("request", request.uri(), results).map(Some)
    }

    fn check_response<E>(
        &self,
        uri: &http::Uri,
        response: &http::Response<Bytes>,
    ) -> Result<Option<OpenApiEvaluationResults>, MiddlewareError<E>> {
        if !self.config.evaluate_responses {
            return Ok(None);
        }
        let results = self.evaluator.evaluate_http_response(response)?;
        self.verdict("response", uri, results).map(Some)
    }

    fn verdict<E>(
        &self,
        phase: &'static str,
        uri: &http::Uri,
        results: OpenApiEvaluationResults,
    ) -> Result<OpenApiEvaluationResults, MiddlewareError<E>> {
        if results.is_valid() {
            debug!(phase = phase, uri = %uri, "Exchange conforms");
            return Ok(results);
        }
        let (count, first_failure) = {
            let failures = results.failures();
            let first = failures
                .first()
                .map(|(location, message)| format!("{location}: {message}"));
            (failures.len(), first)
        };
        warn!(
            phase = phase,
            uri = %uri,
            failures = count,
            first_failure = ?first_failure,
            throw_on_failure = self.config.throw_on_failure,
            "OpenAPI evaluation failed"
        );
        if self.config.throw_on_failure {
            return Err(MiddlewareError::Validation(Box::new(ValidationFailure {
                phase,
                results,
            })));
        }
        Ok(results)
    }
}

impl<T: Transport> ValidatingClient<T> {
    /// Evaluate the request, send it, evaluate the response.
    ///
    /// With `throw_on_failure` a failing request is not sent.
    ///
    /// # Errors
    ///
    /// Transport errors, [`UsageError`](crate::error::UsageError)s, and validation
    /// failures when `throw_on_failure` is set.
    pub fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<EvaluatedResponse, MiddlewareError<T::Error>> {
        let request_results = self.check_request(&request)?;
        let origin = OriginatingRequest::of(&request);
        let uri = request.uri().clone();
        let mut response = self
            .transport
            .send(request)
            .map_err(MiddlewareError::Transport)?;
        response.extensions_mut().insert(origin);
        let response_results = self.check_response(&uri, &response)?;
        Ok(EvaluatedResponse {
            response,
            request_results,
            response_results,
        })
    }
}

impl<T: AsyncTransport> ValidatingClient<T> {
    /// Async form of [`ValidatingClient::send`].
    ///
    /// Firing `cancel` aborts the outstanding transport call, and any evaluation
    /// not yet started, with [`MiddlewareError::Cancelled`].
    ///
    /// # Errors
    ///
    /// As [`ValidatingClient::send`], plus [`MiddlewareError::Cancelled`].
    pub async fn send_async(
        &self,
        request: http::Request<Bytes>,
        cancel: &CancellationToken,
    ) -> Result<EvaluatedResponse, MiddlewareError<T::Error>> {
        if cancel.is_cancelled() {
            return Err(MiddlewareError::Cancelled);
        }
        let request_results = self.check_request(&request)?;
        let origin = OriginatingRequest::of(&request);
        let uri = request.uri().clone();

        let mut response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(MiddlewareError::Cancelled),
            sent = self.transport.send(request) => sent.map_err(MiddlewareError::Transport)?,
        };
        if cancel.is_cancelled() {
            return Err(MiddlewareError::Cancelled);
        }
        response.extensions_mut().insert(origin);
        let response_results = self.check_response(&uri, &response)?;
        Ok(EvaluatedResponse {
            response,
            request_results,
            response_results,
        })
    }
}
