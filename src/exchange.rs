//! Reading raw parameter values out of an HTTP exchange, and the glue between
//! [`http`] types and the evaluator entry points.

use http::header::{HeaderMap, COOKIE};
use http::Method;
use url::Url;

use crate::error::UsageError;
use crate::evaluation::OpenApiEvaluationResults;
use crate::evaluator::OpenApiEvaluator;

/// The request a response answers, attached as a response extension.
///
/// [`OpenApiEvaluator::evaluate_http_response`] needs it to route the response
/// back to its operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginatingRequest {
    pub uri: String,
    pub method: Method,
}

impl OriginatingRequest {
    #[must_use]
    pub fn of<B>(request: &http::Request<B>) -> Self {
        Self {
            uri: request.uri().to_string(),
            method: request.method().clone(),
        }
    }
}

/// Parse and check that the request URI is absolute.
///
/// # Errors
///
/// [`UsageError::MissingUri`] for empty, relative or unparsable URIs.
pub fn absolute_uri(raw: &str) -> Result<Url, UsageError> {
    match Url::parse(raw) {
        Ok(url) if url.has_host() => Ok(url),
        _ => Err(UsageError::MissingUri(raw.to_string())),
    }
}

/// All values of a header joined with `,`; empty when the header is absent.
#[must_use]
pub fn header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        Vec::new()
    } else {
        vec![values.join(",")]
    }
}

/// Cookies from every `Cookie` header, in order.
#[must_use]
pub fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|c| c.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Values of the cookie `name`.
#[must_use]
pub fn cookie_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    parse_cookies(headers)
        .into_iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v)
        .collect()
}

/// Decoded values of the query parameter `name`, in order of appearance.
#[must_use]
pub fn query_values(uri: &Url, name: &str) -> Vec<String> {
    uri.query_pairs()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .collect()
}

/// `name[prop]=value` entries for a deepObject query parameter.
#[must_use]
pub fn deep_object_values(uri: &Url, name: &str) -> Vec<String> {
    uri.query_pairs()
        .filter(|(k, _)| {
            k.strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('[') && rest.ends_with(']'))
        })
        .map(|(k, v)| format!("{k}={v}"))
        .collect()
}

impl OpenApiEvaluator {
    /// Evaluate an [`http::Request`]; its URI must be absolute.
    ///
    /// # Errors
    ///
    /// See [`OpenApiEvaluator::evaluate_request`].
    pub fn evaluate_http_request<B: AsRef<[u8]>>(
        &self,
        request: &http::Request<B>,
    ) -> Result<OpenApiEvaluationResults, UsageError> {
        self.evaluate_request(
            &request.uri().to_string(),
            request.method(),
            request.headers(),
            Some(request.body().as_ref()),
        )
    }

    /// Evaluate an [`http::Response`] carrying an [`OriginatingRequest`] extension.
    ///
    /// # Errors
    ///
    /// [`UsageError::UnknownRequest`] without the extension, otherwise see
    /// [`OpenApiEvaluator::evaluate_response`].
    pub fn evaluate_http_response<B: AsRef<[u8]>>(
        &self,
        response: &http::Response<B>,
    ) -> Result<OpenApiEvaluationResults, UsageError> {
        let origin = response
            .extensions()
            .get::<OriginatingRequest>()
            .ok_or(UsageError::UnknownRequest)?;
        self.evaluate_response(
            &origin.uri,
            &origin.method,
            response.status(),
            response.headers(),
            Some(response.body().as_ref()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_cookies() {
        let mut h = HeaderMap::new();
        h.append(COOKIE, HeaderValue::from_static("a=b; c=d"));
        h.append(COOKIE, HeaderValue::from_static("a=e; flag"));
        assert_eq!(
            parse_cookies(&h),
            vec![
                ("a".to_string(), "b".to_string()),
                ("c".to_string(), "d".to_string()),
                ("a".to_string(), "e".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
        assert_eq!(cookie_values(&h, "a"), vec!["b", "e"]);
    }

    #[test]
    fn test_header_values_joined() {
        let mut h = HeaderMap::new();
        h.append("x-ids", HeaderValue::from_static("1"));
        h.append("x-ids", HeaderValue::from_static("2,3"));
        assert_eq!(header_values(&h, "X-Ids"), vec!["1,2,3"]);
        assert!(header_values(&h, "x-missing").is_empty());
    }

    #[test]
    fn test_query_values() {
        let uri = Url::parse("http://h/p?id=3&id=4&name=a%20b&color[R]=1&colors=x").unwrap();
        assert_eq!(query_values(&uri, "id"), vec!["3", "4"]);
        assert_eq!(query_values(&uri, "name"), vec!["a b"]);
        assert_eq!(deep_object_values(&uri, "color"), vec!["color[R]=1"]);
    }

    #[test]
    fn test_absolute_uri() {
        assert!(absolute_uri("https://api.example.com/v1").is_ok());
        assert_eq!(
            absolute_uri("/v1/user"),
            Err(UsageError::MissingUri("/v1/user".to_string()))
        );
        assert!(absolute_uri("").is_err());
    }
}
