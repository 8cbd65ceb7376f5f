//! [`Transport`] and [`AsyncTransport`] for reqwest clients.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};

use super::core::{AsyncTransport, Transport};

fn buffered(
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
) -> http::Response<Bytes> {
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = version;
    *response.headers_mut() = headers;
    response
}

impl Transport for reqwest::blocking::Client {
    type Error = reqwest::Error;

    fn send(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>, Self::Error> {
        let (parts, body) = request.into_parts();
        let response = self
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body.to_vec())
            .send()?;
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes()?;
        Ok(buffered(status, version, headers, body))
    }
}

impl AsyncTransport for reqwest::Client {
    type Error = reqwest::Error;

    async fn send(&self, request: http::Request<Bytes>) -> Result<http::Response<Bytes>, Self::Error> {
        let (parts, body) = request.into_parts();
        let response = self
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(buffered(status, version, headers, body))
    }
}
