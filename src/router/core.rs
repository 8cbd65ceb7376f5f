use http::Method;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::path::{split_path, ParamVec};
use crate::error::RouteError;
use crate::spec::{OpenApiDocument, Operation, PathItem, Server};

/// The matched path template plus the variables captured from the request.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    variables: ParamVec,
}

impl RoutePattern {
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn variables(&self) -> &ParamVec {
        &self.variables
    }

    /// Captured value of a path variable.
    ///
    /// When a template repeats a name the last occurrence wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Variables as a JSON object, for annotations.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .variables
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect();
        Value::Object(map)
    }
}

/// Result of resolving a request URI and method against the document.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub path: &'a PathItem,
    pub operation: &'a Operation,
    pub server: &'a Server,
    pub pattern: RoutePattern,
}

impl OpenApiDocument {
    /// Resolve an absolute request URI and method to an operation.
    ///
    /// Templates are tried in declaration order, each aligned against the end of
    /// the request path; the segments in front of it must be accepted by a
    /// server.
    ///
    /// A template whose path matches is skipped, rather than failing the whole
    /// match, when none of its servers accepts the leading segments (inherited
    /// servers, or those of any of its operations); the next template in order is tried instead. The
    /// first template with a plausible server wins. Without this a greedy
    /// template such as `/{a}/items` declared before `/v1/items` would swallow
    /// every request whose `/v1` prefix belongs to a server. [`RouteError::NoServer`]
    /// is reported only when no template has a plausible server.
    ///
    /// The operation's effective servers (operation, then path, then document
    /// level) then decide the final match.
    ///
    /// # Errors
    ///
    /// [`RouteError`] when no template, method or server fits.
    pub fn route(&self, uri: &Url, method: &Method) -> Result<RouteMatch<'_>, RouteError> {
        let segments = split_path(uri.path());
        let mut server_miss: Option<&PathItem> = None;
        let mut found = None;

        for path in self.paths() {
            let Some((prefix_len, variables)) = path.template().match_path(&segments) else {
                continue;
            };
            let prefix = &segments[..prefix_len];
            let inherited = path.servers().unwrap_or(self.servers());
            let plausible = inherited.iter().any(|s| s.matches(uri, prefix))
                || path
                    .operations()
                    .iter()
                    .filter_map(Operation::servers)
                    .flatten()
                    .any(|s| s.matches(uri, prefix));
            if plausible {
                found = Some((path, prefix, variables));
                break;
            }
            server_miss.get_or_insert(path);
        }

        let Some((path, prefix, variables)) = found else {
            let error = match server_miss {
                Some(path) => RouteError::NoServer {
                    uri: uri.to_string(),
                    servers: server_urls(path.servers().unwrap_or(self.servers())),
                },
                None => RouteError::NoPath {
                    path: uri.path().to_string(),
                    templates: self
                        .paths()
                        .iter()
                        .map(|p| p.template().to_string())
                        .collect(),
                },
            };
            debug!(uri = %uri, method = %method, error = %error, "No route matched");
            return Err(error);
        };

        let operation = path.operation(method).ok_or_else(|| RouteError::NoMethod {
            method: method.to_string(),
            template: path.template().to_string(),
            allowed: path
                .operations()
                .iter()
                .map(|o| o.method().to_string())
                .collect(),
        })?;

        let effective = operation
            .servers()
            .or(path.servers())
            .unwrap_or(self.servers());
        let server = effective
            .iter()
            .find(|s| s.matches(uri, prefix))
            .ok_or_else(|| RouteError::NoServer {
                uri: uri.to_string(),
                servers: server_urls(effective),
            })?;

        debug!(
            uri = %uri,
            method = %method,
            route_pattern = %path.template(),
            server = %server.url(),
            path_params = ?variables,
            "Route matched"
        );

        Ok(RouteMatch {
            path,
            operation,
            server,
            pattern: RoutePattern {
                template: path.template().to_string(),
                variables,
            },
        })
    }
}

fn server_urls(servers: &[Server]) -> Vec<String> {
    servers.iter().map(|s| s.url().to_string()).collect()
}
