use http::Method;

use super::content::{Content, RequestBody};
use super::parameter::{merge_parameters, parse_parameter_list, parse_response_headers, Parameter};
use super::server::{parse_servers, Server};
use crate::document::SpecNode;
use crate::error::SpecError;
use crate::router::PathTemplate;

/// Path item keys that hold operations, in OpenAPI order.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// One entry of a `responses` map.
#[derive(Debug, Clone)]
pub struct Response {
    key: String,
    headers: Vec<Parameter>,
    content: Option<Content>,
    node: SpecNode,
}

impl Response {
    fn parse(key: &str, node: &SpecNode) -> Result<Self, SpecError> {
        let headers = match node.child("headers")? {
            Some(h) => parse_response_headers(&h)?,
            None => Vec::new(),
        };
        let content = node
            .child("content")?
            .map(|c| Content::parse(&c))
            .transpose()?;
        Ok(Self {
            key: key.to_string(),
            headers,
            content,
            node: node.clone(),
        })
    }

    /// The map key: a status code, `1XX`..`5XX`, or `default`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn headers(&self) -> &[Parameter] {
        &self.headers
    }

    #[must_use]
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn node(&self) -> &SpecNode {
        &self.node
    }
}

/// The `responses` map of one operation.
#[derive(Debug, Clone, Default)]
pub struct Responses {
    entries: Vec<Response>,
}

impl Responses {
    fn parse(node: &SpecNode) -> Result<Self, SpecError> {
        let mut entries = Vec::new();
        for entry in node.entries()? {
            let key = entry.key().unwrap_or_default().to_string();
            if key.starts_with("x-") {
                continue;
            }
            if !is_response_key(&key) {
                return Err(entry.invalid("a status code, a status range like 2XX, or 'default'"));
            }
            entries.push(Response::parse(&key, &entry)?);
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[Response] {
        &self.entries
    }

    /// Exact status first, then its `NXX` range, then `default`.
    #[must_use]
    pub fn select(&self, status: u16) -> Option<&Response> {
        let exact = status.to_string();
        let range = format!("{}XX", status / 100);
        self.entries
            .iter()
            .find(|r| r.key == exact)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|r| r.key.eq_ignore_ascii_case(&range))
            })
            .or_else(|| self.entries.iter().find(|r| r.key == "default"))
    }
}

fn is_response_key(key: &str) -> bool {
    if key == "default" {
        return true;
    }
    let bytes = key.as_bytes();
    bytes.len() == 3
        && (b'1'..=b'5').contains(&bytes[0])
        && (bytes[1..].iter().all(u8::is_ascii_digit)
            || bytes[1..].iter().all(|b| b.eq_ignore_ascii_case(&b'X')))
}

/// One (path template, method) pair.
#[derive(Debug, Clone)]
pub struct Operation {
    method: Method,
    operation_id: Option<String>,
    parameters: Vec<Parameter>,
    request_body: Option<RequestBody>,
    responses: Responses,
    servers: Option<Vec<Server>>,
    node: SpecNode,
}

impl Operation {
    fn parse(method: Method, node: &SpecNode, inherited: &[Parameter]) -> Result<Self, SpecError> {
        let own = match node.child("parameters")? {
            Some(list) => parse_parameter_list(&list)?,
            None => Vec::new(),
        };
        let request_body = node
            .child("requestBody")?
            .map(|rb| RequestBody::parse(&rb))
            .transpose()?;
        let responses = match node.child("responses")? {
            Some(r) => Responses::parse(&r)?,
            None => Responses::default(),
        };
        Ok(Self {
            method,
            operation_id: node.str_field("operationId")?.map(str::to_string),
            parameters: merge_parameters(inherited, &own),
            request_body,
            responses,
            servers: parse_servers(node)?.filter(|s| !s.is_empty()),
            node: node.clone(),
        })
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Effective parameters: operation-level ones plus inherited path-level ones.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn request_body(&self) -> Option<&RequestBody> {
        self.request_body.as_ref()
    }

    #[must_use]
    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    /// Operation-level server overrides.
    #[must_use]
    pub fn servers(&self) -> Option<&[Server]> {
        self.servers.as_deref()
    }

    #[must_use]
    pub fn node(&self) -> &SpecNode {
        &self.node
    }
}

/// A `paths` entry.
#[derive(Debug, Clone)]
pub struct PathItem {
    template: PathTemplate,
    servers: Option<Vec<Server>>,
    operations: Vec<Operation>,
    node: SpecNode,
}

impl PathItem {
    /// # Errors
    ///
    /// Any nested parse error, or two operations sharing an `operationId`.
    pub fn parse(template: &str, node: &SpecNode) -> Result<Self, SpecError> {
        let template = PathTemplate::parse(template).map_err(|reason| SpecError::InvalidValue {
            pointer: node.location().to_string(),
            expected: format!("a valid path template ({reason})"),
        })?;
        let inherited = match node.child("parameters")? {
            Some(list) => parse_parameter_list(&list)?,
            None => Vec::new(),
        };

        let mut operations: Vec<Operation> = Vec::new();
        for verb in HTTP_METHODS {
            let Some(op_node) = node.child(verb)? else {
                continue;
            };
            let method = Method::from_bytes(verb.to_ascii_uppercase().as_bytes())
                .map_err(|_| op_node.invalid("an HTTP method"))?;
            let operation = Operation::parse(method, &op_node, &inherited)?;
            if let Some(id) = operation.operation_id() {
                if operations.iter().any(|o| o.operation_id() == Some(id)) {
                    return Err(SpecError::DuplicateOperationId {
                        pointer: node.location().to_string(),
                        operation_id: id.to_string(),
                    });
                }
            }
            operations.push(operation);
        }

        Ok(Self {
            template,
            servers: parse_servers(node)?.filter(|s| !s.is_empty()),
            operations,
            node: node.clone(),
        })
    }

    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Path-level server overrides.
    #[must_use]
    pub fn servers(&self) -> Option<&[Server]> {
        self.servers.as_deref()
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// The operation declared for `method`, compared case-insensitively.
    #[must_use]
    pub fn operation(&self, method: &Method) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|o| o.method.as_str().eq_ignore_ascii_case(method.as_str()))
    }

    #[must_use]
    pub fn node(&self) -> &SpecNode {
        &self.node
    }
}
