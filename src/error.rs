//! Error types for document loading, routing, value decoding and evaluation.
//!
//! Structural errors ([`SpecError`]) are fatal and surface while the document is
//! parsed. Routing and decoding errors are recoverable and end up as failed
//! reports in the results tree. [`UsageError`] signals a caller mistake.

use std::fmt;

use crate::evaluation::OpenApiEvaluationResults;

/// Structural problem found while building the spec model.
///
/// Every variant carries the JSON pointer of the node that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A key the OpenAPI grammar requires is absent
    MissingKey {
        /// Pointer of the object missing the key
        pointer: String,
        /// The missing key
        key: String,
    },
    /// A node has the wrong JSON type or an unusable value
    InvalidValue {
        /// Pointer of the offending node
        pointer: String,
        /// What was expected
        expected: String,
    },
    /// `openapi` is outside `[3.1.0, 3.2.0)`
    UnsupportedVersion {
        /// The declared version string
        version: String,
    },
    /// A `$ref` that does not start with `#`
    NonLocalReference {
        /// Pointer of the node holding the reference
        pointer: String,
        /// The reference value
        reference: String,
    },
    /// Following `$ref` came back to a pointer already visited
    ReferenceCycle {
        /// The chain of pointers, in visit order
        chain: Vec<String>,
    },
    /// A local `$ref` points at nothing
    UnresolvableReference {
        /// Pointer of the node holding the reference
        pointer: String,
        /// The reference value
        reference: String,
    },
    /// A parameter style not allowed for its location
    DisallowedStyle {
        /// Pointer of the parameter
        pointer: String,
        /// Declared style
        style: String,
        /// Parameter location
        location: String,
    },
    /// Two parameters in one list share name and location
    DuplicateParameter {
        /// Pointer of the parameter list
        pointer: String,
        /// Parameter name
        name: String,
        /// Parameter location
        location: String,
    },
    /// Two sibling operations declare the same `operationId`
    DuplicateOperationId {
        /// Pointer of the path item
        pointer: String,
        /// The repeated id
        operation_id: String,
    },
    /// A server URL template with unbalanced braces or an undeclared variable
    MalformedServerUrl {
        /// Pointer of the server object
        pointer: String,
        /// The URL template
        url: String,
        /// What is wrong with it
        reason: String,
    },
    /// A content-map key that is not a media type range
    InvalidMediaType {
        /// Pointer of the content map
        pointer: String,
        /// Underlying parse error
        source: MediaTypeError,
    },
    /// A `patternProperties` key that is not a valid regular expression
    InvalidPattern {
        /// Pointer of the schema
        pointer: String,
        /// The pattern text
        pattern: String,
    },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecError::MissingKey { pointer, key } => {
                write!(f, "missing required key '{key}' at '{pointer}'")
            }
            SpecError::InvalidValue { pointer, expected } => {
                write!(f, "invalid value at '{pointer}': expected {expected}")
            }
            SpecError::UnsupportedVersion { version } => write!(
                f,
                "unsupported OpenAPI version '{version}': expected >= 3.1.0 and < 3.2.0"
            ),
            SpecError::NonLocalReference { pointer, reference } => write!(
                f,
                "non-local reference '{reference}' at '{pointer}': only '#...' references are supported"
            ),
            SpecError::ReferenceCycle { chain } => {
                write!(f, "reference cycle: {}", chain.join(" -> "))
            }
            SpecError::UnresolvableReference { pointer, reference } => {
                write!(f, "reference '{reference}' at '{pointer}' does not resolve")
            }
            SpecError::DisallowedStyle {
                pointer,
                style,
                location,
            } => write!(
                f,
                "style '{style}' is not allowed for {location} parameter at '{pointer}'"
            ),
            SpecError::DuplicateParameter {
                pointer,
                name,
                location,
            } => write!(
                f,
                "duplicate {location} parameter '{name}' in parameter list at '{pointer}'"
            ),
            SpecError::DuplicateOperationId {
                pointer,
                operation_id,
            } => write!(
                f,
                "operationId '{operation_id}' declared more than once under '{pointer}'"
            ),
            SpecError::MalformedServerUrl {
                pointer,
                url,
                reason,
            } => write!(f, "malformed server url '{url}' at '{pointer}': {reason}"),
            SpecError::InvalidMediaType { pointer, source } => {
                write!(f, "invalid content key at '{pointer}': {source}")
            }
            SpecError::InvalidPattern { pointer, pattern } => {
                write!(f, "invalid pattern '{pattern}' at '{pointer}'")
            }
        }
    }
}

impl std::error::Error for SpecError {}

/// Failure to parse a `type/subtype[;parameter]` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTypeError {
    /// Type part is empty
    EmptyType(String),
    /// Subtype part is empty or the `/` is missing
    EmptySubtype(String),
    /// A parameter segment without `=`
    MalformedParameter(String),
}

impl fmt::Display for MediaTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaTypeError::EmptyType(raw) => write!(f, "media type '{raw}' has an empty type"),
            MediaTypeError::EmptySubtype(raw) => {
                write!(f, "media type '{raw}' has an empty subtype")
            }
            MediaTypeError::MalformedParameter(raw) => {
                write!(f, "media type '{raw}' has a parameter without '='")
            }
        }
    }
}

impl std::error::Error for MediaTypeError {}

/// No declared content range accepts the concrete media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeMismatch {
    /// The media type that was tried
    pub attempted: String,
    /// Every declared range, in precedence order
    pub available: Vec<String>,
}

impl fmt::Display for MediaTypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "media type '{}' matches none of [{}]",
            self.attempted,
            self.available.join(", ")
        )
    }
}

impl std::error::Error for MediaTypeMismatch {}

/// The request could not be resolved to a server, path and operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No path template matches the request path
    NoPath {
        /// The request path
        path: String,
        /// Every declared template
        templates: Vec<String>,
    },
    /// The matched path does not declare the method
    NoMethod {
        /// The request method
        method: String,
        /// The matched template
        template: String,
        /// Methods the template declares
        allowed: Vec<String>,
    },
    /// None of the effective servers matches the request's server prefix
    NoServer {
        /// The request URI
        uri: String,
        /// URL templates of the effective servers
        servers: Vec<String>,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NoPath { path, templates } => write!(
                f,
                "no path template matches '{path}'; known templates: [{}]",
                templates.join(", ")
            ),
            RouteError::NoMethod {
                method,
                template,
                allowed,
            } => write!(
                f,
                "method '{method}' is not declared on '{template}'; allowed: [{}]",
                allowed.join(", ")
            ),
            RouteError::NoServer { uri, servers } => write!(
                f,
                "no server matches '{uri}'; servers: [{}]",
                servers.join(", ")
            ),
        }
    }
}

impl std::error::Error for RouteError {}

/// No response entry covers the status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndeclaredStatus {
    /// The response status
    pub status: u16,
    /// Every declared response key, in declaration order
    pub declared: Vec<String>,
}

impl fmt::Display for UndeclaredStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status {} is not declared and there is no default response; declared: [{}]",
            self.status,
            self.declared.join(", ")
        )
    }
}

impl std::error::Error for UndeclaredStatus {}

/// A raw parameter value could not be turned into a JSON instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The style needs a different number of raw values
    Arity {
        /// Serialization style
        style: String,
        /// What the style accepts
        expected: String,
        /// How many values were supplied
        actual: usize,
    },
    /// The style cannot carry the schema's shape
    UnsupportedStyle {
        /// Serialization style
        style: String,
        /// Whether explode was set
        explode: bool,
        /// Schema shape (`array`, `object`, ...)
        shape: String,
    },
    /// Text that does not parse as the declared primitive
    Literal {
        /// The raw text
        raw: String,
        /// The declared JSON type
        expected: String,
    },
    /// The decoder needs a schema attribute that is absent
    MissingAttribute {
        /// `items` or `type`
        attribute: String,
    },
    /// The raw value does not follow the style's syntax
    Syntax {
        /// Serialization style
        style: String,
        /// The raw text
        raw: String,
    },
    /// A custom decoder refused the value
    Custom(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Arity {
                style,
                expected,
                actual,
            } => write!(
                f,
                "style '{style}' expects {expected} value(s), got {actual}"
            ),
            DecodeError::UnsupportedStyle {
                style,
                explode,
                shape,
            } => write!(
                f,
                "style '{style}' (explode={explode}) cannot carry a value of shape '{shape}'"
            ),
            DecodeError::Literal { raw, expected } => {
                write!(f, "'{raw}' is not a valid {expected} literal")
            }
            DecodeError::MissingAttribute { attribute } => {
                write!(f, "schema is missing the '{attribute}' attribute")
            }
            DecodeError::Syntax { style, raw } => {
                write!(f, "'{raw}' is not valid '{style}' syntax")
            }
            DecodeError::Custom(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Caller mistake at an evaluation entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// The request URI is empty or not absolute
    MissingUri(String),
    /// A body was supplied without a `Content-Type` header
    MissingContentType,
    /// A response was handed over without its originating request
    UnknownRequest,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::MissingUri(raw) => {
                write!(f, "request URI '{raw}' is absent or not absolute")
            }
            UsageError::MissingContentType => {
                write!(f, "a body is present but the Content-Type header is missing")
            }
            UsageError::UnknownRequest => {
                write!(f, "the response does not carry its originating request")
            }
        }
    }
}

impl std::error::Error for UsageError {}

/// Evaluation failed and the caller asked for failures to be raised.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    /// `request` or `response`
    pub phase: &'static str,
    /// The complete results tree of the failing evaluation
    pub results: OpenApiEvaluationResults,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} evaluation failed at '{}'",
            self.phase,
            self.results.specification_location()
        )
    }
}

impl std::error::Error for ValidationFailure {}

/// Error returned by the validating middleware.
#[derive(Debug)]
pub enum MiddlewareError<E> {
    /// The underlying transport failed
    Transport(E),
    /// The exchange could not be evaluated
    Usage(UsageError),
    /// Evaluation failed and `throw_on_failure` is set
    Validation(Box<ValidationFailure>),
    /// The cancellation token fired before the exchange completed
    Cancelled,
}

impl<E: fmt::Display> fmt::Display for MiddlewareError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareError::Transport(e) => write!(f, "transport error: {e}"),
            MiddlewareError::Usage(e) => write!(f, "{e}"),
            MiddlewareError::Validation(e) => write!(f, "{e}"),
            MiddlewareError::Cancelled => write!(f, "exchange cancelled"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for MiddlewareError<E> {}

impl<E> From<UsageError> for MiddlewareError<E> {
    fn from(e: UsageError) -> Self {
        MiddlewareError::Usage(e)
    }
}
