use std::fmt;

use tracing::debug;

use super::content::Content;
use crate::decode::{ParameterStyle, ValueDecoder, ValueShape};
use crate::document::SpecNode;
use crate::error::SpecError;

/// Header names never evaluated as explicit request header parameters.
pub const RESERVED_REQUEST_HEADERS: [&str; 3] = ["accept", "content-type", "authorization"];
/// Header names never evaluated as explicit response header parameters.
pub const RESERVED_RESPONSE_HEADERS: [&str; 1] = ["content-type"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    /// Parse the `in` keyword value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }

    /// Styles a parameter in this location may declare.
    #[must_use]
    pub fn allowed_styles(self) -> &'static [ParameterStyle] {
        match self {
            ParameterLocation::Path => &[
                ParameterStyle::Simple,
                ParameterStyle::Label,
                ParameterStyle::Matrix,
            ],
            ParameterLocation::Query => &[
                ParameterStyle::Form,
                ParameterStyle::SpaceDelimited,
                ParameterStyle::PipeDelimited,
                ParameterStyle::DeepObject,
            ],
            ParameterLocation::Header => &[ParameterStyle::Simple],
            ParameterLocation::Cookie => &[ParameterStyle::Form],
        }
    }

    #[must_use]
    pub fn default_style(self) -> ParameterStyle {
        match self {
            ParameterLocation::Path | ParameterLocation::Header => ParameterStyle::Simple,
            ParameterLocation::Query | ParameterLocation::Cookie => ParameterStyle::Form,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

/// Which reserved header list applies while parsing header parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderContext {
    Request,
    Response,
}

impl HeaderContext {
    #[must_use]
    pub fn is_reserved(self, name: &str) -> bool {
        let reserved: &[&str] = match self {
            HeaderContext::Request => &RESERVED_REQUEST_HEADERS,
            HeaderContext::Response => &RESERVED_RESPONSE_HEADERS,
        };
        reserved.iter().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// One parameter of an operation, or one response header.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    location: ParameterLocation,
    required: bool,
    schema: Option<SpecNode>,
    content: Option<Content>,
    decoder: ValueDecoder,
    node: SpecNode,
}

impl Parameter {
    /// Parse a Parameter Object (`name` and `in` required).
    ///
    /// # Errors
    ///
    /// Missing keys, disallowed style, a path parameter with `required: false`,
    /// or a `content` map without exactly one entry.
    pub fn parse(node: &SpecNode) -> Result<Self, SpecError> {
        let name = node.required_str("name")?.to_string();
        let raw_location = node.required_str("in")?;
        let location = ParameterLocation::parse(raw_location).ok_or_else(|| {
            SpecError::InvalidValue {
                pointer: node.location().push("in").to_string(),
                expected: "one of path, query, header, cookie".to_string(),
            }
        })?;
        Self::parse_with(node, name, location)
    }

    /// Parse a Header Object from a response `headers` map; the name is the map key.
    ///
    /// # Errors
    ///
    /// Same as [`Parameter::parse`].
    pub fn parse_header(name: &str, node: &SpecNode) -> Result<Self, SpecError> {
        Self::parse_with(node, name.to_string(), ParameterLocation::Header)
    }

    fn parse_with(
        node: &SpecNode,
        name: String,
        location: ParameterLocation,
    ) -> Result<Self, SpecError> {
        let style = match node.str_field("style")? {
            None => location.default_style(),
            Some(raw) => ParameterStyle::parse(raw).ok_or_else(|| SpecError::InvalidValue {
                pointer: node.location().push("style").to_string(),
                expected: "a parameter style".to_string(),
            })?,
        };
        if !location.allowed_styles().contains(&style) {
            return Err(SpecError::DisallowedStyle {
                pointer: node.location().to_string(),
                style: style.to_string(),
                location: location.to_string(),
            });
        }
        let explode = node
            .bool_field("explode")?
            .unwrap_or_else(|| style.default_explode());

        let required = match (location, node.bool_field("required")?) {
            (ParameterLocation::Path, Some(false)) => {
                return Err(SpecError::InvalidValue {
                    pointer: node.location().push("required").to_string(),
                    expected: "true for a path parameter".to_string(),
                })
            }
            (ParameterLocation::Path, _) => true,
            (_, required) => required.unwrap_or(false),
        };

        let schema = node.schema_child("schema");
        let content = match node.child("content")? {
            Some(content_node) => {
                let content = Content::parse(&content_node)?;
                if content.media_types().len() != 1 {
                    return Err(content_node.invalid("exactly one media type entry"));
                }
                Some(content)
            }
            None => None,
        };

        let decoder = ValueDecoder::new(style, explode, ValueShape::from_schema(schema.as_ref())?)
            .with_name(name.as_str());

        Ok(Self {
            name,
            location,
            required,
            schema,
            content,
            decoder,
            node: node.clone(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn style(&self) -> ParameterStyle {
        self.decoder.style()
    }

    #[must_use]
    pub fn explode(&self) -> bool {
        self.decoder.explode()
    }

    #[must_use]
    pub fn schema(&self) -> Option<&SpecNode> {
        self.schema.as_ref()
    }

    #[must_use]
    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn decoder(&self) -> &ValueDecoder {
        &self.decoder
    }

    #[must_use]
    pub fn node(&self) -> &SpecNode {
        &self.node
    }

    /// Same (name, location) identity; header names compare case-insensitively.
    #[must_use]
    pub fn same_identity(&self, other: &Parameter) -> bool {
        self.location == other.location
            && if self.location == ParameterLocation::Header {
                self.name.eq_ignore_ascii_case(&other.name)
            } else {
                self.name == other.name
            }
    }
}

/// Parse a `parameters` array, rejecting duplicate (name, location) pairs and
/// dropping reserved request headers.
///
/// # Errors
///
/// Any parameter parse error, or [`SpecError::DuplicateParameter`].
pub fn parse_parameter_list(list: &SpecNode) -> Result<Vec<Parameter>, SpecError> {
    let mut out: Vec<Parameter> = Vec::new();
    for item in list.items()? {
        let parameter = Parameter::parse(&item)?;
        if out.iter().any(|p| p.same_identity(&parameter)) {
            return Err(SpecError::DuplicateParameter {
                pointer: list.location().to_string(),
                name: parameter.name,
                location: parameter.location.to_string(),
            });
        }
        out.push(parameter);
    }
    out.retain(|p| {
        let reserved =
            p.location == ParameterLocation::Header && HeaderContext::Request.is_reserved(&p.name);
        if reserved {
            debug!(name = %p.name, pointer = %p.node.location(), "Skipping reserved request header parameter");
        }
        !reserved
    });
    Ok(out)
}

/// Parse a response `headers` map, dropping reserved response headers.
///
/// # Errors
///
/// Any header parse error.
pub fn parse_response_headers(headers: &SpecNode) -> Result<Vec<Parameter>, SpecError> {
    let mut out = Vec::new();
    for entry in headers.entries()? {
        let name = entry.key().unwrap_or_default().to_string();
        if HeaderContext::Response.is_reserved(&name) {
            debug!(name = %name, pointer = %entry.location(), "Skipping reserved response header");
            continue;
        }
        out.push(Parameter::parse_header(&name, &entry)?);
    }
    Ok(out)
}

/// Operation-level parameters first, then path-level ones the operation does not override.
#[must_use]
pub fn merge_parameters(path_level: &[Parameter], operation_level: &[Parameter]) -> Vec<Parameter> {
    let mut out = operation_level.to_vec();
    for inherited in path_level {
        if !operation_level.iter().any(|p| p.same_identity(inherited)) {
            out.push(inherited.clone());
        }
    }
    out
}
