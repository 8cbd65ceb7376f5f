use url::Url;

use crate::document::SpecNode;
use crate::error::SpecError;

/// A `servers[].variables` entry.
///
/// A free variable matches only its default; an enumerated one matches any
/// listed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVariable {
    name: String,
    default: String,
    enumeration: Option<Vec<String>>,
}

impl ServerVariable {
    fn parse(name: &str, node: &SpecNode) -> Result<Self, SpecError> {
        let default = node.required_str("default")?.to_string();
        let enumeration = match node.child("enum")? {
            None => None,
            Some(list) => {
                let mut values = Vec::new();
                for item in list.items()? {
                    let value = item
                        .value()
                        .as_str()
                        .ok_or_else(|| item.invalid("a string"))?;
                    values.push(value.to_string());
                }
                if !values.contains(&default) {
                    return Err(node.invalid("a default that is one of the enum values"));
                }
                Some(values)
            }
        };
        Ok(Self {
            name: name.to_string(),
            default,
            enumeration,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Values this variable may take while matching.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        let values: Vec<&str> = match &self.enumeration {
            Some(values) => values.iter().map(String::as_str).collect(),
            None => vec![self.default.as_str()],
        };
        values.into_iter()
    }
}

/// A piece of a server URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPart {
    Literal(String),
    /// Index into [`Server::variables`]
    Variable(usize),
}

/// Server Object with its URL template decomposed.
///
/// Absolute templates keep scheme and authority parts; relative ones only
/// constrain the path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    url: String,
    scheme: Option<Vec<UrlPart>>,
    authority: Option<Vec<UrlPart>>,
    path: Vec<UrlPart>,
    variables: Vec<ServerVariable>,
}

impl Server {
    /// # Errors
    ///
    /// Missing `url`, bad variables, or a malformed template.
    pub fn parse(node: &SpecNode) -> Result<Self, SpecError> {
        let url = node.required_str("url")?;
        let mut variables = Vec::new();
        if let Some(vars) = node.child("variables")? {
            for entry in vars.entries()? {
                variables.push(ServerVariable::parse(entry.key().unwrap_or_default(), &entry)?);
            }
        }
        Self::from_template(url, variables).map_err(|reason| SpecError::MalformedServerUrl {
            pointer: node.location().to_string(),
            url: url.to_string(),
            reason,
        })
    }

    /// A server made of literals only, used for an explicit base URI.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let path = url.path().trim_matches('/');
        let mut authority = url.host_str().unwrap_or_default().to_string();
        if let Some(port) = url.port() {
            authority.push_str(&format!(":{port}"));
        }
        let literal = |s: &str| {
            if s.is_empty() {
                Vec::new()
            } else {
                vec![UrlPart::Literal(s.to_string())]
            }
        };
        Self {
            url: url.to_string(),
            scheme: Some(literal(url.scheme())),
            authority: Some(literal(&authority)),
            path: literal(path),
            variables: Vec::new(),
        }
    }

    /// The implicit server used when none are declared: `/`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            url: "/".to_string(),
            scheme: None,
            authority: None,
            path: Vec::new(),
            variables: Vec::new(),
        }
    }

    fn from_template(url: &str, variables: Vec<ServerVariable>) -> Result<Self, String> {
        let (scheme, authority, path) = match url.split_once("://") {
            Some((scheme, rest)) => {
                let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
                (
                    Some(split_template(scheme, &variables)?),
                    Some(split_template(authority, &variables)?),
                    path,
                )
            }
            None => (None, None, url),
        };
        let path = split_template(path.trim_matches('/'), &variables)?;
        Ok(Self {
            url: url.to_string(),
            scheme,
            authority,
            path,
            variables,
        })
    }

    /// The URL template as declared.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn variables(&self) -> &[ServerVariable] {
        &self.variables
    }

    #[must_use]
    pub fn scheme_parts(&self) -> Option<&[UrlPart]> {
        self.scheme.as_deref()
    }

    #[must_use]
    pub fn authority_parts(&self) -> Option<&[UrlPart]> {
        self.authority.as_deref()
    }

    /// Path template with leading and trailing `/` removed.
    #[must_use]
    pub fn path_parts(&self) -> &[UrlPart] {
        &self.path
    }
}

/// Split `text` into literal runs and `{variable}` references.
fn split_template(text: &str, variables: &[ServerVariable]) -> Result<Vec<UrlPart>, String> {
    let mut parts = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['{', '}']) {
            None => {
                parts.push(UrlPart::Literal(rest.to_string()));
                break;
            }
            Some(open) if rest[open..].starts_with('}') => {
                return Err("unbalanced '}'".to_string());
            }
            Some(open) => {
                if open > 0 {
                    parts.push(UrlPart::Literal(rest[..open].to_string()));
                }
                let after = &rest[open + 1..];
                let close = after
                    .find('}')
                    .ok_or_else(|| "unterminated '{'".to_string())?;
                let name = &after[..close];
                if name.contains('{') {
                    return Err("nested '{'".to_string());
                }
                let index = variables
                    .iter()
                    .position(|v| v.name == name)
                    .ok_or_else(|| format!("variable '{name}' is not declared"))?;
                parts.push(UrlPart::Variable(index));
                rest = &after[close + 1..];
            }
        }
    }
    Ok(parts)
}

/// Parse a `servers` array; `None` when the key is absent.
///
/// # Errors
///
/// Any server parse error.
pub fn parse_servers(owner: &SpecNode) -> Result<Option<Vec<Server>>, SpecError> {
    let Some(list) = owner.child("servers")? else {
        return Ok(None);
    };
    list.items()?
        .iter()
        .map(Server::parse)
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
