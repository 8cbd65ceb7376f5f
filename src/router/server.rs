use url::Url;

use crate::spec::{Server, ServerVariable, UrlPart};

impl Server {
    /// Whether this server accepts `uri` when `prefix` is the run of request
    /// path segments in front of the matched path template.
    ///
    /// Relative servers only constrain the path. Comparison is
    /// case-insensitive and variables try each candidate value.
    #[must_use]
    pub fn matches(&self, uri: &Url, prefix: &[&str]) -> bool {
        let variables = self.variables();
        if let Some(scheme) = self.scheme_parts() {
            if !match_parts(scheme, variables, uri.scheme()) {
                return false;
            }
        }
        if let Some(authority) = self.authority_parts() {
            if !authority_forms(uri)
                .iter()
                .any(|form| match_parts(authority, variables, form))
            {
                return false;
            }
        }
        match_parts(self.path_parts(), variables, &prefix.join("/"))
    }
}

/// `host` and `host:port`, with the scheme's default port spelled out as well.
fn authority_forms(uri: &Url) -> Vec<String> {
    let host = uri.host_str().unwrap_or_default();
    match (uri.port(), uri.port_or_known_default()) {
        (Some(port), _) => vec![format!("{host}:{port}")],
        (None, Some(default)) => vec![host.to_string(), format!("{host}:{default}")],
        (None, None) => vec![host.to_string()],
    }
}

fn match_parts(parts: &[UrlPart], variables: &[ServerVariable], text: &str) -> bool {
    let Some((first, rest)) = parts.split_first() else {
        return text.is_empty();
    };
    match first {
        UrlPart::Literal(literal) => {
            strip_prefix_ignore_case(text, literal).is_some_and(|tail| match_parts(rest, variables, tail))
        }
        UrlPart::Variable(index) => variables.get(*index).is_some_and(|variable| {
            variable.candidates().any(|candidate| {
                strip_prefix_ignore_case(text, candidate)
                    .is_some_and(|tail| match_parts(rest, variables, tail))
            })
        }),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}
