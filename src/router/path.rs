use regex::Regex;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Maximum number of path variables before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path variables, in template order.
///
/// Names are shared with the template; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    /// The whole segment is one `{name}`
    Variable(Arc<str>),
    /// Literals and variables mixed inside one segment, e.g. `{id}.json`
    Mixed {
        regex: Regex,
        names: Vec<Arc<str>>,
    },
}

/// A `paths` key split into segments.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// # Errors
    ///
    /// A description of the problem for unbalanced braces or an empty variable name.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let segments = split_path(raw)
            .into_iter()
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Variable names in template order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flat_map(|segment| {
            let names: Vec<&str> = match segment {
                Segment::Literal(_) => Vec::new(),
                Segment::Variable(name) => vec![name.as_ref()],
                Segment::Mixed { names, .. } => names.iter().map(AsRef::as_ref).collect(),
            };
            names
        })
    }

    /// Align the template against the end of `request`.
    ///
    /// On success returns how many leading request segments are left over for
    /// the server prefix, plus the captured (percent-decoded) variables.
    #[must_use]
    pub fn match_path(&self, request: &[&str]) -> Option<(usize, ParamVec)> {
        let prefix = request.len().checked_sub(self.segments.len())?;
        let mut params = ParamVec::new();
        for (segment, raw) in self.segments.iter().zip(&request[prefix..]) {
            let decoded = percent_decode(raw);
            match segment {
                Segment::Literal(literal) => {
                    if !decoded.eq_ignore_ascii_case(literal) {
                        return None;
                    }
                }
                Segment::Variable(name) => params.push((Arc::clone(name), decoded.into_owned())),
                Segment::Mixed { regex, names } => {
                    let captures = regex.captures(&decoded)?;
                    for (index, name) in names.iter().enumerate() {
                        let value = captures.get(index + 1)?.as_str();
                        params.push((Arc::clone(name), value.to_string()));
                    }
                }
            }
        }
        Some((prefix, params))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Request path segments with leading and trailing `/` trimmed.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

fn percent_decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

fn parse_segment(segment: &str) -> Result<Segment, String> {
    if !segment.contains(['{', '}']) {
        return Ok(Segment::Literal(segment.to_string()));
    }
    if let Some(name) = segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|name| !name.contains(['{', '}']))
    {
        if name.is_empty() {
            return Err(format!("empty variable name in '{segment}'"));
        }
        return Ok(Segment::Variable(Arc::from(name)));
    }

    let mut pattern = String::from("^");
    let mut names = Vec::new();
    let mut rest = segment;
    while !rest.is_empty() {
        match rest.find(['{', '}']) {
            None => {
                pattern.push_str(&format!("(?i:{})", regex::escape(rest)));
                break;
            }
            Some(at) if rest[at..].starts_with('}') => {
                return Err(format!("unbalanced '}}' in '{segment}'"));
            }
            Some(at) => {
                if at > 0 {
                    pattern.push_str(&format!("(?i:{})", regex::escape(&rest[..at])));
                }
                let after = &rest[at + 1..];
                let close = after
                    .find('}')
                    .ok_or_else(|| format!("unterminated '{{' in '{segment}'"))?;
                let name = &after[..close];
                if name.is_empty() || name.contains('{') {
                    return Err(format!("invalid variable in '{segment}'"));
                }
                pattern.push_str("(.+?)");
                names.push(Arc::from(name));
                rest = &after[close + 1..];
            }
        }
    }
    pattern.push('$');
    let regex = Regex::new(&pattern).map_err(|e| e.to_string())?;
    Ok(Segment::Mixed { regex, names })
}
