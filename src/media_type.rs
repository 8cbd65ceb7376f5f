//! Content-Type parsing and precedence-ordered range matching.
//!
//! A [`MediaTypeValue`] is a concrete type parsed from a `Content-Type` header. A
//! [`MediaTypeRange`] is parsed from a content-map key and may use wildcards; its
//! precedence is `*/*` = 0, `type/*` = 2, `type/subtype` = 4, plus one when a
//! parameter is present.

use std::fmt;

use crate::error::{MediaTypeError, MediaTypeMismatch};

/// A single `name=value` media type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeParameter {
    pub name: String,
    pub value: String,
}

/// Concrete media type, e.g. `application/json; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeValue {
    pub type_: String,
    pub subtype: String,
    pub parameter: Option<MediaTypeParameter>,
}

impl MediaTypeValue {
    /// Parse `type/subtype[;parameter]`.
    ///
    /// Only the first parameter is kept; every parameter segment must contain `=`.
    ///
    /// # Errors
    ///
    /// Empty type or subtype, or a parameter segment without `=`.
    pub fn parse(raw: &str) -> Result<Self, MediaTypeError> {
        let mut segments = raw.split(';');
        let essence = segments.next().unwrap_or_default().trim();
        let (type_, subtype) = match essence.split_once('/') {
            Some((t, s)) => (t.trim(), s.trim()),
            None => (essence, ""),
        };
        if type_.is_empty() {
            return Err(MediaTypeError::EmptyType(raw.to_string()));
        }
        if subtype.is_empty() {
            return Err(MediaTypeError::EmptySubtype(raw.to_string()));
        }

        let mut parameter = None;
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| MediaTypeError::MalformedParameter(raw.to_string()))?;
            if parameter.is_none() {
                parameter = Some(MediaTypeParameter {
                    name: name.trim().to_string(),
                    value: value.trim().trim_matches('"').to_string(),
                });
            }
        }

        Ok(Self {
            type_: type_.to_string(),
            subtype: subtype.to_string(),
            parameter,
        })
    }

    /// `application/json` and any `+json` structured syntax suffix.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.type_.eq_ignore_ascii_case("application")
            && (self.subtype.eq_ignore_ascii_case("json")
                || self.subtype.to_ascii_lowercase().ends_with("+json"))
    }
}

impl fmt::Display for MediaTypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        if let Some(p) = &self.parameter {
            write!(f, ";{}={}", p.name, p.value)?;
        }
        Ok(())
    }
}

/// Media type pattern from a content-map key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeRange {
    value: MediaTypeValue,
    precedence: u8,
    raw: String,
}

impl MediaTypeRange {
    /// # Errors
    ///
    /// Same as [`MediaTypeValue::parse`].
    pub fn parse(raw: &str) -> Result<Self, MediaTypeError> {
        let value = MediaTypeValue::parse(raw)?;
        let mut precedence = if value.type_ == "*" {
            0
        } else if value.subtype == "*" {
            2
        } else {
            4
        };
        if value.parameter.is_some() {
            precedence += 1;
        }
        Ok(Self {
            value,
            precedence,
            raw: raw.to_string(),
        })
    }

    #[must_use]
    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    /// The content-map key this range was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn value(&self) -> &MediaTypeValue {
        &self.value
    }

    /// Whether `candidate` falls inside this range.
    ///
    /// Both sides must agree on carrying a parameter; parameter names and values
    /// compare case-insensitively.
    #[must_use]
    pub fn matches(&self, candidate: &MediaTypeValue) -> bool {
        match (&self.value.parameter, &candidate.parameter) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                if !a.name.eq_ignore_ascii_case(&b.name) || !a.value.eq_ignore_ascii_case(&b.value)
                {
                    return false;
                }
            }
            _ => return false,
        }
        if self.value.type_ == "*" {
            return true;
        }
        if !self.value.type_.eq_ignore_ascii_case(&candidate.type_) {
            return false;
        }
        self.value.subtype == "*" || self.value.subtype.eq_ignore_ascii_case(&candidate.subtype)
    }
}

/// Sort ranges by descending precedence, keeping declaration order among equals.
pub fn sort_by_precedence<T>(items: &mut [T], range: impl Fn(&T) -> &MediaTypeRange) {
    items.sort_by(|a, b| range(b).precedence.cmp(&range(a).precedence));
}

/// Index of the highest-precedence range accepting `candidate`.
///
/// `ranges` must already be in precedence order.
///
/// # Errors
///
/// [`MediaTypeMismatch`] naming the candidate and every range.
pub fn select<'a, T>(
    items: &'a [T],
    range: impl Fn(&T) -> &MediaTypeRange,
    candidate: &MediaTypeValue,
) -> Result<&'a T, MediaTypeMismatch> {
    items
        .iter()
        .find(|item| range(item).matches(candidate))
        .ok_or_else(|| MediaTypeMismatch {
            attempted: candidate.to_string(),
            available: items.iter().map(|i| range(i).as_str().to_string()).collect(),
        })
}
