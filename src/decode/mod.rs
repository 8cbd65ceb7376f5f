//! # Decode Module
//!
//! Turns raw parameter strings into JSON instances according to the OpenAPI
//! serialization `style`, the `explode` flag and the shape declared by the
//! parameter's schema.
//!
//! The shape is worked out once, when the document is parsed ([`ValueShape`]);
//! the resulting [`ValueDecoder`] is immutable data plus a pure `decode`.
//!
//! | Style | No explode | Explode |
//! |---|---|---|
//! | `form` | one value, comma-split | repeated values (arrays); objects fail |
//! | `simple` | one value, comma-split | one value, comma-split (`k=v` pairs for objects) |
//! | `label` | `.`-prefixed, `.`/`,`-split | `.`-split, `k=v` pairs for objects |
//! | `matrix` | `;k=v` segments, values comma-split | one item or pair per `;` segment |
//! | `spaceDelimited` / `pipeDelimited` | one value split on the delimiter | repeated values |
//! | `deepObject` | invalid | `name[prop]=value` pairs |

mod array;
mod object;
mod primitive;
mod shape;

pub use shape::{ItemType, ObjectShape, ValueShape};

use serde_json::Value;
use std::fmt;

use crate::error::DecodeError;

/// OpenAPI parameter serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterStyle {
    Matrix,
    Label,
    Form,
    Simple,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParameterStyle {
    /// Parse the `style` keyword value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "matrix" => Some(ParameterStyle::Matrix),
            "label" => Some(ParameterStyle::Label),
            "form" => Some(ParameterStyle::Form),
            "simple" => Some(ParameterStyle::Simple),
            "spaceDelimited" => Some(ParameterStyle::SpaceDelimited),
            "pipeDelimited" => Some(ParameterStyle::PipeDelimited),
            "deepObject" => Some(ParameterStyle::DeepObject),
            _ => None,
        }
    }

    /// `explode` defaults to true for `form` and false for everything else.
    #[must_use]
    pub fn default_explode(self) -> bool {
        self == ParameterStyle::Form
    }
}

impl fmt::Display for ParameterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParameterStyle::Matrix => "matrix",
            ParameterStyle::Label => "label",
            ParameterStyle::Form => "form",
            ParameterStyle::Simple => "simple",
            ParameterStyle::SpaceDelimited => "spaceDelimited",
            ParameterStyle::PipeDelimited => "pipeDelimited",
            ParameterStyle::DeepObject => "deepObject",
        };
        f.write_str(s)
    }
}

/// JSON Schema primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl PrimitiveType {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(PrimitiveType::String),
            "number" => Some(PrimitiveType::Number),
            "integer" => Some(PrimitiveType::Integer),
            "boolean" => Some(PrimitiveType::Boolean),
            "null" => Some(PrimitiveType::Null),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Null => "null",
        };
        f.write_str(s)
    }
}

/// Decoder supplied by the caller for one (name, location) pair.
///
/// Takes priority over the built-in [`ValueDecoder`]. Closures with the matching
/// signature implement it.
pub trait ParameterValueDecoder: Send + Sync {
    /// Turn the raw values collected for the parameter into an instance.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]; it is reported against the parameter.
    fn decode(&self, values: &[String]) -> Result<Value, DecodeError>;
}

impl<F> ParameterValueDecoder for F
where
    F: Fn(&[String]) -> Result<Value, DecodeError> + Send + Sync,
{
    fn decode(&self, values: &[String]) -> Result<Value, DecodeError> {
        self(values)
    }
}

/// Built-in decoder for one parameter: style, explode and schema shape.
#[derive(Debug, Clone)]
pub struct ValueDecoder {
    style: ParameterStyle,
    explode: bool,
    shape: ValueShape,
    name: Option<String>,
}

impl ValueDecoder {
    #[must_use]
    pub fn new(style: ParameterStyle, explode: bool, shape: ValueShape) -> Self {
        Self {
            style,
            explode,
            shape,
            name: None,
        }
    }

    /// Require `matrix` segment keys to carry the parameter name.
    ///
    /// Exploded matrix objects are exempt: their keys are property names.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn style(&self) -> ParameterStyle {
        self.style
    }

    #[must_use]
    pub fn explode(&self) -> bool {
        self.explode
    }

    #[must_use]
    pub fn shape(&self) -> &ValueShape {
        &self.shape
    }

    /// Decode raw values; never panics, every failure is a [`DecodeError`].
    ///
    /// # Errors
    ///
    /// Arity mismatch, style unsupported for the shape, malformed literal or
    /// missing `items`/`type`.
    pub fn decode(&self, values: &[String]) -> Result<Value, DecodeError> {
        match &self.shape {
            ValueShape::Untyped => Ok(primitive::infer(values)),
            ValueShape::Primitive(ty) => primitive::decode(self, values, *ty),
            ValueShape::Array(items) => array::decode(self, values, items),
            ValueShape::Object(shape) => object::decode(self, values, shape),
        }
    }

    /// The single raw value, or an arity error.
    pub(crate) fn single<'a>(&self, values: &'a [String]) -> Result<&'a str, DecodeError> {
        match values {
            [one] => Ok(one.as_str()),
            _ => Err(DecodeError::Arity {
                style: self.style.to_string(),
                expected: "exactly one".to_string(),
                actual: values.len(),
            }),
        }
    }

    pub(crate) fn unsupported(&self) -> DecodeError {
        DecodeError::UnsupportedStyle {
            style: self.style.to_string(),
            explode: self.explode,
            shape: self.shape.name().to_string(),
        }
    }

    pub(crate) fn syntax(&self, raw: &str) -> DecodeError {
        DecodeError::Syntax {
            style: self.style.to_string(),
            raw: raw.to_string(),
        }
    }

    /// Strip the `.` label prefix.
    pub(crate) fn label_body<'a>(&self, raw: &'a str) -> Result<&'a str, DecodeError> {
        raw.strip_prefix('.').ok_or_else(|| self.syntax(raw))
    }

    /// Split a `;k=v;k=v` matrix value into `(key, value)` segments.
    pub(crate) fn matrix_segments<'a>(
        &self,
        raw: &'a str,
    ) -> Result<Vec<(&'a str, &'a str)>, DecodeError> {
        let body = raw.strip_prefix(';').ok_or_else(|| self.syntax(raw))?;
        Ok(body
            .split(';')
            .map(|segment| segment.split_once('=').unwrap_or((segment, "")))
            .collect())
    }

    /// Values of `;name=v` segments; a key other than the parameter name is a syntax error.
    pub(crate) fn matrix_values<'a>(&self, raw: &'a str) -> Result<Vec<&'a str>, DecodeError> {
        self.matrix_segments(raw)?
            .into_iter()
            .map(|(key, value)| match &self.name {
                Some(name) if name != key => Err(self.syntax(raw)),
                _ => Ok(value),
            })
            .collect()
    }
}

impl ParameterValueDecoder for ValueDecoder {
    fn decode(&self, values: &[String]) -> Result<Value, DecodeError> {
        ValueDecoder::decode(self, values)
    }
}

/// Comma-split, treating the empty string as no tokens.
pub(crate) fn split_tokens(raw: &str, delimiter: char) -> Vec<&str> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split(delimiter).collect()
    }
}
