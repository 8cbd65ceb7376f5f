use regex::Regex;
use serde_json::Value;

use super::PrimitiveType;
use crate::document::SpecNode;
use crate::error::SpecError;

/// What a parameter value looks like once decoded.
#[derive(Debug, Clone)]
pub enum ValueShape {
    Primitive(PrimitiveType),
    Array(ItemType),
    Object(ObjectShape),
    /// The schema declares no `type`
    Untyped,
}

/// Element type of an array-shaped parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    /// No `items` keyword
    Missing,
    /// `items` without a usable primitive `type`
    Untyped,
    Typed(PrimitiveType),
}

/// Property types of an object-shaped parameter.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    properties: Vec<(String, Option<PrimitiveType>)>,
    patterns: Vec<(Regex, Option<PrimitiveType>)>,
    additional: Option<Option<PrimitiveType>>,
}

impl ObjectShape {
    /// Type of `name`: exact property, then first matching pattern property,
    /// then `additionalProperties`. `None` means pass the raw string through.
    #[must_use]
    pub fn property_type(&self, name: &str) -> Option<PrimitiveType> {
        if let Some((_, ty)) = self.properties.iter().find(|(n, _)| n == name) {
            return *ty;
        }
        if let Some((_, ty)) = self.patterns.iter().find(|(re, _)| re.is_match(name)) {
            return *ty;
        }
        self.additional.flatten()
    }
}

impl ValueShape {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ValueShape::Primitive(_) => "primitive",
            ValueShape::Array(_) => "array",
            ValueShape::Object(_) => "object",
            ValueShape::Untyped => "untyped",
        }
    }

    /// Work out the shape from a schema node, following references.
    ///
    /// # Errors
    ///
    /// Reference errors, or a `patternProperties` key that is not a regex.
    pub fn from_schema(schema: Option<&SpecNode>) -> Result<Self, SpecError> {
        let Some(schema) = schema else {
            return Ok(ValueShape::Untyped);
        };
        let schema = schema.resolved()?;
        let Some(ty) = declared_type(schema.value()) else {
            return Ok(ValueShape::Untyped);
        };
        match ty {
            "array" => {
                let items = match schema.schema_child("items") {
                    None => ItemType::Missing,
                    Some(items) => match leaf_type(&items)? {
                        Some(t) => ItemType::Typed(t),
                        None => ItemType::Untyped,
                    },
                };
                Ok(ValueShape::Array(items))
            }
            "object" => Ok(ValueShape::Object(object_shape(&schema)?)),
            other => Ok(PrimitiveType::parse(other)
                .map(ValueShape::Primitive)
                .unwrap_or(ValueShape::Untyped)),
        }
    }
}

/// `type` as a string, or the first non-`null` entry of a type array.
fn declared_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            names
                .iter()
                .copied()
                .find(|t| *t != "null")
                .or_else(|| names.first().copied())
        }
        _ => None,
    }
}

fn leaf_type(schema: &SpecNode) -> Result<Option<PrimitiveType>, SpecError> {
    let schema = schema.resolved()?;
    Ok(declared_type(schema.value()).and_then(PrimitiveType::parse))
}

fn object_shape(schema: &SpecNode) -> Result<ObjectShape, SpecError> {
    let mut shape = ObjectShape::default();

    if let Some(properties) = schema.schema_child("properties") {
        let names: Vec<String> = properties
            .as_object()?
            .keys()
            .cloned()
            .collect();
        for name in names {
            if let Some(property) = properties.schema_child(&name) {
                shape.properties.push((name, leaf_type(&property)?));
            }
        }
    }

    if let Some(patterns) = schema.schema_child("patternProperties") {
        let keys: Vec<String> = patterns.as_object()?.keys().cloned().collect();
        for pattern in keys {
            let re = Regex::new(&pattern).map_err(|_| SpecError::InvalidPattern {
                pointer: patterns.location().to_string(),
                pattern: pattern.clone(),
            })?;
            if let Some(property) = patterns.schema_child(&pattern) {
                shape.patterns.push((re, leaf_type(&property)?));
            }
        }
    }

    if let Some(additional) = schema.schema_child("additionalProperties") {
        shape.additional = match additional.value() {
            Value::Bool(false) => None,
            Value::Bool(true) => Some(None),
            _ => Some(leaf_type(&additional)?),
        };
    }

    Ok(shape)
}
