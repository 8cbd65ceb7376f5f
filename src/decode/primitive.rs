use serde_json::Value;

use super::{PrimitiveType, ValueDecoder};
use crate::decode::ParameterStyle;
use crate::error::DecodeError;

/// Decode a single primitive under the decoder's style.
pub(super) fn decode(
    decoder: &ValueDecoder,
    values: &[String],
    ty: PrimitiveType,
) -> Result<Value, DecodeError> {
    let raw = match decoder.style() {
        ParameterStyle::Form | ParameterStyle::Simple => decoder.single(values)?,
        ParameterStyle::Label => decoder.label_body(decoder.single(values)?)?,
        ParameterStyle::Matrix => {
            let raw = decoder.single(values)?;
            match decoder.matrix_values(raw)?.as_slice() {
                [value] => *value,
                _ => return Err(decoder.syntax(raw)),
            }
        }
        ParameterStyle::SpaceDelimited
        | ParameterStyle::PipeDelimited
        | ParameterStyle::DeepObject => return Err(decoder.unsupported()),
    };
    convert(raw, ty)
}

/// Convert one token to the declared primitive type.
///
/// Strings pass through verbatim; everything else must be a JSON scalar literal.
pub(crate) fn convert(raw: &str, ty: PrimitiveType) -> Result<Value, DecodeError> {
    if ty == PrimitiveType::String {
        return Ok(Value::String(raw.to_string()));
    }
    match (ty, serde_json::from_str::<Value>(raw)) {
        (PrimitiveType::Number | PrimitiveType::Integer, Ok(v @ Value::Number(_)))
        | (PrimitiveType::Boolean, Ok(v @ Value::Bool(_)))
        | (PrimitiveType::Null, Ok(v @ Value::Null)) => Ok(v),
        _ => Err(DecodeError::Literal {
            raw: raw.to_string(),
            expected: ty.to_string(),
        }),
    }
}

/// Token whose type is unknown: scalars are recognised, anything else is a string.
pub(crate) fn guess(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v,
        _ => Value::String(raw.to_string()),
    }
}

/// Fallback when the schema declares no type: infer from the value count.
pub(super) fn infer(values: &[String]) -> Value {
    match values {
        [] => Value::Null,
        [one] => guess(one),
        many => Value::Array(many.iter().cloned().map(Value::String).collect()),
    }
}
