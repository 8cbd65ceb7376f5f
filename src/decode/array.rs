use serde_json::Value;

use super::primitive::convert;
use super::{split_tokens, ItemType, ParameterStyle, ValueDecoder};
use crate::error::DecodeError;

pub(super) fn decode(
    decoder: &ValueDecoder,
    values: &[String],
    items: &ItemType,
) -> Result<Value, DecodeError> {
    let item_type = match items {
        ItemType::Typed(t) => *t,
        ItemType::Missing => {
            return Err(DecodeError::MissingAttribute {
                attribute: "items".to_string(),
            })
        }
        ItemType::Untyped => {
            return Err(DecodeError::MissingAttribute {
                attribute: "type".to_string(),
            })
        }
    };

    let tokens = tokens(decoder, values)?;
    tokens
        .into_iter()
        .map(|token| convert(token, item_type))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn tokens<'a>(decoder: &ValueDecoder, values: &'a [String]) -> Result<Vec<&'a str>, DecodeError> {
    let explode = decoder.explode();
    match decoder.style() {
        ParameterStyle::Form if explode => Ok(values.iter().map(String::as_str).collect()),
        ParameterStyle::Form | ParameterStyle::Simple => {
            Ok(split_tokens(decoder.single(values)?, ','))
        }
        ParameterStyle::SpaceDelimited | ParameterStyle::PipeDelimited if explode => {
            Ok(values.iter().map(String::as_str).collect())
        }
        ParameterStyle::SpaceDelimited => Ok(split_tokens(decoder.single(values)?, ' ')),
        ParameterStyle::PipeDelimited => Ok(split_tokens(decoder.single(values)?, '|')),
        ParameterStyle::Label => {
            let body = decoder.label_body(decoder.single(values)?)?;
            let parts = split_tokens(body, '.');
            if explode {
                Ok(parts)
            } else {
                Ok(parts
                    .into_iter()
                    .flat_map(|part| part.split(','))
                    .collect())
            }
        }
        ParameterStyle::Matrix => {
            let segments = decoder.matrix_values(decoder.single(values)?)?;
            if explode {
                Ok(segments)
            } else {
                Ok(segments
                    .into_iter()
                    .flat_map(|value| split_tokens(value, ','))
                    .collect())
            }
        }
        ParameterStyle::DeepObject => Err(decoder.unsupported()),
    }
}
