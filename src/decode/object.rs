use serde_json::{Map, Value};

use super::primitive::convert;
use super::{split_tokens, ObjectShape, ParameterStyle, ValueDecoder};
use crate::error::DecodeError;

pub(super) fn decode(
    decoder: &ValueDecoder,
    values: &[String],
    shape: &ObjectShape,
) -> Result<Value, DecodeError> {
    let pairs = pairs(decoder, values)?;
    let mut out = Map::with_capacity(pairs.len());
    for (key, raw) in pairs {
        let value = match shape.property_type(key) {
            Some(ty) => convert(raw, ty)?,
            None => Value::String(raw.to_string()),
        };
        out.insert(key.to_string(), value);
    }
    Ok(Value::Object(out))
}

fn pairs<'a>(
    decoder: &ValueDecoder,
    values: &'a [String],
) -> Result<Vec<(&'a str, &'a str)>, DecodeError> {
    let explode = decoder.explode();
    match decoder.style() {
        // exploded form objects spread their members over the query; the keys
        // no longer carry the parameter name, so they cannot be collected here
        ParameterStyle::Form if explode => Err(decoder.unsupported()),
        ParameterStyle::Form => {
            let raw = decoder.single(values)?;
            alternating(decoder, raw, split_tokens(raw, ','))
        }
        ParameterStyle::Simple => {
            let raw = decoder.single(values)?;
            let tokens = split_tokens(raw, ',');
            if explode {
                key_values(decoder, raw, tokens)
            } else {
                alternating(decoder, raw, tokens)
            }
        }
        ParameterStyle::Label => {
            let raw = decoder.single(values)?;
            let parts = split_tokens(decoder.label_body(raw)?, '.');
            if explode {
                key_values(decoder, raw, parts)
            } else {
                let tokens = parts.into_iter().flat_map(|p| p.split(',')).collect();
                alternating(decoder, raw, tokens)
            }
        }
        ParameterStyle::Matrix => {
            let raw = decoder.single(values)?;
            if explode {
                decoder.matrix_segments(raw)
            } else {
                let tokens = decoder
                    .matrix_values(raw)?
                    .into_iter()
                    .flat_map(|value| split_tokens(value, ','))
                    .collect();
                alternating(decoder, raw, tokens)
            }
        }
        ParameterStyle::DeepObject if explode => values
            .iter()
            .map(|raw| deep_object_pair(decoder, raw))
            .collect(),
        ParameterStyle::DeepObject
        | ParameterStyle::SpaceDelimited
        | ParameterStyle::PipeDelimited => Err(decoder.unsupported()),
    }
}

/// `k1,v1,k2,v2` -> `[(k1, v1), (k2, v2)]`
fn alternating<'a>(
    decoder: &ValueDecoder,
    raw: &str,
    tokens: Vec<&'a str>,
) -> Result<Vec<(&'a str, &'a str)>, DecodeError> {
    if tokens.len() % 2 != 0 {
        return Err(decoder.syntax(raw));
    }
    Ok(tokens.chunks(2).map(|kv| (kv[0], kv[1])).collect())
}

/// `k1=v1`, `k2=v2` -> `[(k1, v1), (k2, v2)]`
fn key_values<'a>(
    decoder: &ValueDecoder,
    raw: &str,
    tokens: Vec<&'a str>,
) -> Result<Vec<(&'a str, &'a str)>, DecodeError> {
    tokens
        .into_iter()
        .map(|token| token.split_once('=').ok_or_else(|| decoder.syntax(raw)))
        .collect()
}

/// `name[prop]=value` -> `(prop, value)`
fn deep_object_pair<'a>(
    decoder: &ValueDecoder,
    raw: &'a str,
) -> Result<(&'a str, &'a str), DecodeError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| decoder.syntax(raw))?;
    let open = key.find('[').ok_or_else(|| decoder.syntax(raw))?;
    let close = key.rfind(']').ok_or_else(|| decoder.syntax(raw))?;
    if close <= open + 1 {
        return Err(decoder.syntax(raw));
    }
    Ok((&key[open + 1..close], value))
}
