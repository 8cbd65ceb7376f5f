use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use url::Url;

use super::build::{OpenApiDocument, DEFAULT_DOCUMENT_URI};

/// Text encoding of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` is YAML, everything else JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// Load and parse an OpenAPI document from disk.
///
/// The file's `file://` URL becomes the document base URI.
///
/// # Errors
///
/// I/O, syntax or structural errors, with the path in the context.
pub fn load_document(path: impl AsRef<Path>) -> anyhow::Result<OpenApiDocument> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read OpenAPI document {}", path.display()))?;
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    let base_uri = Url::from_file_path(&absolute)
        .map_err(|()| anyhow::anyhow!("cannot express {} as a URL", absolute.display()))?;
    let value = parse_value(&content, DocumentFormat::from_path(path))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    OpenApiDocument::from_value(value, base_uri)
        .with_context(|| format!("invalid OpenAPI document {}", path.display()))
}

/// Parse an OpenAPI document from text, using the default base URI.
///
/// # Errors
///
/// Syntax or structural errors.
pub fn parse_document_str(content: &str, format: DocumentFormat) -> anyhow::Result<OpenApiDocument> {
    let value = parse_value(content, format)?;
    let base_uri = Url::parse(DEFAULT_DOCUMENT_URI)?;
    Ok(OpenApiDocument::from_value(value, base_uri)?)
}

fn parse_value(content: &str, format: DocumentFormat) -> anyhow::Result<Value> {
    match format {
        DocumentFormat::Yaml => yaml_to_json(serde_yaml::from_str(content)?),
        DocumentFormat::Json => Ok(serde_json::from_str(content)?),
    }
}

/// YAML allows non-string keys (`200:`); JSON object keys are their text form.
fn yaml_to_json(value: serde_yaml::Value) -> anyhow::Result<Value> {
    use serde_yaml::Value as Yaml;
    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| anyhow::anyhow!("non-finite number {f} in document"))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<anyhow::Result<_>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => anyhow::bail!("unsupported mapping key {other:?}"),
                };
                out.insert(key, yaml_to_json(value)?);
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}
