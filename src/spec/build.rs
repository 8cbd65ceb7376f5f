use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::operation::PathItem;
use super::server::{parse_servers, Server};
use crate::document::Document;
use crate::error::SpecError;

/// Base URI given to documents that were not read from a file.
pub const DEFAULT_DOCUMENT_URI: &str = "urn:brrtcheck:document";

/// Typed, validated view of one OpenAPI 3.1 document.
///
/// Built once, read-only afterwards; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    document: Document,
    version: String,
    title: String,
    servers: Vec<Server>,
    paths: Vec<PathItem>,
}

impl OpenApiDocument {
    /// Build the model from a deserialized document.
    ///
    /// `base_uri` identifies the document in specification locations.
    ///
    /// # Errors
    ///
    /// The first structural problem found, see [`SpecError`].
    pub fn from_value(value: Value, base_uri: Url) -> Result<Self, SpecError> {
        let document = Document::new(value, base_uri);
        let root = document.root();
        root.as_object()?;

        let version = root.required_str("openapi")?.to_string();
        check_version(&version)?;

        let info = root.required_child("info")?;
        let title = info.required_str("title")?.to_string();
        info.required_str("version")?;

        let servers = match parse_servers(&root)? {
            Some(servers) if !servers.is_empty() => servers,
            _ => vec![Server::root()],
        };

        let mut paths = Vec::new();
        if let Some(paths_node) = root.child("paths")? {
            for entry in paths_node.entries()? {
                let template = entry.key().unwrap_or_default().to_string();
                if template.starts_with("x-") {
                    continue;
                }
                if !template.starts_with('/') {
                    return Err(entry.invalid("a path template starting with '/'"));
                }
                let item = PathItem::parse(&template, &entry)?;
                debug!(
                    template = %template,
                    operations = item.operations().len(),
                    "Parsed path item"
                );
                paths.push(item);
            }
        }

        info!(
            title = %title,
            openapi = %version,
            base_uri = %document.base_uri(),
            paths = paths.len(),
            servers = servers.len(),
            "OpenAPI document parsed"
        );

        Ok(Self {
            document,
            version,
            title,
            servers,
            paths,
        })
    }

    /// Replace the document-level servers with a single literal server.
    ///
    /// Path- and operation-level overrides still apply.
    #[must_use]
    pub fn with_base_uri(mut self, base: &Url) -> Self {
        debug!(base = %base, "Overriding document servers with explicit base URI");
        self.servers = vec![Server::from_url(base)];
        self
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The declared `openapi` version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Document-level servers; `/` when none are declared.
    #[must_use]
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    /// Path items in declaration order.
    #[must_use]
    pub fn paths(&self) -> &[PathItem] {
        &self.paths
    }

    #[must_use]
    pub fn path(&self, template: &str) -> Option<&PathItem> {
        self.paths.iter().find(|p| p.template().as_str() == template)
    }
}

/// Accept `3.1.x` only.
///
/// # Errors
///
/// [`SpecError::UnsupportedVersion`] for anything else.
pub fn check_version(version: &str) -> Result<(), SpecError> {
    let mut parts = version.splitn(3, '.');
    let major = parts.next().and_then(|p| p.parse::<u32>().ok());
    let minor = parts.next().and_then(|p| p.parse::<u32>().ok());
    let patch_ok = parts
        .next()
        .is_some_and(|p| p.chars().next().is_some_and(|c| c.is_ascii_digit()));
    match (major, minor) {
        (Some(3), Some(1)) if patch_ok => Ok(()),
        _ => Err(SpecError::UnsupportedVersion {
            version: version.to_string(),
        }),
    }
}
