use crate::document::SpecNode;
use crate::error::{MediaTypeMismatch, SpecError};
use crate::media_type::{self, MediaTypeRange, MediaTypeValue};

/// One content-map entry: the range from its key plus the optional schema.
#[derive(Debug, Clone)]
pub struct MediaType {
    range: MediaTypeRange,
    schema: Option<SpecNode>,
    node: SpecNode,
}

impl MediaType {
    #[must_use]
    pub fn range(&self) -> &MediaTypeRange {
        &self.range
    }

    #[must_use]
    pub fn schema(&self) -> Option<&SpecNode> {
        self.schema.as_ref()
    }

    #[must_use]
    pub fn node(&self) -> &SpecNode {
        &self.node
    }
}

/// A content map, entries held in descending precedence order.
#[derive(Debug, Clone)]
pub struct Content {
    media_types: Vec<MediaType>,
    node: SpecNode,
}

impl Content {
    /// # Errors
    ///
    /// Not an object, or a key that is not a valid media type.
    pub fn parse(node: &SpecNode) -> Result<Self, SpecError> {
        let mut media_types = Vec::new();
        for entry in node.entries()? {
            let key = entry.key().unwrap_or_default();
            let range = MediaTypeRange::parse(key).map_err(|source| SpecError::InvalidMediaType {
                pointer: entry.location().to_string(),
                source,
            })?;
            media_types.push(MediaType {
                range,
                schema: entry.schema_child("schema"),
                node: entry,
            });
        }
        media_type::sort_by_precedence(&mut media_types, |m| &m.range);
        Ok(Self {
            media_types,
            node: node.clone(),
        })
    }

    #[must_use]
    pub fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    #[must_use]
    pub fn node(&self) -> &SpecNode {
        &self.node
    }

    /// Highest-precedence entry whose range accepts `content_type`.
    ///
    /// # Errors
    ///
    /// [`MediaTypeMismatch`] when no range matches.
    pub fn select(&self, content_type: &MediaTypeValue) -> Result<&MediaType, MediaTypeMismatch> {
        media_type::select(&self.media_types, |m| &m.range, content_type)
    }
}

/// Request Body Object.
#[derive(Debug, Clone)]
pub struct RequestBody {
    required: bool,
    content: Content,
    node: SpecNode,
}

impl RequestBody {
    /// # Errors
    ///
    /// Missing `content`, or any content parse error.
    pub fn parse(node: &SpecNode) -> Result<Self, SpecError> {
        let content = Content::parse(&node.required_child("content")?)?;
        Ok(Self {
            required: node.bool_field("required")?.unwrap_or(false),
            content,
            node: node.clone(),
        })
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    #[must_use]
    pub fn node(&self) -> &SpecNode {
        &self.node
    }
}
