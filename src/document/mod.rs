//! # Document Module
//!
//! Pointer-indexed access into one parsed OpenAPI document, following local
//! `$ref` references.
//!
//! Every [`SpecNode`] carries two pointers:
//!
//! - the **trail**: the logical path taken from the root, including a `$ref`
//!   token for every reference hop (e.g. `/paths/~1a/get/responses/200/$ref/content`)
//! - the **location**: the canonical pointer of the node after all references are
//!   followed; it always resolves within the root document
//!
//! Resolution of a canonical location is memoised in a concurrent map that lives
//! as long as the document, so repeated navigation from many evaluations costs one
//! lookup per step.

mod pointer;

pub use pointer::JsonPointer;

use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

use crate::error::SpecError;

static NULL: Value = Value::Null;

/// A parsed document plus its base URI and reference cache.
///
/// Cloning is cheap; all clones share the same root and cache.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

struct DocumentInner {
    root: Value,
    base_uri: Url,
    /// canonical pointer -> (resolved pointer, number of `$ref` hops), or `None` if absent
    resolved: DashMap<JsonPointer, Option<(JsonPointer, usize)>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("base_uri", &self.inner.base_uri.as_str())
            .field("cached_pointers", &self.inner.resolved.len())
            .finish()
    }
}

impl Document {
    #[must_use]
    pub fn new(root: Value, base_uri: Url) -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                root,
                base_uri,
                resolved: DashMap::new(),
            }),
        }
    }

    #[must_use]
    pub fn root_value(&self) -> &Value {
        &self.inner.root
    }

    #[must_use]
    pub fn base_uri(&self) -> &Url {
        &self.inner.base_uri
    }

    /// The root node; references on the root object itself are not followed.
    #[must_use]
    pub fn root(&self) -> SpecNode {
        SpecNode {
            document: self.clone(),
            trail: JsonPointer::root(),
            location: JsonPointer::root(),
            key: None,
        }
    }

    /// Read the node at `pointer`, following references at every step.
    ///
    /// # Errors
    ///
    /// `MissingKey` if nothing is there, or the reference errors of [`Document::try_read`].
    pub fn read(&self, pointer: &JsonPointer) -> Result<SpecNode, SpecError> {
        self.try_read(pointer)?.ok_or_else(|| SpecError::MissingKey {
            pointer: pointer.to_string(),
            key: pointer.last().unwrap_or_default(),
        })
    }

    /// Read the node at `pointer` if it exists.
    ///
    /// # Errors
    ///
    /// Non-local, dangling or cyclic references met on the way.
    pub fn try_read(&self, pointer: &JsonPointer) -> Result<Option<SpecNode>, SpecError> {
        let mut node = self.root();
        for token in pointer.tokens() {
            match node.child(&token)? {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    /// URI of `location` within this document: the base URI with the pointer as fragment.
    #[must_use]
    pub fn location_uri(&self, location: &JsonPointer) -> String {
        let mut uri = self.inner.base_uri.clone();
        uri.set_fragment(Some(location.as_str()));
        uri.to_string()
    }

    /// Follow `$ref` from `location` until a non-reference node is reached.
    ///
    /// Memoised per canonical pointer.
    fn follow(&self, location: JsonPointer) -> Result<Option<(JsonPointer, usize)>, SpecError> {
        if let Some(hit) = self.inner.resolved.get(&location) {
            return Ok(hit.value().clone());
        }

        let mut chain = vec![location.clone()];
        let mut current = location.clone();
        let resolved = loop {
            let Some(value) = self.inner.root.pointer(current.as_str()) else {
                break None;
            };
            let Some(reference) = value.get("$ref").and_then(Value::as_str) else {
                break Some((current, chain.len() - 1));
            };
            let target = JsonPointer::from_fragment(reference).ok_or_else(|| {
                SpecError::NonLocalReference {
                    pointer: current.to_string(),
                    reference: reference.to_string(),
                }
            })?;
            if self.inner.root.pointer(target.as_str()).is_none() {
                return Err(SpecError::UnresolvableReference {
                    pointer: current.to_string(),
                    reference: reference.to_string(),
                });
            }
            if chain.contains(&target) {
                chain.push(target);
                return Err(SpecError::ReferenceCycle {
                    chain: chain.iter().map(JsonPointer::to_string).collect(),
                });
            }
            chain.push(target.clone());
            current = target;
        };

        self.inner.resolved.insert(location, resolved.clone());
        Ok(resolved)
    }
}

/// A view of one node: document, logical trail, canonical location and key.
#[derive(Clone, Debug)]
pub struct SpecNode {
    document: Document,
    trail: JsonPointer,
    location: JsonPointer,
    key: Option<String>,
}

impl SpecNode {
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Logical path taken to reach this node, `$ref` hops included.
    #[must_use]
    pub fn trail(&self) -> &JsonPointer {
        &self.trail
    }

    /// Canonical pointer of this node within the root document.
    #[must_use]
    pub fn location(&self) -> &JsonPointer {
        &self.location
    }

    /// The map key or array index this node was reached through.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        self.document
            .inner
            .root
            .pointer(self.location.as_str())
            .unwrap_or(&NULL)
    }

    /// Absolute URI of this node (base URI + `#` + canonical pointer).
    #[must_use]
    pub fn location_uri(&self) -> String {
        self.document.location_uri(&self.location)
    }

    /// Child reached through `key`, following references.
    ///
    /// # Errors
    ///
    /// Non-local, dangling or cyclic references.
    pub fn child(&self, key: &str) -> Result<Option<SpecNode>, SpecError> {
        let raw = self.location.push(key);
        let Some((location, hops)) = self.document.follow(raw)? else {
            return Ok(None);
        };
        let mut trail = self.trail.push(key);
        for _ in 0..hops {
            trail = trail.push("$ref");
        }
        Ok(Some(SpecNode {
            document: self.document.clone(),
            trail,
            location,
            key: Some(key.to_string()),
        }))
    }

    /// Like [`SpecNode::child`] but a missing child is a [`SpecError::MissingKey`].
    ///
    /// # Errors
    ///
    /// Missing key or reference errors.
    pub fn required_child(&self, key: &str) -> Result<SpecNode, SpecError> {
        self.child(key)?.ok_or_else(|| SpecError::MissingKey {
            pointer: self.location.to_string(),
            key: key.to_string(),
        })
    }

    /// Child reached through `key` without following a `$ref` it may hold.
    ///
    /// Schema objects use this: a schema `$ref` belongs to the schema engine, and
    /// sibling keywords next to it must be kept.
    #[must_use]
    pub fn schema_child(&self, key: &str) -> Option<SpecNode> {
        let location = self.location.push(key);
        self.document.inner.root.pointer(location.as_str())?;
        Some(SpecNode {
            document: self.document.clone(),
            trail: self.trail.push(key),
            location,
            key: Some(key.to_string()),
        })
    }

    /// This node with its own `$ref` chain followed.
    ///
    /// # Errors
    ///
    /// Non-local, dangling or cyclic references.
    pub fn resolved(&self) -> Result<SpecNode, SpecError> {
        match self.document.follow(self.location.clone())? {
            Some((location, hops)) if hops > 0 => {
                let mut trail = self.trail.clone();
                for _ in 0..hops {
                    trail = trail.push("$ref");
                }
                Ok(SpecNode {
                    document: self.document.clone(),
                    trail,
                    location,
                    key: self.key.clone(),
                })
            }
            _ => Ok(self.clone()),
        }
    }

    /// # Errors
    ///
    /// `InvalidValue` unless this node is an object.
    pub fn as_object(&self) -> Result<&Map<String, Value>, SpecError> {
        self.value()
            .as_object()
            .ok_or_else(|| self.invalid("an object"))
    }

    /// Children of an object node, in declaration order, references followed.
    ///
    /// # Errors
    ///
    /// Not an object, or reference errors.
    pub fn entries(&self) -> Result<Vec<SpecNode>, SpecError> {
        let keys: Vec<String> = self.as_object()?.keys().cloned().collect();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(child) = self.child(&key)? {
                out.push(child);
            }
        }
        Ok(out)
    }

    /// Elements of an array node, references followed.
    ///
    /// # Errors
    ///
    /// Not an array, or reference errors.
    pub fn items(&self) -> Result<Vec<SpecNode>, SpecError> {
        let len = self
            .value()
            .as_array()
            .ok_or_else(|| self.invalid("an array"))?
            .len();
        let mut out = Vec::with_capacity(len);
        for index in 0..len {
            if let Some(child) = self.child(&index.to_string())? {
                out.push(child);
            }
        }
        Ok(out)
    }

    /// # Errors
    ///
    /// `InvalidValue` if the key is present but not a string.
    pub fn str_field(&self, key: &str) -> Result<Option<&str>, SpecError> {
        match self.value().get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid_field(key, "a string")),
        }
    }

    /// # Errors
    ///
    /// `MissingKey` or `InvalidValue`.
    pub fn required_str(&self, key: &str) -> Result<&str, SpecError> {
        self.str_field(key)?.ok_or_else(|| SpecError::MissingKey {
            pointer: self.location.to_string(),
            key: key.to_string(),
        })
    }

    /// # Errors
    ///
    /// `InvalidValue` if the key is present but not a boolean.
    pub fn bool_field(&self, key: &str) -> Result<Option<bool>, SpecError> {
        match self.value().get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.invalid_field(key, "a boolean")),
        }
    }

    pub(crate) fn invalid(&self, expected: &str) -> SpecError {
        SpecError::InvalidValue {
            pointer: self.location.to_string(),
            expected: expected.to_string(),
        }
    }

    fn invalid_field(&self, key: &str, expected: &str) -> SpecError {
        SpecError::InvalidValue {
            pointer: self.location.push(key).to_string(),
            expected: expected.to_string(),
        }
    }
}
