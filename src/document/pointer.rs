use std::fmt;

/// RFC 6901 JSON pointer, stored in its escaped form (`""` is the root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct JsonPointer(String);

impl JsonPointer {
    /// The pointer to the whole document.
    #[must_use]
    pub fn root() -> Self {
        JsonPointer(String::new())
    }

    /// Parse an escaped pointer; `None` unless it is empty or starts with `/`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw.starts_with('/') {
            Some(JsonPointer(raw.to_string()))
        } else {
            None
        }
    }

    /// Parse a URI fragment reference such as `#/components/schemas/User`.
    ///
    /// Returns `None` when the reference is not local (does not start with `#`).
    #[must_use]
    pub fn from_fragment(reference: &str) -> Option<Self> {
        let fragment = reference.strip_prefix('#')?;
        let decoded = urlencoding::decode(fragment).ok()?;
        Self::parse(&decoded)
    }

    /// Append one unescaped reference token.
    #[must_use]
    pub fn push(&self, token: &str) -> Self {
        let mut s = String::with_capacity(self.0.len() + token.len() + 1);
        s.push_str(&self.0);
        s.push('/');
        s.push_str(&escape(token));
        JsonPointer(s)
    }

    /// The escaped string form, usable with [`serde_json::Value::pointer`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `#` plus the pointer with each token percent-encoded, usable as a `$ref`.
    #[must_use]
    pub fn to_uri_fragment(&self) -> String {
        let mut out = String::from("#");
        for token in self.0.split('/').skip(1) {
            out.push('/');
            out.push_str(&urlencoding::encode(token));
        }
        out
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Unescaped reference tokens, first to last.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.0.split('/').skip(1).map(unescape)
    }

    /// The last unescaped token, `None` for the root.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next().map(unescape)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_escapes_slash_and_tilde() {
        let p = JsonPointer::root().push("paths").push("/v1/user/{id}").push("a~b");
        assert_eq!(p.as_str(), "/paths/~1v1~1user~1{id}/a~0b");
        let tokens: Vec<String> = p.tokens().collect();
        assert_eq!(tokens, vec!["paths", "/v1/user/{id}", "a~b"]);
        assert_eq!(p.last().as_deref(), Some("a~b"));
    }

    #[test]
    fn test_uri_fragment_round_trip() {
        let p = JsonPointer::root().push("paths").push("/u/{id}").push("a b");
        let fragment = p.to_uri_fragment();
        assert_eq!(fragment, "#/paths/~1u~1%7Bid%7D/a%20b");
        assert_eq!(JsonPointer::from_fragment(&fragment).unwrap(), p);
    }

    #[test]
    fn test_from_fragment() {
        let p = JsonPointer::from_fragment("#/components/schemas/User%20Info").unwrap();
        assert_eq!(p.as_str(), "/components/schemas/User Info");
        assert_eq!(JsonPointer::from_fragment("#").unwrap(), JsonPointer::root());
        assert!(JsonPointer::from_fragment("other.yaml#/a").is_none());
        assert!(JsonPointer::from_fragment("#a").is_none());
    }
}
