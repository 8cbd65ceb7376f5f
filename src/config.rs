//! # Configuration Module
//!
//! Controls what the validating middleware evaluates and whether failures
//! are raised.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Effect |
//! |---|---|---|
//! | `BRRTC_EVALUATE_REQUESTS` | `true` | evaluate outgoing requests |
//! | `BRRTC_EVALUATE_RESPONSES` | `true` | evaluate incoming responses |
//! | `BRRTC_THROW_ON_FAILURE` | `false` | return an error when evaluation fails |
//!
//! Booleans accept `1/0`, `true/false`, `yes/no` and `on/off`. Anything else keeps
//! the default and logs a warning.
//!
//! ## Usage
//!
//! ```rust
//! use brrtcheck::config::ValidationConfig;
//!
//! let config = ValidationConfig::from_yaml_str("throw_on_failure: true\n").unwrap();
//! assert!(config.evaluate_requests);
//! assert!(config.throw_on_failure);
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Middleware policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub evaluate_requests: bool,
    pub evaluate_responses: bool,
    /// Turn invalid results into [`MiddlewareError::Validation`](crate::error::MiddlewareError::Validation)
    pub throw_on_failure: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            evaluate_requests: true,
            evaluate_responses: true,
            throw_on_failure: false,
        }
    }
}

impl ValidationConfig {
    /// Load configuration from `BRRTC_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| match lookup(key) {
            None => default,
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warn!(key = key, value = %raw, default = default, "Ignoring unrecognised boolean");
                default
            }),
        };
        Self {
            evaluate_requests: flag("BRRTC_EVALUATE_REQUESTS", defaults.evaluate_requests),
            evaluate_responses: flag("BRRTC_EVALUATE_RESPONSES", defaults.evaluate_responses),
            throw_on_failure: flag("BRRTC_THROW_ON_FAILURE", defaults.throw_on_failure),
        }
    }

    /// Parse a YAML mapping; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// YAML syntax errors or wrongly typed values.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
