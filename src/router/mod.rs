//! # Router Module
//!
//! Resolves an absolute request URI and method to a server, a path template,
//! the captured path variables and an operation.
//!
//! ## Overview
//!
//! - **Path templates** ([`PathTemplate`]) are split into segments once, at
//!   parse time. A request path is matched by aligning the template against the
//!   *end* of the request path; whatever segments are left in front form the
//!   server prefix.
//! - **Servers** match that prefix (and, for absolute URL templates, the scheme
//!   and authority) case-insensitively. A free variable matches only its
//!   default; an enumerated variable matches any listed value.
//! - **Precedence**: operation servers override path servers, which override
//!   document servers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use brrtcheck::spec::load_document;
//! use http::Method;
//! use url::Url;
//!
//! let spec = load_document("openapi.yaml")?;
//! let uri = Url::parse("https://api.example.com/v1/user/42")?;
//! let route = spec.route(&uri, &Method::GET)?;
//! assert_eq!(route.pattern.get("id"), Some("42"));
//! ```

mod core;
mod path;
mod server;

pub use core::{RouteMatch, RoutePattern};
pub use path::{split_path, ParamVec, PathTemplate, MAX_INLINE_PARAMS};
