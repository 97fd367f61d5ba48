//! Dispatcher core module - request/response types and the handler contract.
//!
//! Everything here sits on the request hot path. Parameter and header lists are
//! `SmallVec`s so the common case (a handful of params, a dozen headers) never
//! touches the heap for the list itself.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

use crate::pattern::ParamVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>`: they repeat across requests and clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Anything that can answer a request.
///
/// Routes, mounted applications, nested routers and middleware stacks all
/// implement this one method. Calls are synchronous; the handler owns the
/// request and hands back the full `(status, headers, body)` response.
pub trait Handler: Send + Sync {
    fn invoke(&self, req: HandlerRequest) -> HandlerResponse;
}

impl<F> Handler for F
where
    F: Fn(HandlerRequest) -> HandlerResponse + Send + Sync,
{
    fn invoke(&self, req: HandlerRequest) -> HandlerResponse {
        self(req)
    }
}

/// Request data passed to a handler
///
/// # Parameter views
///
/// `path_params` holds the captures bound by the route template, `query_params`
/// the decoded query string. `params` is the merged view a handler normally
/// reads: every path binding, plus each query parameter whose name the path did
/// not bind. Path bindings win on conflict.
#[derive(Debug, Clone, Default)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Path as seen by this handler (mount prefix already removed)
    pub path: String,
    /// Prefix consumed by the mount that routed here; empty at the top level
    pub mount_prefix: String,
    /// Raw query string without the leading `?`
    pub query: String,
    /// Name of the route that matched, when it has one
    pub route_name: Option<String>,
    /// Captures bound by the matched route
    pub path_params: ParamVec,
    /// Decoded query string parameters
    pub query_params: ParamVec,
    /// Path params merged with query params (path wins)
    pub params: ParamVec,
    /// HTTP headers
    pub headers: HeaderVec,
}

impl HandlerRequest {
    /// Build a bare request for `method` and `path` with no parameters bound yet.
    ///
    /// The query string is decoded into `query_params` (and `params`) right away
    /// so that mounted applications which never run a route match still see it.
    #[must_use]
    pub fn new(method: Method, path: &str, query: &str) -> Self {
        let query_params = parse_query_params(query);
        Self {
            method,
            path: path.to_string(),
            query: query.to_string(),
            params: query_params.clone(),
            query_params,
            ..Default::default()
        }
    }

    /// Add a header (builder style)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Get a merged parameter by name (path binding wins over query)
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics if the same name appears twice.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: `?limit=10&limit=20` yields `20`.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert the merged params to a HashMap
    /// Note: This allocates - use get_param() in hot paths
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Merge route captures with query parameters; a path binding shadows any
/// query parameter of the same name.
#[must_use]
pub fn merge_params(path_params: &ParamVec, query_params: &ParamVec) -> ParamVec {
    let mut params = path_params.clone();
    for (k, v) in query_params {
        if !path_params.iter().any(|(pk, _)| pk == k) {
            params.push((Arc::clone(k), v.clone()));
        }
    }
    params
}

/// Parse an `application/x-www-form-urlencoded` query string into a param list.
///
/// Accepts the query with or without its leading `?`.
#[must_use]
pub fn parse_query_params(query: &str) -> ParamVec {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return ParamVec::new();
    }
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Response sent back from a handler: the `(status, headers, body)` triple
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a plain-text response; the body is a JSON string value
    #[must_use]
    pub fn text(status: u16, body: &str) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "text/plain".to_string()));
        Self {
            status,
            headers,
            body: Value::String(body.to_string()),
        }
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}
