//! # Dispatcher Module
//!
//! The dispatcher module defines the contract between the router and the code
//! it routes to: the [`Handler`] trait, the [`HandlerRequest`] a handler
//! receives and the [`HandlerResponse`] it returns.
//!
//! ## Overview
//!
//! Every invocable thing in the crate is a `Handler`:
//! - plain closures `Fn(HandlerRequest) -> HandlerResponse`
//! - resolved route endpoints
//! - applications mounted at a path prefix
//! - a whole [`crate::router::Router`], which is how sub-routers nest
//! - per-path middleware stacks built by [`crate::middleware::MiddlewareApp`]
//!
//! ## Example
//!
//! ```rust
//! use switchyard::dispatcher::{Handler, HandlerRequest, HandlerResponse};
//! use http::Method;
//!
//! let show = |req: HandlerRequest| {
//!     HandlerResponse::json(200, serde_json::json!({ "id": req.get_param("id") }))
//! };
//!
//! let res = show.invoke(HandlerRequest::new(Method::GET, "/books/1", "id=1"));
//! assert_eq!(res.status, 200);
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{
    merge_params, parse_query_params, Handler, HandlerRequest, HandlerResponse, HeaderVec, MAX_INLINE_HEADERS,
};
