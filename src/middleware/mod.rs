//! # Middleware Module
//!
//! `before`/`after` hooks around handler calls, and [`MiddlewareApp`] for
//! wrapping one application in a different middleware stack per path prefix.
//!
//! ```rust
//! use switchyard::dispatcher::{Handler, HandlerRequest, HandlerResponse};
//! use switchyard::middleware::{AuthMiddleware, MiddlewareApp, TracingMiddleware};
//! use http::Method;
//!
//! let app = MiddlewareApp::builder(|_req: HandlerRequest| HandlerResponse::text(200, "ok"))
//!     .use_middleware(TracingMiddleware)
//!     .use_at("/admin", AuthMiddleware::new("secret"))
//!     .build()
//!     .unwrap();
//!
//! let open = app.invoke(HandlerRequest::new(Method::GET, "/books", ""));
//! assert_eq!(open.status, 200);
//!
//! let locked = app.invoke(HandlerRequest::new(Method::GET, "/admin/users", ""));
//! assert_eq!(locked.status, 401);
//! ```

mod app;
mod auth;
mod core;
mod metrics;
#[cfg(test)]
mod tests;
mod tracing;

pub use app::{MiddlewareApp, MiddlewareAppBuilder};
pub use auth::AuthMiddleware;
pub use core::{Middleware, Stack};
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
