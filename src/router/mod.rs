//! # Router Module
//!
//! The router module turns `(verb, path, query)` triples into handler calls and
//! route names back into paths.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route templates (`/books/:id(.:format)`) at registration
//! - Matching requests in registration order, telling a 404 apart from a 405
//! - Resolving endpoints, including names that are only defined later
//! - Handing unclaimed requests to applications mounted under a path prefix
//! - Generating paths and URLs for named routes
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use switchyard::config::RouterConfig;
//! use switchyard::dispatcher::{HandlerRequest, HandlerResponse};
//! use switchyard::endpoint::{EndpointSpec, HandlerRegistry};
//! use switchyard::pattern::{Constraint, ConstraintSet, RouteArgs};
//! use switchyard::router::Router;
//!
//! let mut router = Router::new(RouterConfig::default(), Arc::new(HandlerRegistry::new()));
//! router
//!     .register(
//!         &[Method::GET],
//!         "/books/:id",
//!         EndpointSpec::handler(|req: HandlerRequest| {
//!             HandlerResponse::text(200, req.get_param("id").unwrap_or_default())
//!         }),
//!         Some("book"),
//!         &ConstraintSet::new().with("id", Constraint::digits()),
//!     )
//!     .unwrap();
//! let router = router.freeze();
//!
//! assert_eq!(router.handle("GET", "/books/23", "").status, 200);
//! assert_eq!(router.handle("GET", "/books/abc", "").status, 404);
//! assert_eq!(router.handle("POST", "/books/23", "").status, 405);
//! assert_eq!(
//!     router.path_for("book", &RouteArgs::keyed([("id", "23")])).unwrap(),
//!     "/books/23"
//! );
//! ```
//!
//! Routes can also come from a YAML file, see [`RouteFile`].

mod core;
mod load;
mod table;

pub use core::{Router, SharedRouter};
pub use load::{load_routes, parse_routes, RouteDef, RouteFile};
pub use table::{MatchResult, Route, RouteMatch, RouteTable, VerbVec};
