//! # Switchyard
//!
//! **Switchyard** is an HTTP request router: it compiles route templates into
//! matchers, dispatches `(verb, path, query)` requests to endpoints, generates
//! paths back from named routes and hands unclaimed prefixes to mounted
//! applications.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`pattern`]** - Route template compiler, matcher and path generator
//! - **[`router`]** - Route table, match walk (404 vs 405) and the [`Router`] facade
//! - **[`mount`]** - Prefix trie for mounting independent applications
//! - **[`endpoint`]** - Direct, constructed and lazily resolved endpoints
//! - **[`dispatcher`]** - The [`Handler`] contract and request/response types
//! - **[`middleware`]** - `before`/`after` hooks and per-path middleware stacks
//! - **[`config`]** - Router settings from defaults, YAML or the environment
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Request Flow
//!
//! ```text
//! handle(verb, path, query)
//!   -> RouteTable::match_request       first route whose template and verb match
//!        Matched           -> Endpoint::invoke (lazy names re-resolved per call)
//!        MethodNotAllowed  -> mounted app for the path, else 405 + Allow
//!        NotFound          -> mounted app for the path, else 404
//! ```
//!
//! ## Template Syntax
//!
//! | Form | Meaning |
//! |---|---|
//! | `/books` | literal |
//! | `:id` | one segment (no `/`) |
//! | `*rest` | any run of characters, `/` included |
//! | `(...)` | optional group, may nest |
//! | `\(` | escaped metacharacter |
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use switchyard::{ConstraintSet, EndpointSpec, HandlerRegistry, RouteArgs, Router, RouterConfig, Target};
//! use switchyard::dispatcher::{HandlerRequest, HandlerResponse};
//!
//! let registry = Arc::new(HandlerRegistry::new());
//! let mut router = Router::new(RouterConfig::default(), registry.clone());
//!
//! // `sessions#new` is not defined yet; the route resolves it on each call
//! router
//!     .register(&[Method::GET], "/login", "sessions#new".into(), Some("login"), &ConstraintSet::new())
//!     .unwrap();
//! let router = router.freeze();
//!
//! registry.define(
//!     "Sessions::New",
//!     Target::singleton(|_req: HandlerRequest| HandlerResponse::text(200, "login form")),
//! );
//! assert_eq!(router.handle("GET", "/login", "").status, 200);
//!
//! let path = router
//!     .path_for("login", &RouteArgs::keyed([("return_to", "/home")]))
//!     .unwrap();
//! assert_eq!(path, "/login?return_to=%2Fhome");
//! ```
//!
//! ## Logging
//!
//! Every module emits structured `tracing` events. Call
//! [`logging::init_logging`] once at startup to install a JSON or pretty
//! subscriber configured from `SWITCHYARD_LOG_*` variables.

pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod mount;
pub mod pattern;
pub mod router;

pub use config::RouterConfig;
pub use dispatcher::{Handler, HandlerRequest, HandlerResponse};
pub use endpoint::{Endpoint, EndpointSpec, HandlerRegistry, NameResolver, Target};
pub use error::RouterError;
pub use mount::DispatchTrie;
pub use pattern::{Constraint, ConstraintSet, PathPattern, RouteArgs};
pub use router::{MatchResult, RouteMatch, Router, SharedRouter};
