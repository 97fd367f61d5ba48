//! # Endpoint Module
//!
//! Turns a route's declared target into something that can be invoked.
//!
//! ## Targets
//!
//! - [`EndpointSpec::Handler`] - already invocable, wrapped as [`Endpoint::Direct`]
//! - [`EndpointSpec::Class`] - a [`Target`]; singletons are used as-is,
//!   constructors are instantiated once at resolution time
//! - [`EndpointSpec::Name`] - a `"controller#action"` string. Each side is
//!   converted to CamelCase, joined with `::` under the namespace, and looked
//!   up through the injected [`NameResolver`]. A name that is not defined yet
//!   becomes an [`Endpoint::Lazy`], which looks the name up again on every call.
//! - [`EndpointSpec::Unresolvable`] - fails with
//!   [`crate::error::RouterError::NotCallableEndpoint`]
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard::dispatcher::{HandlerRequest, HandlerResponse};
//! use switchyard::endpoint::{EndpointResolver, EndpointSpec, HandlerRegistry, Target};
//!
//! let registry = Arc::new(HandlerRegistry::new());
//! let resolver = EndpointResolver::new(registry.clone(), "#");
//!
//! let endpoint = resolver.resolve(EndpointSpec::name("books#index"), "Web").unwrap();
//! assert!(endpoint.is_lazy());
//!
//! registry.define(
//!     "Web::Books::Index",
//!     Target::singleton(|_req: HandlerRequest| HandlerResponse::text(200, "books")),
//! );
//! let res = endpoint.invoke(HandlerRequest::default()).unwrap();
//! assert_eq!(res.status, 200);
//! ```

mod core;
mod registry;

pub use core::{Endpoint, EndpointResolver, EndpointSpec, NameResolver, Target};
pub use registry::HandlerRegistry;
