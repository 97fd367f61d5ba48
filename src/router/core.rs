//! Router core module - the facade that owns the route table and mounts.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use anyhow::Context;
use arc_swap::{ArcSwap, Guard};
use http::Method;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::load::RouteFile;
use super::table::{MatchResult, RouteMatch, RouteTable};
use crate::config::RouterConfig;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};
use crate::endpoint::{EndpointResolver, EndpointSpec, NameResolver};
use crate::error::RouterError;
use crate::mount::DispatchTrie;
use crate::pattern::{ConstraintSet, RouteArgs};

const FALLBACK_BASE_URL: &str = "http://localhost";

/// Request router: an ordered route table plus prefix-mounted applications.
///
/// Assembled single-threaded with [`register`](Self::register) and
/// [`mount`](Self::mount), then [`freeze`](Self::freeze)d into an `Arc` that
/// request threads share without locking.
pub struct Router {
    config: RouterConfig,
    table: RouteTable,
    mounts: DispatchTrie<Arc<dyn Handler>>,
    base_url: String,
}

impl Router {
    /// Build an empty router. Endpoint names are looked up through `resolver`.
    pub fn new(config: RouterConfig, resolver: Arc<dyn NameResolver>) -> Self {
        let base_url = normalize_base_url(&config.base_url);
        let endpoints = EndpointResolver::new(resolver, &config.separator);
        let not_found: Arc<dyn Handler> =
            Arc::new(|_req: HandlerRequest| HandlerResponse::error(404, "Not Found"));

        info!(
            separator = %config.separator,
            namespace = %config.namespace,
            prefix = %config.prefix,
            base_url = %base_url,
            "Router created"
        );

        Self {
            table: RouteTable::new(endpoints),
            mounts: DispatchTrie::new(not_found),
            config,
            base_url,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Add a route. The configured prefix is prepended to `template` and names
    /// are qualified with the configured namespace.
    ///
    /// # Errors
    ///
    /// Compile and resolution errors from [`RouteTable::register`].
    pub fn register(
        &mut self,
        verbs: &[Method],
        template: &str,
        target: EndpointSpec,
        name: Option<&str>,
        constraints: &ConstraintSet,
    ) -> Result<(), RouterError> {
        let namespace = self.config.namespace.clone();
        self.register_in(&namespace, verbs, template, target, name, constraints)
    }

    /// [`register`](Self::register) with an explicit namespace
    ///
    /// # Errors
    ///
    /// Compile and resolution errors from [`RouteTable::register`].
    pub fn register_in(
        &mut self,
        namespace: &str,
        verbs: &[Method],
        template: &str,
        target: EndpointSpec,
        name: Option<&str>,
        constraints: &ConstraintSet,
    ) -> Result<(), RouterError> {
        let template = join_prefix(&self.config.prefix, template);
        self.table
            .register(verbs, &template, target, name, constraints, namespace)
    }

    /// Register every route in a parsed route file.
    ///
    /// Returns how many routes were added.
    ///
    /// # Errors
    ///
    /// The first route that fails to register, with its position and path as context.
    pub fn register_all(&mut self, file: &RouteFile) -> anyhow::Result<usize> {
        let namespace = file
            .namespace
            .clone()
            .unwrap_or_else(|| self.config.namespace.clone());

        for (idx, def) in file.routes.iter().enumerate() {
            let verbs = def
                .methods()
                .with_context(|| format!("route #{idx} ({})", def.path))?;
            let constraints = def
                .constraint_set()
                .with_context(|| format!("route #{idx} ({})", def.path))?;
            self.register_in(
                &namespace,
                &verbs,
                &def.path,
                EndpointSpec::from_yaml(&def.to),
                def.name.as_deref(),
                &constraints,
            )
            .with_context(|| format!("failed to register route #{idx} ({})", def.path))?;
        }

        info!(
            namespace = %namespace,
            routes_count = file.routes.len(),
            "Route file registered"
        );
        Ok(file.routes.len())
    }

    /// Mount `app` under the path prefix `at`.
    ///
    /// Requests that no route claims are handed to the app with the longest
    /// matching prefix. The app sees the path with that prefix removed.
    ///
    /// # Errors
    ///
    /// [`RouterError::TrieFrozen`] after the router was frozen.
    pub fn mount<H>(&mut self, app: H, at: &str) -> Result<(), RouterError>
    where
        H: Handler + 'static,
    {
        self.mount_arc(Arc::new(app), at)
    }

    /// [`mount`](Self::mount) for an app that is already shared
    ///
    /// # Errors
    ///
    /// [`RouterError::TrieFrozen`] after the router was frozen.
    pub fn mount_arc(&mut self, app: Arc<dyn Handler>, at: &str) -> Result<(), RouterError> {
        let prefix = join_prefix(&self.config.prefix, at);
        self.mounts.insert(&prefix, app)?;
        info!(prefix = %prefix, mounts_count = self.mounts.len(), "Application mounted");
        Ok(())
    }

    /// Match without invoking anything.
    ///
    /// Mounted apps are not consulted.
    #[must_use]
    pub fn recognize(&self, verb: &Method, path: &str, query: &str) -> MatchResult {
        self.table.match_request(verb, path, query)
    }

    /// Dispatch a request given as verb, path and raw query string.
    ///
    /// A `?` inside `path` is split off when `query` is empty.
    #[must_use]
    pub fn handle(&self, verb: &str, path: &str, query: &str) -> HandlerResponse {
        let Ok(method) = Method::from_bytes(verb.as_bytes()) else {
            warn!(verb = %verb, path = %path, "Unparseable request verb");
            return HandlerResponse::error(400, "Bad Request");
        };

        let (path, query) = match path.split_once('?') {
            Some((p, q)) if query.is_empty() => (p, q),
            Some((p, _)) => (p, query),
            None => (path, query),
        };
        self.dispatch(HandlerRequest::new(method, path, query))
    }

    /// Dispatch a prepared request: routes first, then mounted apps, then a
    /// synthesized 405 or 404.
    #[must_use]
    pub fn dispatch(&self, mut req: HandlerRequest) -> HandlerResponse {
        let start = Instant::now();
        let outcome = self
            .table
            .match_with_query(&req.method, &req.path, &req.query_params);

        let response = match outcome {
            MatchResult::Matched(found) => self.invoke_route(found, req),
            miss => {
                if let Some(hit) = self.mounts.lookup(&req.path) {
                    debug!(
                        path = %req.path,
                        mount_prefix = %hit.prefix,
                        rest = %hit.rest,
                        "Dispatching to mounted application"
                    );
                    let app = Arc::clone(hit.app);
                    let prefix = format!("{}{}", req.mount_prefix, hit.prefix);
                    let rest = hit.rest.to_string();
                    req.mount_prefix = prefix;
                    req.path = rest;
                    app.invoke(req)
                } else if let Some(allow) = miss.allow_header() {
                    let mut res = HandlerResponse::error(405, "Method Not Allowed");
                    res.set_header("Allow", allow);
                    res
                } else {
                    HandlerResponse::error(404, "Not Found")
                }
            }
        };

        debug!(
            status = response.status,
            duration_us = start.elapsed().as_micros(),
            "Request dispatched"
        );
        response
    }

    fn invoke_route(&self, found: RouteMatch, mut req: HandlerRequest) -> HandlerResponse {
        let route = found.route;
        req.route_name = route.name().map(str::to_string);
        req.path_params = found.path_params;
        req.query_params = found.query_params;
        req.params = found.params;

        match route.endpoint().invoke(req) {
            Ok(res) => res,
            Err(err) => {
                error!(
                    route_pattern = %route.pattern().template(),
                    route_name = ?route.name(),
                    error = %err,
                    "Endpoint invocation failed"
                );
                HandlerResponse::error(500, "Internal Server Error")
            }
        }
    }

    /// Path for the route registered as `name`
    ///
    /// # Errors
    ///
    /// See [`RouteTable::generate_path`].
    pub fn path_for(&self, name: &str, args: &RouteArgs) -> Result<String, RouterError> {
        self.table.generate_path(name, args)
    }

    /// [`path_for`](Self::path_for) prefixed with the configured base URL
    ///
    /// # Errors
    ///
    /// See [`RouteTable::generate_path`].
    pub fn url_for(&self, name: &str, args: &RouteArgs) -> Result<String, RouterError> {
        let path = self.path_for(name, args)?;
        Ok(format!("{}{}", self.base_url, path))
    }

    /// Stop accepting mounts and publish the router for concurrent use
    #[must_use]
    pub fn freeze(mut self) -> Arc<Router> {
        self.mounts.freeze();
        info!(
            routes_count = self.table.len(),
            mounts_count = self.mounts.len(),
            "Router frozen"
        );
        Arc::new(self)
    }
}

impl Handler for Router {
    fn invoke(&self, req: HandlerRequest) -> HandlerResponse {
        self.dispatch(req)
    }
}

/// Published router that can be replaced as a whole while requests are in flight.
///
/// Readers never block: each request works against the router that was
/// current when it loaded the handle.
pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            current: ArcSwap::new(router),
        }
    }

    /// Current router
    pub fn load(&self) -> Guard<Arc<Router>> {
        self.current.load()
    }

    /// Replace the published router; returns the previous one
    pub fn publish(&self, router: Arc<Router>) -> Arc<Router> {
        let previous = self.current.swap(router);
        info!(
            routes_count = self.current.load().table().len(),
            "Router replaced"
        );
        previous
    }

    #[must_use]
    pub fn handle(&self, verb: &str, path: &str, query: &str) -> HandlerResponse {
        self.current.load().handle(verb, path, query)
    }
}

impl Handler for SharedRouter {
    fn invoke(&self, req: HandlerRequest) -> HandlerResponse {
        self.current.load().dispatch(req)
    }
}

/// `prefix` + `template`, with exactly one `/` at the seam
fn join_prefix(prefix: &str, template: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return template.to_string();
    }
    if template.is_empty() || template == "/" {
        return prefix.to_string();
    }
    if template.starts_with('/') {
        format!("{prefix}{template}")
    } else {
        format!("{prefix}/{template}")
    }
}

/// Origin (plus optional base path) used by `url_for`, without a trailing `/`
fn normalize_base_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(err) => {
            warn!(
                base_url = %raw,
                error = %err,
                fallback = FALLBACK_BASE_URL,
                "Invalid base URL - using fallback"
            );
            FALLBACK_BASE_URL.to_string()
        }
    }
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_join_prefix() {
        assert_eq!(join_prefix("", "/books"), "/books");
        assert_eq!(join_prefix("/api/", "/books"), "/api/books");
        assert_eq!(join_prefix("/api", "books"), "/api/books");
        assert_eq!(join_prefix("/api", "/"), "/api");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://example.com/"), "https://example.com");
        assert_eq!(
            normalize_base_url("https://example.com/app/?x=1#top"),
            "https://example.com/app"
        );
        assert_eq!(normalize_base_url("not a url"), FALLBACK_BASE_URL);
    }
}
