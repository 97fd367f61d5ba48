//! Route table - ordered routes, the match walk and named generation.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::dispatcher::{merge_params, parse_query_params};
use crate::endpoint::{Endpoint, EndpointResolver, EndpointSpec};
use crate::error::RouterError;
use crate::pattern::{ConstraintSet, ParamVec, PathPattern, RouteArgs};

/// Verb list of one route; most routes accept one or two verbs
pub type VerbVec = SmallVec<[Method; 4]>;

/// A registered route: verbs, compiled template, endpoint and optional name.
///
/// Immutable once registered.
#[derive(Debug)]
pub struct Route {
    verbs: VerbVec,
    pattern: PathPattern,
    endpoint: Endpoint,
    name: Option<String>,
}

impl Route {
    #[must_use]
    pub fn new(verbs: &[Method], pattern: PathPattern, endpoint: Endpoint, name: Option<&str>) -> Self {
        Self {
            verbs: verbs.iter().cloned().collect(),
            pattern,
            endpoint,
            name: name.map(str::to_string),
        }
    }

    /// Does this route take `method`?
    ///
    /// `HEAD` is accepted wherever `GET` is. An empty verb set accepts anything.
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        self.verbs.is_empty()
            || self.verbs.contains(method)
            || (*method == Method::HEAD && self.verbs.contains(&Method::GET))
    }

    /// Declared verbs, plus `HEAD` when `GET` is declared
    #[must_use]
    pub fn allowed_verbs(&self) -> VerbVec {
        let mut verbs = self.verbs.clone();
        if verbs.contains(&Method::GET) && !verbs.contains(&Method::HEAD) {
            let at = verbs.iter().position(|m| *m == Method::GET).map_or(0, |i| i + 1);
            verbs.insert(at, Method::HEAD);
        }
        verbs
    }

    #[must_use]
    pub fn verbs(&self) -> &[Method] {
        &self.verbs
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Successful match: the route plus every parameter view a handler needs
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Matched route (Arc to avoid cloning the route itself)
    pub route: Arc<Route>,
    /// Captures bound by the template
    pub path_params: ParamVec,
    /// Decoded query string
    pub query_params: ParamVec,
    /// Path params merged with query params, path winning on conflict
    pub params: ParamVec,
}

impl RouteMatch {
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of the match walk.
///
/// Misses are ordinary values, not errors: `NotFound` becomes a 404 and
/// `MethodNotAllowed` a 405 with an `Allow` header.
#[derive(Debug, Clone)]
pub enum MatchResult {
    Matched(RouteMatch),
    /// Some route matched the path, none accepted the verb
    MethodNotAllowed {
        /// Union of the verbs accepted by every structurally matching route
        allowed: Vec<Method>,
    },
    NotFound,
}

impl MatchResult {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    /// Value for an `Allow` header, when the result is a 405
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            MatchResult::MethodNotAllowed { allowed } => Some(
                allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

/// Ordered route collection plus a name index.
///
/// Registration order matters: the first route whose template and verb both
/// match wins.
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    names: HashMap<String, usize>,
    resolver: EndpointResolver,
}

impl RouteTable {
    #[must_use]
    pub fn new(resolver: EndpointResolver) -> Self {
        Self {
            routes: Vec::new(),
            names: HashMap::new(),
            resolver,
        }
    }

    /// Compile `template`, resolve `target` under `namespace` and append the route.
    ///
    /// A name already in use is taken over by the new route.
    ///
    /// # Errors
    ///
    /// [`RouterError::PatternCompile`] for a malformed template and
    /// [`RouterError::NotCallableEndpoint`] for a target without an invoke contract.
    pub fn register(
        &mut self,
        verbs: &[Method],
        template: &str,
        target: EndpointSpec,
        name: Option<&str>,
        constraints: &ConstraintSet,
        namespace: &str,
    ) -> Result<(), RouterError> {
        let pattern = PathPattern::compile(template, constraints)?;
        let endpoint = self.resolver.resolve(target, namespace)?;
        let lazy = endpoint.is_lazy();
        self.push(Route::new(verbs, pattern, endpoint, name));

        info!(
            verbs = ?verbs,
            template = %template,
            name = ?name,
            lazy = lazy,
            routes_count = self.routes.len(),
            "Route registered"
        );
        Ok(())
    }

    /// Append an already built route
    pub fn push(&mut self, route: Route) {
        let idx = self.routes.len();
        if let Some(name) = route.name() {
            if let Some(previous) = self.names.insert(name.to_string(), idx) {
                warn!(
                    name = %name,
                    previous_template = %self.routes[previous].pattern().template(),
                    template = %route.pattern().template(),
                    "Route name reused - last registration wins for path generation"
                );
            }
        }
        self.routes.push(Arc::new(route));
    }

    /// Walk the routes in registration order for `method` and `path`.
    ///
    /// `query` is the raw query string; it never takes part in matching.
    #[must_use]
    pub fn match_request(&self, method: &Method, path: &str, query: &str) -> MatchResult {
        self.match_with_query(method, path, &parse_query_params(query))
    }

    pub(crate) fn match_with_query(
        &self,
        method: &Method,
        path: &str,
        query_params: &ParamVec,
    ) -> MatchResult {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let mut allowed: Vec<Method> = Vec::new();
        let mut structural = false;

        for route in &self.routes {
            let Some(path_params) = route.pattern.match_path(path) else {
                continue;
            };
            if route.accepts(method) {
                let duration = match_start.elapsed();
                log_match(method, path, route, duration);
                let params = merge_params(&path_params, query_params);
                return MatchResult::Matched(RouteMatch {
                    route: Arc::clone(route),
                    path_params,
                    query_params: query_params.clone(),
                    params,
                });
            }
            structural = true;
            for verb in route.allowed_verbs() {
                if !allowed.contains(&verb) {
                    allowed.push(verb);
                }
            }
        }

        if structural {
            debug!(
                method = %method,
                path = %path,
                allowed = ?allowed,
                "Path matched but verb not allowed"
            );
            MatchResult::MethodNotAllowed { allowed }
        } else {
            debug!(
                method = %method,
                path = %path,
                duration_us = match_start.elapsed().as_micros(),
                "No route matched"
            );
            MatchResult::NotFound
        }
    }

    /// Build the path for the route registered as `name`.
    ///
    /// # Errors
    ///
    /// [`RouterError::RouteNotFound`] for an unknown name; generation failures
    /// come back as [`RouterError::InvalidRouteArguments`] wrapping the cause.
    pub fn generate_path(&self, name: &str, args: &RouteArgs) -> Result<String, RouterError> {
        let route = self.get(name).ok_or_else(|| RouterError::RouteNotFound {
            name: name.to_string(),
        })?;
        route
            .pattern
            .generate(args)
            .map_err(|source| RouterError::InvalidRouteArguments {
                name: name.to_string(),
                args: format!("{args:?}"),
                source: Box::new(source),
            })
    }

    /// Route registered under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.names.get(name).and_then(|&i| self.routes.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Drop every route and name
    pub fn clear(&mut self) {
        self.routes.clear();
        self.names.clear();
    }
}

fn log_match(method: &Method, path: &str, route: &Route, duration: Duration) {
    if duration > Duration::from_millis(1) {
        warn!(
            method = %method,
            path = %path,
            route_pattern = %route.pattern.template(),
            duration_us = duration.as_micros(),
            "Slow route matching detected"
        );
    } else {
        debug!(
            method = %method,
            path = %path,
            route_pattern = %route.pattern.template(),
            route_name = ?route.name(),
            duration_us = duration.as_micros(),
            "Route matched"
        );
    }
}
