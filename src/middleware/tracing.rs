use std::time::Duration;

use tracing::{debug, debug_span};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Emits a debug event on the way in and on the way out of every request
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        let span = debug_span!(
            "request",
            method = %req.method,
            path = %req.path,
            mount_prefix = %req.mount_prefix
        );
        span.in_scope(|| debug!("Request received"));
        None
    }

    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let span = debug_span!(
            "request",
            method = %req.method,
            path = %req.path,
            mount_prefix = %req.mount_prefix
        );
        span.in_scope(|| {
            debug!(
                status = res.status,
                route_name = ?req.route_name,
                latency_us = latency.as_micros(),
                "Request completed"
            );
        });
    }
}
