use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Request counters and latency totals.
///
/// All counters use atomic operations with `Ordering::Relaxed`: values are
/// eventually consistent and never block a request.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests seen
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Responses with a 4xx status
    #[must_use]
    pub fn client_errors(&self) -> usize {
        self.client_errors.load(Ordering::Relaxed)
    }

    /// Responses with a 5xx status
    #[must_use]
    pub fn server_errors(&self) -> usize {
        self.server_errors.load(Ordering::Relaxed)
    }

    /// Mean processing time; zero before the first request
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
        match res.status {
            400..=499 => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            500..=599 => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}
