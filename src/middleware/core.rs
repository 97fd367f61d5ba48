use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};

/// Hooks run around a handler call.
///
/// Every middleware's `before` runs, in order, even after an earlier one
/// returned a response; the first response returned replaces the handler
/// call. Every `after` runs on the final response.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}

/// An application wrapped in an ordered list of middlewares
#[derive(Clone)]
pub struct Stack {
    middlewares: Vec<Arc<dyn Middleware>>,
    app: Arc<dyn Handler>,
}

impl Stack {
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>, app: Arc<dyn Handler>) -> Self {
        Self { middlewares, app }
    }

    /// Number of middlewares wrapped around the app
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl Handler for Stack {
    fn invoke(&self, req: HandlerRequest) -> HandlerResponse {
        if self.middlewares.is_empty() {
            return self.app.invoke(req);
        }

        let mut early_resp: Option<HandlerResponse> = None;
        for (idx, mw) in self.middlewares.iter().enumerate() {
            if early_resp.is_none() {
                early_resp = mw.before(&req);
                if early_resp.is_some() {
                    debug!(
                        path = %req.path,
                        middleware_idx = idx,
                        "Middleware returned early response"
                    );
                }
            } else {
                // later hooks still observe the request
                mw.before(&req);
            }
        }

        let (mut resp, latency) = match early_resp {
            Some(r) => (r, Duration::ZERO),
            None => {
                let start = Instant::now();
                let r = self.app.invoke(req.clone());
                (r, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(&req, &mut resp, latency);
        }
        resp
    }
}
