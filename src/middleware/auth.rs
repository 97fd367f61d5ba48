use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Bearer-token check; anything else gets a 401.
pub struct AuthMiddleware {
    expected: String,
}

impl AuthMiddleware {
    pub fn new(token: &str) -> Self {
        Self {
            expected: format!("Bearer {token}"),
        }
    }
}

impl Middleware for AuthMiddleware {
    fn before(&self, req: &HandlerRequest) -> Option<HandlerResponse> {
        match req.get_header("authorization") {
            Some(h) if h == self.expected => None,
            _ => {
                let mut res = HandlerResponse::error(401, "Unauthorized");
                res.set_header("WWW-Authenticate", "Bearer".to_string());
                Some(res)
            }
        }
    }
}
