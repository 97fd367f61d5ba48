use super::*;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};
use http::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Appends its label to a shared log in `before` and `after`
struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Middleware for Recorder {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.log.lock().unwrap().push(format!("before:{}", self.label));
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
        self.log.lock().unwrap().push(format!("after:{}", self.label));
        res.set_header("x-seen-by", self.label.to_string());
    }
}

struct Reject;

impl Middleware for Reject {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        Some(HandlerResponse::error(403, "Forbidden"))
    }
}

fn counting_app(hits: Arc<AtomicUsize>) -> impl Handler {
    move |_req: HandlerRequest| {
        hits.fetch_add(1, Ordering::SeqCst);
        HandlerResponse::text(200, "app")
    }
}

fn get(path: &str) -> HandlerRequest {
    HandlerRequest::new(Method::GET, path, "")
}

#[test]
fn test_stack_runs_every_hook_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let hits = Arc::new(AtomicUsize::new(0));
    let middlewares: Vec<Arc<dyn Middleware>> = vec![
        Arc::new(Recorder { label: "a", log: Arc::clone(&log) }),
        Arc::new(Recorder { label: "b", log: Arc::clone(&log) }),
    ];
    let stack = Stack::new(middlewares, Arc::new(counting_app(Arc::clone(&hits))));

    let res = stack.invoke(get("/"));
    assert_eq!(res.status, 200);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(res.get_header("x-seen-by"), Some("b"));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["before:a", "before:b", "after:a", "after:b"]
    );
}

#[test]
fn test_early_response_skips_app_but_not_hooks() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let hits = Arc::new(AtomicUsize::new(0));
    let middlewares: Vec<Arc<dyn Middleware>> = vec![
        Arc::new(Reject),
        Arc::new(Recorder { label: "late", log: Arc::clone(&log) }),
    ];
    let stack = Stack::new(middlewares, Arc::new(counting_app(Arc::clone(&hits))));

    let res = stack.invoke(get("/"));
    assert_eq!(res.status, 403);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(*log.lock().unwrap(), vec!["before:late", "after:late"]);
}

#[test]
fn test_prefix_stacks_inherit_root_and_ancestors() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let rec = |label| Recorder { label, log: Arc::clone(&log) };
    let app = MiddlewareApp::builder(|_req: HandlerRequest| HandlerResponse::text(200, "ok"))
        .use_middleware(rec("root"))
        .use_at("/admin/reports", rec("reports"))
        .use_at("/admin", rec("admin"))
        .build()
        .unwrap();

    assert_eq!(app.stack_for("/books").len(), 1);
    assert_eq!(app.stack_for("/admin/users").len(), 2);
    assert_eq!(app.stack_for("/admin/reports/2024").len(), 3);

    app.invoke(get("/admin/reports/2024"));
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "before:root",
            "before:admin",
            "before:reports",
            "after:root",
            "after:admin",
            "after:reports"
        ]
    );
}

#[test]
fn test_auth_middleware() {
    let auth = AuthMiddleware::new("s3cret");
    assert!(auth
        .before(&get("/").with_header("Authorization", "Bearer s3cret"))
        .is_none());

    let denied = auth
        .before(&get("/").with_header("Authorization", "Bearer nope"))
        .unwrap();
    assert_eq!(denied.status, 401);
    assert_eq!(denied.body, serde_json::json!({ "error": "Unauthorized" }));
    assert_eq!(denied.get_header("www-authenticate"), Some("Bearer"));
    assert!(auth.before(&get("/")).is_some());
}

#[test]
fn test_metrics_middleware_counts_by_status() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let app = MiddlewareApp::builder(|req: HandlerRequest| match req.path.as_str() {
        "/boom" => HandlerResponse::error(500, "boom"),
        "/missing" => HandlerResponse::error(404, "Not Found"),
        _ => HandlerResponse::text(200, "ok"),
    })
    .use_arc_at("/", Arc::clone(&metrics) as Arc<dyn Middleware>)
    .build()
    .unwrap();

    for path in ["/", "/boom", "/missing", "/ok"] {
        app.invoke(get(path));
    }
    assert_eq!(metrics.request_count(), 4);
    assert_eq!(metrics.client_errors(), 1);
    assert_eq!(metrics.server_errors(), 1);
}

#[test]
fn test_metrics_average_latency_zero_without_requests() {
    assert_eq!(MetricsMiddleware::new().average_latency(), Duration::ZERO);
}

#[test]
fn test_tracing_middleware_is_passive() {
    let app = MiddlewareApp::builder(|_req: HandlerRequest| HandlerResponse::text(200, "ok"))
        .use_middleware(TracingMiddleware)
        .build()
        .unwrap();
    assert_eq!(app.invoke(get("/x")).status, 200);
}
