mod common;

use std::sync::Arc;

use http::Method;
use switchyard::middleware::{
    AuthMiddleware, MetricsMiddleware, Middleware, MiddlewareAppBuilder, TracingMiddleware,
};
use switchyard::{ConstraintSet, EndpointSpec, Handler, HandlerRequest};

use common::{echo, router};

#[test]
fn test_router_behind_per_path_stacks() {
    let (mut inner, _) = router();
    inner
        .register(&[Method::GET], "/books", EndpointSpec::handler(echo), None, &ConstraintSet::new())
        .unwrap();
    inner
        .register(&[Method::GET], "/admin/users", EndpointSpec::handler(echo), None, &ConstraintSet::new())
        .unwrap();

    let metrics = Arc::new(MetricsMiddleware::new());
    let app = MiddlewareAppBuilder::new(inner.freeze())
        .use_middleware(TracingMiddleware)
        .use_arc_at("/", Arc::clone(&metrics) as Arc<dyn Middleware>)
        .use_at("/admin", AuthMiddleware::new("token"))
        .build()
        .unwrap();

    let (mut outer, _) = router();
    outer.mount(app, "/").unwrap();
    let outer = outer.freeze();

    assert_eq!(outer.handle("GET", "/books", "").status, 200);
    assert_eq!(outer.handle("GET", "/admin/users", "").status, 401);
    assert_eq!(outer.handle("GET", "/missing", "").status, 404);

    let authed = HandlerRequest::new(Method::GET, "/admin/users", "")
        .with_header("Authorization", "Bearer token");
    assert_eq!(outer.invoke(authed).status, 200);

    assert_eq!(metrics.request_count(), 4);
    assert_eq!(metrics.client_errors(), 2);
}
