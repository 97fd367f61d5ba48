mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use switchyard::dispatcher::{HandlerRequest, HandlerResponse};
use switchyard::{ConstraintSet, EndpointSpec, RouterConfig, Target};

use common::{router, text};

#[test]
fn test_lazy_target_defined_before_first_call() {
    let (mut router, registry) = router();
    router
        .register(&[Method::GET], "/login", "sessions#new".into(), Some("login"), &ConstraintSet::new())
        .unwrap();
    assert!(router.table().get("login").unwrap().endpoint().is_lazy());
    let router = router.freeze();

    registry.define("Sessions::New", Target::singleton(text("login form")));

    let res = router.handle("GET", "/login", "");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!("login form"));
}

#[test]
fn test_lazy_target_follows_redefinition_and_removal() {
    let (mut router, registry) = router();
    router
        .register(&[Method::GET], "/report", "reports#daily".into(), None, &ConstraintSet::new())
        .unwrap();
    let router = router.freeze();

    registry.define("Reports::Daily", Target::singleton(text("v1")));
    assert_eq!(router.handle("GET", "/report", "").body, serde_json::json!("v1"));

    registry.define("Reports::Daily", Target::singleton(text("v2")));
    assert_eq!(router.handle("GET", "/report", "").body, serde_json::json!("v2"));

    assert!(registry.remove("Reports::Daily"));
    assert_eq!(router.handle("GET", "/report", "").status, 500);
}

#[test]
fn test_constructor_target_built_once_when_resolved_at_registration() {
    let (mut router, registry) = router();
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    registry.define(
        "Books::Index",
        Target::constructor(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            |_req: HandlerRequest| HandlerResponse::text(200, "books")
        }),
    );

    router
        .register(&[Method::GET], "/books", "books#index".into(), None, &ConstraintSet::new())
        .unwrap();
    let router = router.freeze();
    for _ in 0..3 {
        assert_eq!(router.handle("GET", "/books", "").status, 200);
    }
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_namespace_and_separator_from_config() {
    let registry = Arc::new(switchyard::HandlerRegistry::new());
    registry.define("Admin::Users::Show", Target::singleton(text("user")));

    let config = RouterConfig {
        separator: ".".to_string(),
        namespace: "Admin".to_string(),
        ..RouterConfig::default()
    };
    let mut router = switchyard::Router::new(config, registry);
    router
        .register(&[Method::GET], "/users/:id", EndpointSpec::name("users.show"), None, &ConstraintSet::new())
        .unwrap();
    assert!(!router.table().iter().next().unwrap().endpoint().is_lazy());
    assert_eq!(router.handle("GET", "/users/1", "").body, serde_json::json!("user"));
}
