use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use switchyard::dispatcher::{HandlerRequest, HandlerResponse};
use switchyard::pattern::Constraint;
use switchyard::{ConstraintSet, EndpointSpec, HandlerRegistry, RouteArgs, Router, RouterConfig};

const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/", "root"),
    ("GET", "/zoo/animals", "animals"),
    ("POST", "/zoo/animals", "create_animal"),
    ("GET", "/zoo/animals/:id", "animal"),
    ("PUT", "/zoo/animals/:id", "update_animal"),
    ("DELETE", "/zoo/animals/:id", "delete_animal"),
    ("GET", "/zoo/animals/:id/toys/:toy_id", "animal_toy"),
    (
        "GET",
        "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
        "habitat_section",
    ),
    (
        "POST",
        "/inventory/:warehouse_id/feeds/:feed_id/items/:item_id/batches/:batch_id",
        "post_item_batch",
    ),
    ("GET", "/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i", "complex_many_params"),
    ("GET", "/reports/:year(/:month(/:day))(.:format)", "report"),
    ("GET", "/files/*path", "file"),
];

fn build_router() -> Arc<Router> {
    let mut router = Router::new(RouterConfig::default(), Arc::new(HandlerRegistry::new()));
    for &(verb, template, name) in ROUTES {
        let method = Method::from_bytes(verb.as_bytes()).expect("valid verb");
        let constraints = if template.contains(":id") {
            ConstraintSet::new().with("id", Constraint::digits())
        } else {
            ConstraintSet::new()
        };
        router
            .register(
                &[method],
                template,
                EndpointSpec::handler(|_req: HandlerRequest| HandlerResponse::text(200, "ok")),
                Some(name),
                &constraints,
            )
            .expect("route registers");
    }
    router.freeze()
}

fn bench_route_throughput(c: &mut Criterion) {
    let router = build_router();
    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/123"),
            (Method::GET, "/zoo/animals/123/toys/456"),
            (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
            (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
            (Method::GET, "/reports/2024/05.json"),
        ];
        b.iter(|| {
            for (method, path) in &test_paths {
                black_box(router.recognize(method, path, ""));
            }
        })
    });

    c.bench_function("handle_miss_405", |b| {
        b.iter(|| black_box(router.handle("PATCH", "/zoo/animals/123", "")))
    });
}

fn bench_generation(c: &mut Criterion) {
    let router = build_router();
    let args = RouteArgs::keyed([("year", "2024"), ("month", "05"), ("format", "json"), ("page", "2")]);
    c.bench_function("path_for", |b| {
        b.iter(|| black_box(router.path_for("report", &args)))
    });
}

criterion_group!(benches, bench_route_throughput, bench_generation);
criterion_main!(benches);
