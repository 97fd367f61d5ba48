mod common;

use std::sync::Arc;

use switchyard::router::load_routes;
use switchyard::{HandlerRegistry, Router, RouterConfig, Target};

use common::temp_files::create_temp_yaml;
use common::text;

#[test]
fn test_config_from_yaml_file_partial() {
    let file = create_temp_yaml("prefix: /api\nbase_url: https://books.example.com\n");
    let config = RouterConfig::from_yaml_file(file.path()).unwrap();

    assert_eq!(config.prefix, "/api");
    assert_eq!(config.base_url, "https://books.example.com");
    assert_eq!(config.separator, "#");
    assert!(config.namespace.is_empty());
}

#[test]
fn test_config_from_yaml_file_invalid() {
    let file = create_temp_yaml("separator: \"\"\n");
    let err = RouterConfig::from_yaml_file(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("separator"));

    let file = create_temp_yaml("prefix: [not, a, string]\n");
    assert!(RouterConfig::from_yaml_file(file.path()).is_err());
}

#[test]
fn test_config_missing_file() {
    let err = RouterConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_route_file_end_to_end() {
    let routes = create_temp_yaml(
        r#"
namespace: Shop
routes:
  - verbs: [GET]
    path: /books/:id(.:format)
    to: books#show
    as: book
    constraints:
      id: '\d+'
  - verbs: [POST]
    path: /books
    to: books#create
"#,
    );
    let file = load_routes(routes.path()).unwrap();

    let registry = Arc::new(HandlerRegistry::new());
    registry.define("Shop::Books::Show", Target::singleton(text("show")));
    registry.define("Shop::Books::Create", Target::singleton(text("create")));

    let mut router = Router::new(RouterConfig::default(), registry);
    assert_eq!(router.register_all(&file).unwrap(), 2);
    let router = router.freeze();

    assert_eq!(router.handle("GET", "/books/1.json", "").body, serde_json::json!("show"));
    assert_eq!(router.handle("GET", "/books/x", "").status, 404);
    assert_eq!(router.handle("POST", "/books", "").body, serde_json::json!("create"));
    assert_eq!(router.handle("DELETE", "/books", "").status, 405);
    assert_eq!(
        router
            .path_for("book", &switchyard::RouteArgs::keyed([("id", "1")]))
            .unwrap(),
        "/books/1"
    );
}

#[test]
fn test_route_file_invalid_yaml() {
    let routes = create_temp_yaml("routes: [ {path: }\n");
    let err = load_routes(routes.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse route file"));
}
