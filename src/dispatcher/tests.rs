use super::*;
use crate::pattern::ParamVec;
use http::Method;
use std::sync::Arc;

#[test]
fn test_query_params_decoded() {
    let params = parse_query_params("?q=rust+book&page=2&tag=a%2Fb");
    assert_eq!(params.len(), 3);
    assert_eq!(params[0].1, "rust book");
    assert_eq!(params[2].1, "a/b");
}

#[test]
fn test_empty_query() {
    assert!(parse_query_params("").is_empty());
    assert!(parse_query_params("?").is_empty());
}

#[test]
fn test_merge_path_wins_over_query() {
    let query = parse_query_params("id=99&sort=asc");
    let mut path = ParamVec::new();
    path.push((Arc::from("id"), "23".to_string()));
    let merged = merge_params(&path, &query);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].1, "23");
    assert_eq!(merged[1].0.as_ref(), "sort");
}

#[test]
fn test_new_request_exposes_query_as_params() {
    let req = HandlerRequest::new(Method::GET, "/books", "page=2");
    assert_eq!(req.get_param("page"), Some("2"));
    assert_eq!(req.get_query_param("page"), Some("2"));
    assert!(req.path_params.is_empty());
}

#[test]
fn test_closure_is_handler() {
    let h = |req: HandlerRequest| HandlerResponse::text(200, &req.path);
    let res = h.invoke(HandlerRequest::new(Method::GET, "/ping", ""));
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!("/ping"));
    assert_eq!(res.get_header("Content-Type"), Some("text/plain"));
}

#[test]
fn test_set_header_replaces_case_insensitively() {
    let mut res = HandlerResponse::error(405, "Method Not Allowed");
    res.set_header("Allow", "GET".to_string());
    res.set_header("allow", "GET, HEAD".to_string());
    assert_eq!(res.get_header("ALLOW"), Some("GET, HEAD"));
    assert_eq!(
        res.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("allow")).count(),
        1
    );
}
