use super::*;
use crate::collection::{RouteBuilder, RouteCollection};
use crate::route::HandlerRef;

fn handler(name: &str) -> HandlerRef {
    HandlerRef::Callable(name.to_string())
}

#[test]
fn matches_a_static_route() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/health", handler("health")).name("health"));
    let router = rc.build().unwrap();

    let m = router.match_request(&Request::new("GET", "/health")).unwrap();
    assert_eq!(m.name, "health");
    assert_eq!(m.handler_ref, handler("health"));
}

#[test]
fn matches_a_dynamic_route_and_binds_variables() {
    let mut rc = RouteCollection::new();
    rc.add_route(
        RouteBuilder::get("/users/{id:int}", handler("user_show")).name("user_show"),
    );
    let router = rc.build().unwrap();

    let m = router
        .match_request(&Request::new("GET", "/users/42"))
        .unwrap();
    assert_eq!(m.get("id"), Some("42"));
    assert_eq!(m.get_i64("id"), Some(42));
}

#[test]
fn falls_through_to_method_not_allowed_over_not_found() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::post("/widgets", handler("create")).name("create"));
    let router = rc.build().unwrap();

    let err = router
        .match_request(&Request::new("GET", "/widgets"))
        .unwrap_err();
    match err {
        crate::error::MatchError::MethodNotAllowed { allowed, .. } => {
            assert_eq!(allowed, vec!["POST".to_string()]);
        }
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

#[test]
fn unknown_path_is_not_found() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/widgets", handler("index")).name("index"));
    let router = rc.build().unwrap();

    let err = router
        .match_request(&Request::new("GET", "/nope"))
        .unwrap_err();
    assert!(matches!(err, crate::error::MatchError::NotFound { .. }));
}

#[test]
fn host_mismatch_raises_uri_constraint_violation() {
    let mut rc = RouteCollection::new();
    rc.add_route(
        RouteBuilder::get("/admin", handler("admin"))
            .name("admin")
            .host("admin.example.com"),
    );
    let router = rc.build().unwrap();

    let req = Request::new("GET", "/admin").host("www.example.com");
    let err = router.match_request(&req).unwrap_err();
    assert!(matches!(
        err,
        crate::error::MatchError::UriConstraintViolation { .. }
    ));
}

#[test]
fn trailing_slash_variants_both_match_a_static_route() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/about/", handler("about")).name("about"));
    let router = rc.build().unwrap();

    assert!(router.match_request(&Request::new("GET", "/about")).is_ok());
    assert!(router.match_request(&Request::new("GET", "/about/")).is_ok());
}

#[test]
fn percent_encoded_path_segments_are_decoded_before_binding() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/search/{term}", handler("search")).name("search"));
    let router = rc.build().unwrap();

    let m = router
        .match_request(&Request::new("GET", "/search/hello%20world"))
        .unwrap();
    assert_eq!(m.get("term"), Some("hello world"));
}

#[test]
fn missing_variable_falls_back_to_default() {
    let mut rc = RouteCollection::new();
    rc.add_route(
        RouteBuilder::get("/archive[/{year:year}]", handler("archive"))
            .name("archive")
            .default("year", "2000"),
    );
    let router = rc.build().unwrap();

    let m = router.match_request(&Request::new("GET", "/archive")).unwrap();
    assert_eq!(m.get("year"), Some("2000"));
}
