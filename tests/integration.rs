//! End-to-end scenarios exercising the pattern compiler, dispatcher, and URI
//! generator together through the public API.

use std::collections::HashMap;
use viaroute::{
    GenerateOptions, HandlerRef, MatchError, ReferenceType, Request, RouteBuilder,
    RouteCollection, UriGenerator,
};

fn handler(name: &str) -> HandlerRef {
    HandlerRef::Callable(name.to_string())
}

#[test]
fn scenario_1_simple_int_variable_matches() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/users/{id:int}", handler("H1")).name("h1"));
    let router = rc.build().unwrap();

    let m = router.match_request(&Request::new("GET", "/users/42")).unwrap();
    assert_eq!(m.handler_ref, handler("H1"));
    assert_eq!(m.get("id"), Some("42"));
}

#[test]
fn scenario_2_wrong_method_reports_allowed_union() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/users/{id:int}", handler("H1")).name("h1"));
    rc.add_route(RouteBuilder::post("/users/{id:int}", handler("H2")).name("h2"));
    let router = rc.build().unwrap();

    let err = router
        .match_request(&Request::new("DELETE", "/users/42"))
        .unwrap_err();
    match err {
        MatchError::MethodNotAllowed { allowed, .. } => {
            assert_eq!(allowed, vec!["GET".to_string(), "POST".to_string()]);
        }
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

#[test]
fn scenario_3_optional_leading_segment_with_inline_constraint() {
    let mut rc = RouteCollection::new();
    rc.add_route(
        RouteBuilder::get("/[{lang:[a-z]{2}}/]hello", handler("H3")).name("h3"),
    );
    let router = rc.build().unwrap();

    let m = router.match_request(&Request::new("GET", "/hello")).unwrap();
    assert_eq!(m.get("lang"), None);

    let m = router.match_request(&Request::new("GET", "/en/hello")).unwrap();
    assert_eq!(m.get("lang"), Some("en"));
}

#[test]
fn scenario_4_scheme_constrained_host_pattern() {
    let mut rc = RouteCollection::new();
    rc.add_route(
        RouteBuilder::get("/api", handler("H4"))
            .name("h4")
            .host("{sub}.example.com")
            .scheme("https"),
    );
    let router = rc.build().unwrap();

    let err = router
        .match_request(
            &Request::new("GET", "/api")
                .scheme("http")
                .host("foo.example.com"),
        )
        .unwrap_err();
    match err {
        MatchError::UriConstraintViolation { allowed_schemes, .. } => {
            assert!(allowed_schemes.contains("https"));
        }
        other => panic!("expected UriConstraintViolation, got {other:?}"),
    }

    let m = router
        .match_request(
            &Request::new("GET", "/api")
                .scheme("https")
                .host("foo.example.com"),
        )
        .unwrap();
    assert_eq!(m.get("sub"), Some("foo"));
}

#[test]
fn scenario_5_static_route_takes_precedence_over_dynamic() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/a", handler("static_a")).name("static_a"));
    rc.add_route(RouteBuilder::get("/{x}", handler("dynamic_x")).name("dynamic_x"));
    let router = rc.build().unwrap();

    let m = router.match_request(&Request::new("GET", "/a")).unwrap();
    assert_eq!(m.handler_ref, handler("static_a"));

    let m = router.match_request(&Request::new("GET", "/b")).unwrap();
    assert_eq!(m.handler_ref, handler("dynamic_x"));
    assert_eq!(m.get("x"), Some("b"));
}

#[test]
fn scenario_6_generation_with_optional_default_and_missing_variable() {
    let mut rc = RouteCollection::new();
    rc.add_route(
        RouteBuilder::get("/users/{id:int}[.{fmt=json}]", handler("show")).name("show"),
    );
    let router = rc.build().unwrap();
    let gen = UriGenerator::new(&router);

    let mut params = HashMap::new();
    params.insert("id".to_string(), "7".to_string());
    let uri = gen
        .generate("show", &params, ReferenceType::AbsolutePath, &GenerateOptions::default())
        .unwrap();
    assert_eq!(uri, "/users/7.json");

    let mut params_xml = params.clone();
    params_xml.insert("fmt".to_string(), "xml".to_string());
    let uri = gen
        .generate(
            "show",
            &params_xml,
            ReferenceType::AbsolutePath,
            &GenerateOptions::default(),
        )
        .unwrap();
    assert_eq!(uri, "/users/7.xml");

    let err = gen
        .generate(
            "show",
            &HashMap::new(),
            ReferenceType::AbsolutePath,
            &GenerateOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        viaroute::GenerateError::MissingVariable { ref variable, .. } if variable == "id"
    ));
}

#[test]
fn nested_optional_boundary_matches_all_four_cases() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/[{a}/[{b}]]", handler("nested")).name("nested"));
    let router = rc.build().unwrap();

    let m = router.match_request(&Request::new("GET", "/")).unwrap();
    assert_eq!(m.get("a"), None);
    assert_eq!(m.get("b"), None);

    let m = router.match_request(&Request::new("GET", "/x")).unwrap();
    assert_eq!(m.get("a"), Some("x"));
    assert_eq!(m.get("b"), None);

    let m = router.match_request(&Request::new("GET", "/x/")).unwrap();
    assert_eq!(m.get("a"), Some("x"));
    assert_eq!(m.get("b"), None);

    let m = router.match_request(&Request::new("GET", "/x/y")).unwrap();
    assert_eq!(m.get("a"), Some("x"));
    assert_eq!(m.get("b"), Some("y"));
}

#[test]
fn round_trip_generate_then_match_recovers_parameters() {
    let mut rc = RouteCollection::new();
    rc.add_route(RouteBuilder::get("/users/{id:int}/posts/{slug}", handler("post")).name("post"));
    let router = rc.build().unwrap();
    let gen = UriGenerator::new(&router);

    let mut params = HashMap::new();
    params.insert("id".to_string(), "99".to_string());
    params.insert("slug".to_string(), "hello-world".to_string());

    let uri = gen
        .generate("post", &params, ReferenceType::AbsolutePath, &GenerateOptions::default())
        .unwrap();

    let m = router.match_request(&Request::new("GET", &uri)).unwrap();
    assert_eq!(m.get("id"), Some("99"));
    assert_eq!(m.get("slug"), Some("hello-world"));
}
