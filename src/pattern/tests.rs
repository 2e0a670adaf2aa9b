use super::*;
use regex::Regex;
use std::collections::HashMap;

fn compile_ok(pattern: &str) -> CompiledPattern {
    let empty = HashMap::new();
    compile_path(pattern, &empty, &empty, &empty).unwrap()
}

#[test]
fn plain_literal_has_no_variables_and_full_static_prefix() {
    let c = compile_ok("/hello");
    assert!(c.variables.is_empty());
    assert_eq!(c.static_prefix, "/hello");
    let re = Regex::new(&c.regex_source).unwrap();
    assert!(re.is_match("/hello"));
    assert!(!re.is_match("/hello/world"));
}

#[test]
fn named_type_constraint_compiles_int() {
    let c = compile_ok("/users/{id:int}");
    let re = Regex::new(&c.regex_source).unwrap();
    let caps = re.captures("/users/42").unwrap();
    assert_eq!(&caps["id"], "42");
    assert!(!re.is_match("/users/abc"));
    assert_eq!(c.static_prefix, "/users/");
}

#[test]
fn default_value_recorded_in_variable_table() {
    let c = compile_ok("/users/{id:int}[.{fmt=json}]");
    let fmt = c.variables.iter().find(|v| v.name == "fmt").unwrap();
    assert_eq!(fmt.default.as_deref(), Some("json"));
}

#[test]
fn nested_optional_matches_all_four_boundary_cases() {
    let c = compile_ok("/[{a}/[{b}]]");
    let re = Regex::new(&c.regex_source).unwrap();

    let caps = re.captures("/").unwrap();
    assert_eq!(caps.name("a"), None);
    assert_eq!(caps.name("b"), None);

    let caps = re.captures("/x").unwrap();
    assert_eq!(&caps["a"], "x");
    assert_eq!(caps.name("b"), None);

    let caps = re.captures("/x/").unwrap();
    assert_eq!(&caps["a"], "x");
    assert_eq!(caps.name("b"), None);

    let caps = re.captures("/x/y").unwrap();
    assert_eq!(&caps["a"], "x");
    assert_eq!(&caps["b"], "y");
}

#[test]
fn trailing_slash_is_tolerated_both_ways() {
    let c = compile_ok("/blog/");
    let re = Regex::new(&c.regex_source).unwrap();
    assert!(re.is_match("/blog/"));
    assert!(re.is_match("/blog"));

    let c = compile_ok("/blog");
    let re = Regex::new(&c.regex_source).unwrap();
    assert!(re.is_match("/blog"));
}

#[test]
fn inline_regex_constraint_strips_anchors() {
    let c = compile_ok("/lang/{lang:^[a-z]{2}$}");
    let re = Regex::new(&c.regex_source).unwrap();
    assert!(re.is_match("/lang/en"));
    assert!(!re.is_match("/lang/eng"));
}

#[test]
fn route_level_pattern_override_applies_without_inline_constraint() {
    let mut patterns = HashMap::new();
    patterns.insert("id".to_string(), "int".to_string());
    let empty = HashMap::new();
    let c = compile_path("/users/{id}", &patterns, &empty, &empty).unwrap();
    let re = Regex::new(&c.regex_source).unwrap();
    assert!(re.is_match("/users/42"));
    assert!(!re.is_match("/users/abc"));
}

#[test]
fn host_pattern_is_case_insensitive() {
    let empty = HashMap::new();
    let c = compile_host("{sub}.example.com", &empty, &empty, &empty).unwrap();
    let re = Regex::new(&c.regex_source).unwrap();
    assert!(re.is_match("Foo.Example.COM"));
}

#[test]
fn collection_alias_is_used_as_a_named_type() {
    let mut aliases = HashMap::new();
    aliases.insert("slug".to_string(), "[a-z0-9-]+".to_string());
    let empty = HashMap::new();
    let c = compile_path("/p/{s:slug}", &empty, &empty, &aliases).unwrap();
    let re = Regex::new(&c.regex_source).unwrap();
    assert!(re.is_match("/p/hello-world"));
    assert!(!re.is_match("/p/Hello_World"));
}
