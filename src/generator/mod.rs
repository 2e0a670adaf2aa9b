//! Reverse URI generation (§4.E).

use crate::error::GenerateError;
use crate::pattern::Token;
use crate::route::Route;
use crate::router::Router;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashMap;
use tracing::debug;

/// Characters a path/host segment is allowed to carry unescaped, on top of
/// the unreserved set `percent-encoding` always leaves alone (§4.E step 3).
const PATH_PRESERVED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'%')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']');

const QUERY_VALUE: &AsciiSet = &PATH_PRESERVED.add(b'&').add(b'=').add(b'+');

/// Controls which absolute/relative form [`UriGenerator::generate`] produces
/// (§4.E step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    /// `scheme://host[:port]/path`
    AbsoluteUrl,
    /// `/path`, no scheme or host.
    AbsolutePath,
    /// Bare `path`, relative to the current document (no leading `/`).
    RelativePath,
    /// `//host[:port]/path`, scheme omitted.
    NetworkPath,
}

/// Extra generation inputs beyond the route's own variables (§4.E step 5/6).
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub port: Option<i64>,
    pub query: Option<HashMap<String, String>>,
    pub fragment: Option<String>,
}

/// Builds URIs from a frozen [`Router`] by walking a route's compiled token
/// stream in reverse (§4.E).
pub struct UriGenerator<'a> {
    router: &'a Router,
}

impl<'a> UriGenerator<'a> {
    pub fn new(router: &'a Router) -> Self {
        UriGenerator { router }
    }

    pub fn generate(
        &self,
        name: &str,
        vars: &HashMap<String, String>,
        reference: ReferenceType,
        options: &GenerateOptions,
    ) -> Result<String, GenerateError> {
        let (route_id, route) = self
            .router
            .route_by_name(name)
            .ok_or_else(|| GenerateError::UnknownRoute {
                name: name.to_string(),
            })?;
        let compiled = self
            .router
            .compiled(route_id)
            .expect("route_by_name id is always a valid compiled index");

        let path = render_tokens(&compiled.path_tokens, route, vars)?;

        let needs_authority = matches!(
            reference,
            ReferenceType::AbsoluteUrl | ReferenceType::NetworkPath
        );

        let mut out = String::new();
        if needs_authority {
            let host = if let Some(host_tokens) = &compiled.host_tokens {
                render_tokens(host_tokens, route, vars)?
            } else {
                route.hosts().first().cloned().unwrap_or_default()
            };

            if reference == ReferenceType::AbsoluteUrl {
                let scheme = pick_scheme(route);
                out.push_str(&scheme);
                out.push_str("://");
            } else {
                out.push_str("//");
            }
            out.push_str(&host);

            if let Some(port) = options.port {
                if !(0..=65535).contains(&port) {
                    return Err(GenerateError::InvalidPort {
                        route: name.to_string(),
                        port,
                    });
                }
                let scheme = pick_scheme(route);
                let is_default_port =
                    (scheme == "https" && port == 443) || (scheme == "http" && port == 80);
                if !is_default_port {
                    out.push(':');
                    out.push_str(&port.to_string());
                }
            }
        }

        if reference == ReferenceType::RelativePath {
            out.push('.');
        }
        out.push_str(&path);

        if let Some(query) = &options.query {
            if !query.is_empty() {
                let mut pairs: Vec<String> = query
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}={}",
                            utf8_percent_encode(k, QUERY_VALUE),
                            utf8_percent_encode(v, QUERY_VALUE)
                        )
                    })
                    .collect();
                pairs.sort();
                out.push('?');
                out.push_str(&pairs.join("&"));
            }
        }

        if let Some(fragment) = &options.fragment {
            out.push('#');
            out.push_str(&utf8_percent_encode(fragment, PATH_PRESERVED).to_string());
        }

        debug!(route = %name, uri = %out, "uri generated");
        Ok(out)
    }
}

fn pick_scheme(route: &Route) -> String {
    if route.schemes().contains("https") {
        "https".to_string()
    } else if let Some(last) = route.schemes().iter().last() {
        last.clone()
    } else {
        "http".to_string()
    }
}

/// Reverse-walks a token stream, resolving each `Var` from `vars`, then the
/// route's declared defaults, then the variable's inline default, dropping
/// whole optional regions whose variables are all unresolved rather than
/// failing (§4.E step 2 "optional regions fold away cleanly").
fn render_tokens(
    tokens: &[Token],
    route: &Route,
    vars: &HashMap<String, String>,
) -> Result<String, GenerateError> {
    let (out, _) = render_range(tokens, 0, tokens.len(), route, vars, false)?;
    Ok(out)
}

/// Returns `(rendered, any_variable_was_resolved)`. The second field lets an
/// optional region's caller decide whether to keep or drop it.
fn render_range(
    tokens: &[Token],
    start: usize,
    end: usize,
    route: &Route,
    vars: &HashMap<String, String>,
    within_optional: bool,
) -> Result<(String, bool), GenerateError> {
    let mut out = String::new();
    let mut any_resolved = false;
    let mut i = start;
    while i < end {
        match &tokens[i] {
            Token::Lit(s) => {
                out.push_str(s);
                i += 1;
            }
            Token::Var { name, default, .. } => {
                let value = vars
                    .get(name)
                    .cloned()
                    .or_else(|| route.defaults().get(name).cloned())
                    .or_else(|| default.clone());
                match value {
                    Some(v) => {
                        out.push_str(&utf8_percent_encode(&v, PATH_PRESERVED).to_string());
                        any_resolved = true;
                    }
                    None => {
                        if within_optional {
                            return Ok((String::new(), false));
                        }
                        return Err(GenerateError::MissingVariable {
                            route: route.name().to_string(),
                            variable: name.clone(),
                        });
                    }
                }
                i += 1;
            }
            Token::OptStart => {
                let close = matching_opt_end(tokens, i);
                let (inner, resolved) =
                    render_range(tokens, i + 1, close, route, vars, true)?;
                if resolved {
                    out.push_str(&inner);
                    any_resolved = true;
                }
                i = close + 1;
            }
            Token::OptEnd => unreachable!("matching handled by matching_opt_end"),
        }
    }
    Ok((out, any_resolved))
}

fn matching_opt_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0;
    for (off, tok) in tokens[start..].iter().enumerate() {
        match tok {
            Token::OptStart => depth += 1,
            Token::OptEnd => {
                depth -= 1;
                if depth == 0 {
                    return start + off;
                }
            }
            _ => {}
        }
    }
    unreachable!("bracket nesting already validated at compile time")
}
