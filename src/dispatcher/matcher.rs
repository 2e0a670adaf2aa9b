//! Request matcher (§4.D).

use crate::error::MatchError;
use crate::route::{HandlerRef, RouteId};
use crate::router::Router;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Maximum number of path/host variables kept inline before the match's
/// variable map would need to spill to the heap's growth path.
pub const MAX_INLINE_VARS: usize = 8;

/// Narrow request view the matcher consumes (§9 "Duck-typed request object
/// → narrow interface").
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Request {
            method: method.into().to_uppercase(),
            scheme: String::new(),
            host: String::new(),
            port: None,
            path: path.into(),
        }
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into().to_lowercase();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    fn host_with_port(&self) -> String {
        match self.port {
            Some(p) => format!("{}:{p}", self.host),
            None => self.host.clone(),
        }
    }
}

/// A successful match (§6 "Match result output").
#[derive(Debug, Clone)]
pub struct Match {
    pub route_id: RouteId,
    pub name: String,
    pub handler_ref: HandlerRef,
    pub vars: SmallVec<[(String, String); MAX_INLINE_VARS]>,
    /// The route's opaque condition tag, if any (SPEC_FULL §F.4), for the
    /// caller's own re-evaluation; never evaluated by the core.
    pub extra_condition: Option<String>,
}

impl Match {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Typed view for callers that want a numeric binding (§6: "a separate
    /// typed view when caller requests it").
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn vars_map(&self) -> HashMap<String, String> {
        self.vars.iter().cloned().collect()
    }
}

pub fn normalize_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy().to_string();
    if decoded == "/" {
        decoded
    } else if let Some(stripped) = decoded.strip_suffix('/') {
        stripped.to_string()
    } else {
        decoded
    }
}

pub fn match_request(router: &Router, req: &Request) -> Result<Match, MatchError> {
    debug!(method = %req.method, path = %req.path, "route match attempt");
    let normalized = normalize_path(&req.path);

    let mut candidates: Vec<RouteId> = router
        .static_routes
        .get(&normalized)
        .or_else(|| router.static_with_optional_slash.get(&normalized))
        .cloned()
        .unwrap_or_default();

    let mut dynamic_vars: HashMap<RouteId, HashMap<String, String>> = HashMap::new();

    if candidates.is_empty() {
        if let Some(dynamic) = &router.dynamic {
            if let Some(caps) = dynamic.regex.captures(&normalized) {
                let branch = dynamic
                    .branch_vars
                    .iter()
                    .enumerate()
                    .find(|(idx, _)| caps.name(&format!("br_{idx}")).is_some())
                    .map(|(idx, _)| idx);
                if let Some(idx) = branch {
                    let route_id = dynamic.branch_route[idx];
                    let mut vars = HashMap::new();
                    for (group_name, var_name) in &dynamic.branch_vars[idx] {
                        if let Some(m) = caps.name(group_name) {
                            vars.insert(var_name.clone(), m.as_str().to_string());
                        }
                    }
                    dynamic_vars.insert(route_id, vars);
                    candidates.push(route_id);
                }
            }
        }
    }

    if candidates.is_empty() {
        warn!(method = %req.method, path = %req.path, "no route matched");
        return Err(MatchError::NotFound {
            path: req.path.clone(),
        });
    }

    let mut allowed_methods: HashSet<String> = HashSet::new();
    let mut allowed_schemes: HashSet<String> = HashSet::new();
    let mut allowed_hosts: Vec<String> = Vec::new();
    let mut any_method_mismatch = false;

    for &route_id in &candidates {
        let route = &router.routes[route_id];

        if !route.methods.is_empty() && !route.methods.contains(&req.method) {
            any_method_mismatch = true;
            allowed_methods.extend(route.methods.iter().cloned());
            continue;
        }

        if !route.schemes.is_empty() && !route.schemes.contains(&req.scheme) {
            allowed_schemes.extend(route.schemes.iter().cloned());
            allowed_hosts.extend(route.hosts.iter().cloned());
            continue;
        }

        let mut host_vars: HashMap<String, String> = HashMap::new();
        let host_ok = if route.hosts.is_empty() {
            true
        } else {
            let candidate_host = req.host_with_port();
            let mut matched = false;
            for regex in router.host_regexes[route_id].iter() {
                if let Some(caps) = regex.captures(&candidate_host) {
                    for name in regex.capture_names().flatten() {
                        if let Some(m) = caps.name(name) {
                            host_vars.insert(name.to_string(), m.as_str().to_string());
                        }
                    }
                    matched = true;
                    break;
                }
            }
            matched
        };

        if !host_ok {
            allowed_schemes.extend(route.schemes.iter().cloned());
            allowed_hosts.extend(route.hosts.iter().cloned());
            continue;
        }

        let path_vars = dynamic_vars.get(&route_id);
        let compiled = &router.compiled[route_id];
        let mut vars = SmallVec::new();
        // Path variables take precedence over host variables, which take
        // precedence over defaults; a variable declared only on the host
        // (e.g. a subdomain capture) still needs a slot in the output table,
        // so the path and host variable lists are walked as one ordered,
        // deduplicated sequence (§4.D "Variable binding").
        let path_names: HashSet<&str> = compiled.variables.iter().map(|v| v.name.as_str()).collect();
        for var in compiled
            .variables
            .iter()
            .chain(compiled.host_variables.iter().filter(|v| !path_names.contains(v.name.as_str())))
        {
            // Path captures are already plain text: `normalize_path` percent-decodes
            // the whole path once, up front, before matching ever runs. Only the
            // host capture still carries raw percent-escapes, since `candidate_host`
            // above is matched straight off `req.host_with_port()` undecoded.
            let value = path_vars
                .and_then(|m| m.get(&var.name).cloned())
                .or_else(|| {
                    host_vars
                        .get(&var.name)
                        .map(|v| percent_decode_str(v).decode_utf8_lossy().to_string())
                })
                .or_else(|| var.default.clone());
            if let Some(value) = value {
                vars.push((var.name.clone(), value));
            }
        }

        info!(
            route = %route.name,
            method = %req.method,
            path = %req.path,
            "route matched"
        );
        return Ok(Match {
            route_id,
            name: route.name.clone(),
            handler_ref: route.handler_ref.clone(),
            vars,
            extra_condition: route.extra_condition.clone(),
        });
    }

    if any_method_mismatch {
        let mut allowed: Vec<String> = allowed_methods.into_iter().collect();
        allowed.sort();
        warn!(method = %req.method, path = %req.path, ?allowed, "method not allowed");
        Err(MatchError::MethodNotAllowed {
            path: req.path.clone(),
            method: req.method.clone(),
            allowed,
        })
    } else {
        warn!(
            method = %req.method,
            path = %req.path,
            scheme = %req.scheme,
            host = %req.host,
            "uri constraint violation"
        );
        Err(MatchError::UriConstraintViolation {
            path: req.path.clone(),
            attempted_scheme: req.scheme.clone(),
            attempted_host: req.host_with_port(),
            allowed_schemes,
            allowed_hosts,
        })
    }
}
