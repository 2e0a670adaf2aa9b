//! `RouteCollection::build()` (§3 Lifecycle, §4.C).

use super::{PendingRoute, RouteCollection};
use crate::dispatcher::fuse;
use crate::error::BuildError;
use crate::pattern::{compile_host, compile_path};
use crate::route::{CompiledRoute, Route};
use crate::router::Router;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

struct Resolved {
    route: Route,
}

pub(super) fn build(collection: RouteCollection) -> Result<Router, BuildError> {
    let RouteCollection {
        pending,
        aliases,
        group_stack,
    } = collection;
    debug_assert!(group_stack.is_empty(), "unclosed group at build time");

    let mut resolved: Vec<Resolved> = pending
        .into_iter()
        .map(|p| resolve_one(p))
        .collect::<Result<_, _>>()?;

    auto_name(&mut resolved);
    check_duplicate_names(&resolved)?;
    check_duplicate_routes(&resolved)?;

    // Compile every pattern before sorting, since the sort key depends on
    // the compiled static prefix (§4.C pre-pass).
    let mut compiled: Vec<CompiledRoute> = Vec::with_capacity(resolved.len());
    for r in &mut resolved {
        let cp = compile_path(&r.route.path, &r.route.patterns, &r.route.defaults, &aliases)?;
        r.route.static_prefix = cp.static_prefix.clone();

        let mut host_regex_sources = Vec::new();
        let mut host_tokens = None;
        let mut host_variables = Vec::new();
        for (idx, host) in r.route.hosts.iter().enumerate() {
            let ch = compile_host(host, &r.route.patterns, &r.route.defaults, &aliases)?;
            if idx == 0 {
                host_tokens = Some(ch.tokens.clone());
                host_variables = ch.variables;
            }
            host_regex_sources.push(ch.regex_source);
        }

        compiled.push(CompiledRoute {
            path_regex_source: cp.regex_source,
            host_regex_sources,
            variables: cp.variables,
            path_tokens: cp.tokens,
            host_tokens,
            host_variables,
        });
    }

    let mut order: Vec<usize> = (0..resolved.len()).collect();
    order.sort_by(|&a, &b| {
        let pa = &resolved[a].route;
        let pb = &resolved[b].route;
        let a_has_prefix = !pa.static_prefix.is_empty();
        let b_has_prefix = !pb.static_prefix.is_empty();
        // routes with a static prefix sort first; ties break on path.
        b_has_prefix
            .cmp(&a_has_prefix)
            .then_with(|| pa.path.cmp(&pb.path))
    });

    let routes: Vec<Route> = order.iter().map(|&i| resolved[i].route.clone()).collect();
    let compiled: Vec<CompiledRoute> = order.iter().map(|&i| compiled[i].clone()).collect();

    let mut host_regexes = Vec::with_capacity(compiled.len());
    for cr in &compiled {
        let mut v = Vec::with_capacity(cr.host_regex_sources.len());
        for src in &cr.host_regex_sources {
            v.push(Regex::new(src).map_err(|e| BuildError::InvalidConstraint {
                name: "<host>".to_string(),
                reason: e.to_string(),
            })?);
        }
        host_regexes.push(v);
    }

    let mut static_routes: HashMap<String, Vec<usize>> = HashMap::new();
    let mut static_with_optional_slash: HashMap<String, Vec<usize>> = HashMap::new();
    let mut dynamic_ids: Vec<usize> = Vec::new();

    for (id, (route, cr)) in routes.iter().zip(compiled.iter()).enumerate() {
        if cr.variables.is_empty() {
            static_routes.entry(route.path.clone()).or_default().push(id);
            if route.path.len() > 1 && route.path.ends_with('/') {
                let trimmed = route.path.trim_end_matches('/').to_string();
                static_with_optional_slash.entry(trimmed).or_default().push(id);
            }
        } else {
            dynamic_ids.push(id);
        }
    }

    let dynamic = if dynamic_ids.is_empty() {
        None
    } else {
        let entries: Vec<(usize, &CompiledRoute)> =
            dynamic_ids.iter().map(|&id| (id, &compiled[id])).collect();
        Some(fuse::build(&entries)?)
    };

    let name_to_id: HashMap<String, usize> = routes
        .iter()
        .enumerate()
        .map(|(id, r)| (r.name.clone(), id))
        .collect();

    info!(
        route_count = routes.len(),
        static_count = static_routes.values().map(|v| v.len()).sum::<usize>(),
        dynamic_count = dynamic_ids.len(),
        "route collection built"
    );

    Ok(Router {
        routes,
        compiled,
        host_regexes,
        static_routes,
        static_with_optional_slash,
        dynamic,
        name_to_id,
    })
}

fn resolve_one(pending: PendingRoute) -> Result<Resolved, BuildError> {
    let PendingRoute { builder, group_layers } = pending;

    let mut path_prefix = String::new();
    let mut name_prefix = String::new();
    let mut defaults = HashMap::new();
    let mut patterns = HashMap::new();
    let mut hosts_from_groups: Option<Vec<String>> = None;
    let mut schemes_from_groups: Option<BTreeSet<String>> = None;
    let mut middleware_refs = Vec::new();

    for layer in &group_layers {
        path_prefix.push_str(&layer.prefix);
        name_prefix.push_str(&layer.name_prefix);
        for (k, v) in &layer.defaults {
            defaults.insert(k.clone(), v.clone());
        }
        for (k, v) in &layer.patterns {
            patterns.insert(k.clone(), v.clone());
        }
        if !layer.hosts.is_empty() {
            hosts_from_groups = Some(layer.hosts.clone());
        }
        if !layer.schemes.is_empty() {
            schemes_from_groups = Some(layer.schemes.clone());
        }
        middleware_refs.extend(layer.middleware.iter().cloned());
    }

    for (k, v) in &builder.defaults {
        defaults.insert(k.clone(), v.clone());
    }
    for (k, v) in &builder.patterns {
        patterns.insert(k.clone(), v.clone());
    }
    middleware_refs.extend(builder.middleware.iter().cloned());

    let hosts = if !builder.hosts.is_empty() {
        builder.hosts.clone()
    } else {
        hosts_from_groups.unwrap_or_default()
    };
    let schemes = if !builder.schemes.is_empty() {
        builder.schemes.clone()
    } else {
        schemes_from_groups.unwrap_or_default()
    };

    let path = format!("{path_prefix}{}", builder.path);
    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };

    let name = builder
        .name
        .as_ref()
        .map(|n| format!("{name_prefix}{n}"));

    Ok(Resolved {
        route: Route {
            // Placeholder until `auto_name` resolves unnamed routes; carries
            // the already-applied name_prefix for those that still need one.
            name: name.unwrap_or_else(|| format!("\0{name_prefix}")),
            path,
            methods: builder.methods,
            schemes,
            hosts,
            defaults,
            patterns,
            handler_ref: builder.handler,
            middleware_refs,
            extra_condition: builder.extra_condition,
            static_prefix: String::new(),
        },
    })
}

/// Derives a name for every route whose resolved name is still the
/// `\0name_prefix` placeholder left by [`resolve_one`] (§4.G auto-naming).
fn auto_name(resolved: &mut [Resolved]) {
    let mut seen: HashMap<String, u32> = HashMap::new();
    for r in resolved.iter_mut() {
        if let Some(name_prefix) = r.route.name.strip_prefix('\0') {
            let base = format!("{name_prefix}{}", derive_name(&r.route));
            r.route.name = base;
        }
    }
    for r in resolved.iter_mut() {
        let base = r.route.name.clone();
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            r.route.name = format!("{base}_{count}");
        }
    }
}

fn derive_name(route: &Route) -> String {
    let method_part = if route.methods.is_empty() {
        "ANY".to_string()
    } else {
        route.methods.iter().cloned().collect::<Vec<_>>().join("_")
    };
    let mut path_part = String::with_capacity(route.path.len());
    for c in route.path.chars() {
        match c {
            '/' | ':' | '|' | '-' => path_part.push('_'),
            c => path_part.push(c),
        }
    }
    let path_part: String = path_part
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    collapse_underscores(&format!("{method_part}_{path_part}"))
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out.trim_matches('_').to_string()
}

fn check_duplicate_names(resolved: &[Resolved]) -> Result<(), BuildError> {
    let mut seen = std::collections::HashSet::new();
    for r in resolved {
        if !seen.insert(r.route.name.clone()) {
            return Err(BuildError::DuplicateName {
                name: r.route.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_duplicate_routes(resolved: &[Resolved]) -> Result<(), BuildError> {
    for i in 0..resolved.len() {
        for j in (i + 1)..resolved.len() {
            let a = &resolved[i].route;
            let b = &resolved[j].route;
            if a.path != b.path {
                continue;
            }
            let overlap = a.methods.is_empty()
                || b.methods.is_empty()
                || a.methods.intersection(&b.methods).next().is_some();
            if overlap {
                return Err(BuildError::DuplicateRoute {
                    path: a.path.clone(),
                    method: a
                        .methods
                        .iter()
                        .next()
                        .cloned()
                        .unwrap_or_else(|| "*".to_string()),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
