//! Fused dynamic regex (§4.C "Fused dynamic regex").
//!
//! The `regex` crate has no PCRE-style `MARK`, so branch identification is
//! emulated with a zero-width sentinel capture per branch (§4.C "Variable
//! renaming", §9 "Fused regex with MARK"): each route's body is renamed to
//! give every capture a route-unique name, then followed by an always-empty
//! `(?P<br_N>)` group whose presence after a match identifies the winning
//! branch.

use crate::error::BuildError;
use crate::route::{CompiledRoute, RouteId};
use regex::Regex;

/// The single fused regex covering every dynamic route, plus the tables
/// needed to turn a match back into `(route_id, {var_name: value})`.
#[derive(Debug)]
pub struct DynamicSet {
    pub regex: Regex,
    /// Branch index -> route id (branch index order matches insertion order
    /// of the entries passed to [`build`], i.e. the post-sort dynamic order).
    pub branch_route: Vec<RouteId>,
    /// Branch index -> `(fused_group_name, original_var_name)` pairs.
    pub branch_vars: Vec<Vec<(String, String)>>,
}

pub fn build(entries: &[(RouteId, &CompiledRoute)]) -> Result<DynamicSet, BuildError> {
    let mut branches = Vec::with_capacity(entries.len());
    let mut branch_route = Vec::with_capacity(entries.len());
    let mut branch_vars = Vec::with_capacity(entries.len());

    for (branch_idx, (route_id, compiled)) in entries.iter().enumerate() {
        let body = strip_anchors(&compiled.path_regex_source);
        let mut renamed = body.to_string();
        let mut vars = Vec::with_capacity(compiled.variables.len());
        for var in &compiled.variables {
            let from = format!("(?P<{}>", var.name);
            let to = format!("(?P<v{branch_idx}_{}>", var.name);
            renamed = renamed.replacen(&from, &to, 1);
            vars.push((format!("v{branch_idx}_{}", var.name), var.name.clone()));
        }
        branches.push(format!("(?:{renamed})(?P<br_{branch_idx}>)"));
        branch_route.push(*route_id);
        branch_vars.push(vars);
    }

    let source = format!("^(?:{})$", branches.join("|"));
    let regex = Regex::new(&source).map_err(|e| BuildError::InvalidConstraint {
        name: "<fused>".to_string(),
        reason: e.to_string(),
    })?;

    Ok(DynamicSet {
        regex,
        branch_route,
        branch_vars,
    })
}

fn strip_anchors(source: &str) -> &str {
    source
        .strip_prefix('^')
        .unwrap_or(source)
        .strip_suffix('$')
        .unwrap_or(source)
}
