//! Route data model (§3).

use crate::pattern::{Token, VariableDef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Index of a [`Route`] within a built [`crate::Router`]'s route table.
pub type RouteId = usize;

/// Opaque handler payload. The core never dispatches on this; it stores it
/// by value and hands it back unchanged on a successful match (§9
/// "Dynamic typing → tagged variants").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerRef {
    /// A plain callable name/key the caller resolves in its own registry.
    Callable(String),
    /// A `(class, method)` pair, for frameworks that dispatch by reflection.
    ClassMethod(String, String),
    /// An opaque byte payload (e.g. a serialized object reference).
    ObjectLike(Vec<u8>),
}

/// A route as assembled through [`crate::RouteCollection`], before and after
/// `build()`. Fields are immutable once the owning collection is frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) methods: BTreeSet<String>,
    pub(crate) schemes: BTreeSet<String>,
    pub(crate) hosts: Vec<String>,
    pub(crate) defaults: HashMap<String, String>,
    pub(crate) patterns: HashMap<String, String>,
    pub(crate) handler_ref: HandlerRef,
    /// Opaque per-route middleware references (SPEC_FULL §F.3); never
    /// invoked by the core.
    pub(crate) middleware_refs: Vec<HandlerRef>,
    /// Opaque caller-defined condition tag (SPEC_FULL §F.4); never
    /// evaluated by the core.
    pub(crate) extra_condition: Option<String>,
    /// Longest leading literal run of `path`, filled in during compilation.
    pub(crate) static_prefix: String,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &BTreeSet<String> {
        &self.methods
    }

    pub fn schemes(&self) -> &BTreeSet<String> {
        &self.schemes
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn defaults(&self) -> &HashMap<String, String> {
        &self.defaults
    }

    pub fn patterns(&self) -> &HashMap<String, String> {
        &self.patterns
    }

    pub fn handler_ref(&self) -> &HandlerRef {
        &self.handler_ref
    }

    pub fn middleware_refs(&self) -> &[HandlerRef] {
        &self.middleware_refs
    }

    pub fn extra_condition(&self) -> Option<&str> {
        self.extra_condition.as_deref()
    }

    pub fn static_prefix(&self) -> &str {
        &self.static_prefix
    }
}

/// Per-route compiled artifacts (§3 `CompiledRoute`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledRoute {
    pub path_regex_source: String,
    pub host_regex_sources: Vec<String>,
    pub variables: Vec<VariableDef>,
    /// Parser tokens for the path, retained so the generator can re-walk
    /// them into a reverse template (§4.E step 2) without reparsing.
    pub path_tokens: Vec<Token>,
    /// Parser tokens for the first declared host, if any (§4.E step 4).
    pub host_tokens: Option<Vec<Token>>,
    /// Variable table for the first declared host, if any. Kept separate
    /// from `variables` (path-only) since a host pattern's captures (e.g.
    /// a subdomain) are bound into a match alongside, not instead of, the
    /// path's own variables (§4.D "Variable binding").
    pub host_variables: Vec<VariableDef>,
}
