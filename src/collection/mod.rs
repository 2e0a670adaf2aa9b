//! Route collection builder (§4.G): fluent assembly of routes under groups,
//! with group attributes applied lazily at `build()` time.

mod build;

use crate::error::BuildError;
use crate::route::HandlerRef;
use crate::router::Router;
use std::collections::{BTreeSet, HashMap};

/// A standalone, chainable route description. Construct one with
/// [`RouteBuilder::get`]/`post`/... and pass it to
/// [`RouteCollection::add_route`].
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    pub(crate) methods: BTreeSet<String>,
    pub(crate) path: String,
    pub(crate) handler: HandlerRef,
    pub(crate) name: Option<String>,
    pub(crate) defaults: HashMap<String, String>,
    pub(crate) patterns: HashMap<String, String>,
    pub(crate) hosts: Vec<String>,
    pub(crate) schemes: BTreeSet<String>,
    pub(crate) middleware: Vec<HandlerRef>,
    pub(crate) extra_condition: Option<String>,
}

impl RouteBuilder {
    fn with_methods(methods: &[&str], path: &str, handler: HandlerRef) -> Self {
        RouteBuilder {
            methods: methods.iter().map(|m| m.to_uppercase()).collect(),
            path: canonicalize_path(path),
            handler,
            name: None,
            defaults: HashMap::new(),
            patterns: HashMap::new(),
            hosts: Vec::new(),
            schemes: BTreeSet::new(),
            middleware: Vec::new(),
            extra_condition: None,
        }
    }

    pub fn get(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&["GET"], path, handler)
    }
    pub fn head(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&["HEAD"], path, handler)
    }
    pub fn post(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&["POST"], path, handler)
    }
    pub fn put(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&["PUT"], path, handler)
    }
    pub fn patch(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&["PATCH"], path, handler)
    }
    pub fn delete(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&["DELETE"], path, handler)
    }
    pub fn options(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&["OPTIONS"], path, handler)
    }
    /// Matches every method (§3 Route.methods: "empty ⇒ all methods").
    pub fn any(path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(&[], path, handler)
    }
    /// Matches an explicit set of methods.
    pub fn add(methods: &[&str], path: &str, handler: HandlerRef) -> Self {
        Self::with_methods(methods, path, handler)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn default(mut self, var: &str, value: &str) -> Self {
        self.defaults.insert(var.to_string(), value.to_string());
        self
    }

    /// Equivalent of a `.where_()`/`requirements()` call: a per-variable
    /// constraint applied when the variable has no inline constraint.
    pub fn where_(mut self, var: &str, constraint: &str) -> Self {
        self.patterns.insert(var.to_string(), constraint.to_string());
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.hosts.push(host.to_string());
        self
    }

    pub fn scheme(mut self, scheme: &str) -> Self {
        self.schemes.insert(scheme.to_lowercase());
        self
    }

    /// Appends an opaque middleware reference (SPEC_FULL §F.3); never
    /// invoked by the core.
    pub fn middleware(mut self, handler_ref: HandlerRef) -> Self {
        self.middleware.push(handler_ref);
        self
    }

    /// Attaches an opaque condition tag (SPEC_FULL §F.4); never evaluated
    /// by the core.
    pub fn condition(mut self, condition: &str) -> Self {
        self.extra_condition = Some(condition.to_string());
        self
    }
}

fn canonicalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// A group's attributes, merged into every route added under it at build
/// time (§4.G: "Group application is deferred until build time").
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub(crate) prefix: String,
    pub(crate) name_prefix: String,
    pub(crate) defaults: HashMap<String, String>,
    pub(crate) patterns: HashMap<String, String>,
    pub(crate) hosts: Vec<String>,
    pub(crate) schemes: BTreeSet<String>,
    pub(crate) middleware: Vec<HandlerRef>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn name_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = prefix.to_string();
        self
    }

    pub fn default(mut self, var: &str, value: &str) -> Self {
        self.defaults.insert(var.to_string(), value.to_string());
        self
    }

    pub fn pattern(mut self, var: &str, constraint: &str) -> Self {
        self.patterns.insert(var.to_string(), constraint.to_string());
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.hosts.push(host.to_string());
        self
    }

    pub fn scheme(mut self, scheme: &str) -> Self {
        self.schemes.insert(scheme.to_lowercase());
        self
    }

    pub fn middleware(mut self, handler_ref: HandlerRef) -> Self {
        self.middleware.push(handler_ref);
        self
    }
}

pub(crate) struct PendingRoute {
    pub(crate) builder: RouteBuilder,
    pub(crate) group_layers: Vec<Group>,
}

/// Mutable route collection. Assemble routes and groups, then call
/// [`RouteCollection::build`] to produce a frozen [`Router`] (§3 Lifecycle,
/// §5 "Build phase").
#[derive(Default)]
pub struct RouteCollection {
    pub(crate) pending: Vec<PendingRoute>,
    pub(crate) group_stack: Vec<Group>,
    pub(crate) aliases: HashMap<String, String>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named-type alias usable from any pattern's constraint
    /// slot, layered over the built-in dictionary (SPEC_FULL §F.2).
    pub fn register_pattern_alias(&mut self, name: &str, regex_fragment: &str) -> &mut Self {
        self.aliases
            .insert(name.to_string(), regex_fragment.to_string());
        self
    }

    /// Adds a route, capturing a snapshot of the currently active group
    /// stack so its attributes can be folded in at build time.
    pub fn add_route(&mut self, builder: RouteBuilder) -> &mut Self {
        self.pending.push(PendingRoute {
            builder,
            group_layers: self.group_stack.clone(),
        });
        self
    }

    /// Runs `f` with `group`'s attributes active for every route it adds
    /// (including nested groups). Groups may be nested to any depth.
    pub fn group(&mut self, group: Group, f: impl FnOnce(&mut RouteCollection)) -> &mut Self {
        self.group_stack.push(group);
        f(self);
        self.group_stack.pop();
        self
    }

    /// Applies accumulated group attributes, auto-names unnamed routes,
    /// sorts, fuses the dynamic regex, and freezes the result (§3
    /// Lifecycle, §4.C).
    pub fn build(self) -> Result<Router, BuildError> {
        build::build(self)
    }
}
