//! The frozen, immutable router produced by [`crate::RouteCollection::build`]
//! (§3 `Router`, §5 "Build phase").

use crate::dispatcher::fuse::DynamicSet;
use crate::dispatcher::{match_request, Match, Request};
use crate::error::MatchError;
use crate::route::{CompiledRoute, Route, RouteId};
use regex::Regex;
use std::collections::HashMap;

/// A frozen collection of compiled routes, ready to match requests and to
/// back a [`crate::UriGenerator`] (§3 Lifecycle: "Frozen").
#[derive(Debug)]
pub struct Router {
    pub(crate) routes: Vec<Route>,
    pub(crate) compiled: Vec<CompiledRoute>,
    pub(crate) host_regexes: Vec<Vec<Regex>>,
    pub(crate) static_routes: HashMap<String, Vec<usize>>,
    pub(crate) static_with_optional_slash: HashMap<String, Vec<usize>>,
    pub(crate) dynamic: Option<DynamicSet>,
    pub(crate) name_to_id: HashMap<String, usize>,
}

impl Router {
    /// Matches `req` against every candidate route, applying the
    /// `NotFound` < `MethodNotAllowed` < `UriConstraintViolation` precedence
    /// of §7.
    pub fn match_request(&self, req: &Request) -> Result<Match, MatchError> {
        match_request(self, req)
    }

    pub fn route_by_name(&self, name: &str) -> Option<(RouteId, &Route)> {
        self.name_to_id.get(name).map(|&id| (id, &self.routes[id]))
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    pub(crate) fn compiled(&self, id: RouteId) -> Option<&CompiledRoute> {
        self.compiled.get(id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}
