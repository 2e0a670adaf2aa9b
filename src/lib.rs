//! Route matching and URI generation core.
//!
//! A request path/host pattern DSL (`{name[:constraint][=default]}` holes,
//! nestable `[...]` optional regions) compiles down to a single fused
//! dynamic regex plus a static-prefix lookup table. [`RouteCollection`]
//! assembles routes and groups; [`RouteCollection::build`] freezes them into
//! a [`Router`] that matches [`Request`]s and backs a [`UriGenerator`] for
//! the reverse direction.
//!
//! ```
//! use viaroute::{HandlerRef, Request, RouteBuilder, RouteCollection};
//!
//! let mut routes = RouteCollection::new();
//! routes.add_route(
//!     RouteBuilder::get("/users/{id:int}", HandlerRef::Callable("user_show".into()))
//!         .name("user_show"),
//! );
//! let router = routes.build().unwrap();
//!
//! let m = router.match_request(&Request::new("GET", "/users/42")).unwrap();
//! assert_eq!(m.get("id"), Some("42"));
//! ```

mod cache;
mod collection;
mod dispatcher;
mod error;
mod generator;
mod pattern;
mod route;
mod router;

pub use cache::{Cache, CacheOptions, CURRENT_FORMAT_VERSION};
pub use collection::{Group, RouteBuilder, RouteCollection};
pub use dispatcher::{match_request, normalize_path, Match, Request, MAX_INLINE_VARS};
pub use error::{BuildError, CacheError, GenerateError, MatchError};
pub use generator::{GenerateOptions, ReferenceType, UriGenerator};
pub use pattern::{compile_host, compile_path, resolve_constraint, CompiledPattern, VariableDef};
pub use route::{CompiledRoute, HandlerRef, Route, RouteId};
pub use router::Router;
