//! Public error types.
//!
//! Mirrors the teacher's hand-rolled `Display`/`Error` enums (see
//! `middleware/cors/error.rs` in the pack) rather than a `thiserror` derive:
//! these are the types callers pattern-match on, so they stay free of a
//! boxed internal cause.

use std::collections::HashSet;
use std::fmt;

/// Errors raised while assembling or building a [`crate::RouteCollection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Two routes were added with the same name.
    DuplicateName { name: String },
    /// Two routes share the same `(path, method)` pair.
    DuplicateRoute { path: String, method: String },
    /// A variable name starts with a digit.
    VariableStartsWithDigit { name: String },
    /// A variable name exceeds 32 characters.
    VariableNameTooLong { name: String },
    /// The same variable name appears twice in one pattern.
    DuplicateVariable { name: String },
    /// A `[` has no matching `]`, or vice versa.
    UnmatchedOptional { pattern: String },
    /// A `{name:}` constraint was given with nothing after the colon.
    EmptyConstraint { name: String },
    /// A constraint fragment did not compile as a regex.
    InvalidConstraint { name: String, reason: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::DuplicateName { name } => {
                write!(f, "duplicate route name '{name}'")
            }
            BuildError::DuplicateRoute { path, method } => {
                write!(f, "duplicate route for {method} {path}")
            }
            BuildError::VariableStartsWithDigit { name } => {
                write!(f, "variable name '{name}' starts with a digit")
            }
            BuildError::VariableNameTooLong { name } => {
                write!(f, "variable name '{name}' exceeds 32 characters")
            }
            BuildError::DuplicateVariable { name } => {
                write!(f, "duplicate variable name '{name}' in pattern")
            }
            BuildError::UnmatchedOptional { pattern } => {
                write!(f, "unmatched '[' or ']' in pattern '{pattern}'")
            }
            BuildError::EmptyConstraint { name } => {
                write!(f, "empty constraint for variable '{name}'")
            }
            BuildError::InvalidConstraint { name, reason } => {
                write!(f, "invalid constraint for variable '{name}': {reason}")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Errors returned by [`crate::Router::match_request`], ranked by §7's
/// precedence: `MethodNotAllowed` outranks `UriConstraintViolation`, which
/// outranks `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// No static entry and no dynamic branch matched the path at all.
    NotFound { path: String },
    /// At least one candidate matched the path, but none accepted the method.
    MethodNotAllowed {
        path: String,
        method: String,
        allowed: Vec<String>,
    },
    /// At least one candidate matched path (and method where relevant) but
    /// none accepted the request's scheme or host.
    UriConstraintViolation {
        path: String,
        attempted_scheme: String,
        attempted_host: String,
        allowed_schemes: HashSet<String>,
        allowed_hosts: Vec<String>,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::NotFound { path } => write!(f, "no route matches path '{path}'"),
            MatchError::MethodNotAllowed {
                path,
                method,
                allowed,
            } => write!(
                f,
                "method '{method}' not allowed for '{path}', allowed: [{}]",
                allowed.join(", ")
            ),
            MatchError::UriConstraintViolation {
                path,
                attempted_scheme,
                attempted_host,
                allowed_schemes,
                allowed_hosts,
            } => write!(
                f,
                "no candidate for '{path}' accepts scheme '{attempted_scheme}' / host '{attempted_host}' (allowed schemes: {:?}, allowed hosts: {:?})",
                allowed_schemes, allowed_hosts
            ),
        }
    }
}

impl std::error::Error for MatchError {}

/// Errors returned by [`crate::UriGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// No route is registered under this name.
    UnknownRoute { name: String },
    /// A mandatory variable had no supplied value and no default.
    MissingVariable { route: String, variable: String },
    /// A port was supplied outside `0..=65535`, or could not be represented.
    InvalidPort { route: String, port: i64 },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::UnknownRoute { name } => write!(f, "unknown route '{name}'"),
            GenerateError::MissingVariable { route, variable } => {
                write!(f, "required-missing: {variable} (route '{route}')")
            }
            GenerateError::InvalidPort { route, port } => {
                write!(f, "invalid port {port} for route '{route}'")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

/// Errors returned by [`crate::Cache`] when a stored artifact cannot be used.
///
/// Per §4.F, a caller never sees this as a hard failure: [`crate::Cache::load`]
/// turns it into a `None` (transparent fallback to rebuild).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The blob's format version does not match this build's.
    VersionMismatch { found: u32, expected: u32 },
    /// The blob could not be deserialized at all.
    Corrupt { reason: String },
    /// The fused regex source stored in the blob failed to recompile.
    RegexRecompileFailed { reason: String },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::VersionMismatch { found, expected } => {
                write!(f, "cache format version {found} != expected {expected}")
            }
            CacheError::Corrupt { reason } => write!(f, "cache is corrupt: {reason}"),
            CacheError::RegexRecompileFailed { reason } => {
                write!(f, "cached regex failed to recompile: {reason}")
            }
        }
    }
}

impl std::error::Error for CacheError {}
