//! Request dispatch: static/dynamic lookup, method/scheme/host filtering,
//! and the fused dynamic regex builder (§4.C, §4.D).

pub(crate) mod fuse;
mod matcher;

pub use matcher::{match_request, normalize_path, Match, Request, MAX_INLINE_VARS};

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
