//! Build-artifact cache (§4.F): serializes a built [`Router`] to disk so a
//! process can skip recompiling every pattern on the next startup.

use crate::dispatcher::fuse::DynamicSet;
use crate::error::CacheError;
use crate::route::{CompiledRoute, Route};
use crate::router::Router;
use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Bump whenever [`CacheBlob`]'s shape changes; a stored blob with a
/// different version is treated as a cache miss, never a hard error.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Where to read/write the cache artifact, and which format version this
/// build expects to find.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub path: PathBuf,
    pub format_version: u32,
}

impl CacheOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CacheOptions {
            path: path.into(),
            format_version: CURRENT_FORMAT_VERSION,
        }
    }
}

/// Serializable shadow of [`Router`]'s compiled state. Regex objects are not
/// `Serialize`, so only their source strings are stored; [`Cache::load`]
/// recompiles them.
#[derive(Debug, Serialize, Deserialize)]
struct CacheBlob {
    format_version: u32,
    routes: Vec<Route>,
    compiled: Vec<CompiledRoute>,
    host_regex_sources: Vec<Vec<String>>,
    static_routes: HashMap<String, Vec<usize>>,
    static_with_optional_slash: HashMap<String, Vec<usize>>,
    dynamic: Option<DynamicBlob>,
    name_to_id: HashMap<String, usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DynamicBlob {
    regex_source: String,
    branch_route: Vec<usize>,
    branch_vars: Vec<Vec<(String, String)>>,
}

/// Reads and writes the on-disk build-artifact cache.
pub struct Cache;

impl Cache {
    /// Serializes `router` and atomically writes it to `options.path`
    /// (write-to-temp-then-rename, so a crash mid-write never leaves a
    /// corrupt file in place).
    pub fn save(router: &Router, options: &CacheOptions) -> Result<(), CacheError> {
        let blob = CacheBlob {
            format_version: options.format_version,
            routes: router.routes.clone(),
            compiled: router.compiled.clone(),
            host_regex_sources: router
                .host_regexes
                .iter()
                .map(|v| v.iter().map(|r| r.as_str().to_string()).collect())
                .collect(),
            static_routes: router.static_routes.clone(),
            static_with_optional_slash: router.static_with_optional_slash.clone(),
            dynamic: router.dynamic.as_ref().map(|d| DynamicBlob {
                regex_source: d.regex.as_str().to_string(),
                branch_route: d.branch_route.clone(),
                branch_vars: d.branch_vars.clone(),
            }),
            name_to_id: router.name_to_id.clone(),
        };

        let json = serde_json::to_vec(&blob).map_err(|e| CacheError::Corrupt {
            reason: e.to_string(),
        })?;

        let tmp_path = tmp_path_for(&options.path);
        std::fs::write(&tmp_path, &json).map_err(|e| CacheError::Corrupt {
            reason: e.to_string(),
        })?;
        std::fs::rename(&tmp_path, &options.path).map_err(|e| CacheError::Corrupt {
            reason: e.to_string(),
        })?;
        debug!(path = %options.path.display(), "route cache written");
        Ok(())
    }

    /// Loads a previously saved cache. Any failure — missing file, version
    /// mismatch, corrupt JSON, or a regex source that no longer compiles —
    /// is logged and folds into `None`, never a hard error, so the caller
    /// always has a clean path to rebuilding from source (§4.F "transparent
    /// fallback").
    pub fn load(options: &CacheOptions) -> Option<Router> {
        match Self::try_load(options) {
            Ok(router) => {
                debug!(path = %options.path.display(), "route cache loaded");
                Some(router)
            }
            Err(e) => {
                warn!(path = %options.path.display(), error = %e, "route cache miss, rebuild required");
                None
            }
        }
    }

    fn try_load(options: &CacheOptions) -> Result<Router, CacheError> {
        // Reading the file and deserializing the envelope is one aggregated
        // fallible step; `anyhow` carries the underlying I/O or JSON cause
        // for the `warn!` log, and gets collapsed into `CacheError::Corrupt`
        // at this function's boundary.
        let blob = read_blob(&options.path).map_err(|e| CacheError::Corrupt {
            reason: e.to_string(),
        })?;

        if blob.format_version != options.format_version {
            return Err(CacheError::VersionMismatch {
                found: blob.format_version,
                expected: options.format_version,
            });
        }

        let mut host_regexes = Vec::with_capacity(blob.host_regex_sources.len());
        for sources in &blob.host_regex_sources {
            let mut v = Vec::with_capacity(sources.len());
            for src in sources {
                v.push(
                    Regex::new(src).map_err(|e| CacheError::RegexRecompileFailed {
                        reason: e.to_string(),
                    })?,
                );
            }
            host_regexes.push(v);
        }

        let dynamic = match blob.dynamic {
            Some(d) => {
                let regex =
                    Regex::new(&d.regex_source).map_err(|e| CacheError::RegexRecompileFailed {
                        reason: e.to_string(),
                    })?;
                Some(DynamicSet {
                    regex,
                    branch_route: d.branch_route,
                    branch_vars: d.branch_vars,
                })
            }
            None => None,
        };

        Ok(Router {
            routes: blob.routes,
            compiled: blob.compiled,
            host_regexes,
            static_routes: blob.static_routes,
            static_with_optional_slash: blob.static_with_optional_slash,
            dynamic,
            name_to_id: blob.name_to_id,
        })
    }
}

fn read_blob(path: &Path) -> anyhow::Result<CacheBlob> {
    let bytes = std::fs::read(path).with_context(|| format!("reading cache file {path:?}"))?;
    let blob: CacheBlob =
        serde_json::from_slice(&bytes).context("deserializing cache envelope")?;
    Ok(blob)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
