//! Segment compiler (§4.B): turns a token stream into a path/host regex
//! source, an ordered variable table, and the static prefix.

use super::constraint::resolve;
use super::lexer::{tokenize, Token};
use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry in a compiled route's variable table, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    pub default: Option<String>,
}

/// Output of compiling a single pattern (path or host).
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Anchored regex source (`^...$`), not yet recompiled into a `Regex`.
    pub regex_source: String,
    /// Variables in declared order, with their resolved default value.
    pub variables: Vec<VariableDef>,
    /// Longest literal run from the start of the pattern.
    pub static_prefix: String,
    /// The token stream the regex was built from, kept for the generator's
    /// reverse-template walk (§4.E step 2).
    pub tokens: Vec<Token>,
}

/// Compile a path pattern.
///
/// `route_patterns` are per-route constraint overrides (`.where_(name, re)`);
/// they apply to variables with no inline constraint. `route_defaults` are
/// group/route-level defaults for variables with no inline default.
/// `aliases` are collection-registered named-type aliases layered over the
/// built-in dictionary (SPEC_FULL §F.2).
pub fn compile_path(
    pattern: &str,
    route_patterns: &HashMap<String, String>,
    route_defaults: &HashMap<String, String>,
    aliases: &HashMap<String, String>,
) -> Result<CompiledPattern, BuildError> {
    compile(pattern, route_patterns, route_defaults, aliases, false)
}

/// Compile a host pattern; matched case-insensitively (§4.B "Host
/// compilation").
pub fn compile_host(
    pattern: &str,
    route_patterns: &HashMap<String, String>,
    route_defaults: &HashMap<String, String>,
    aliases: &HashMap<String, String>,
) -> Result<CompiledPattern, BuildError> {
    compile(pattern, route_patterns, route_defaults, aliases, true)
}

fn compile(
    pattern: &str,
    route_patterns: &HashMap<String, String>,
    route_defaults: &HashMap<String, String>,
    aliases: &HashMap<String, String>,
    case_insensitive: bool,
) -> Result<CompiledPattern, BuildError> {
    let tokens = tokenize(pattern)?;
    let static_prefix = leading_literal(&tokens);

    let mut variables = Vec::new();
    let body = build_regex(&tokens, route_patterns, route_defaults, aliases, &mut variables)?;

    let mut regex_source = String::with_capacity(body.len() + 8);
    if case_insensitive {
        regex_source.push_str("(?iu)");
    }
    regex_source.push('^');
    regex_source.push_str(&body);
    // Trailing-slash tolerance: a pattern whose last literal grammar
    // character is a bare `/` (not closed inside an optional region, which
    // already collapses its own trailing separator) makes that slash
    // optional at match time, so a request without it still matches.
    let ends_in_bare_slash = pattern.ends_with('/') && !matches!(tokens.last(), Some(Token::OptEnd));
    if ends_in_bare_slash && regex_source.ends_with("\\/") {
        regex_source.push('?');
    }
    regex_source.push('$');

    Ok(CompiledPattern {
        regex_source,
        variables,
        static_prefix,
        tokens,
    })
}

fn leading_literal(tokens: &[Token]) -> String {
    let mut out = String::new();
    for tok in tokens {
        match tok {
            Token::Lit(s) => out.push_str(s),
            _ => break,
        }
    }
    out
}

/// Escape literal text for inclusion in the regex body. `/` and `.` are
/// always escaped explicitly (harmless for `/`, required for `.`), on top of
/// whatever else `regex::escape` considers a metacharacter.
fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '/' | '.' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out
}

fn build_regex(
    tokens: &[Token],
    route_patterns: &HashMap<String, String>,
    route_defaults: &HashMap<String, String>,
    aliases: &HashMap<String, String>,
    variables: &mut Vec<VariableDef>,
) -> Result<String, BuildError> {
    let mut out = String::new();
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Lit(s) => {
                if s.ends_with('/') && matches!(tokens.get(i + 1), Some(Token::OptStart)) {
                    // A literal slash immediately preceding an optional
                    // region makes that slash itself optional, so the
                    // whole separator can be omitted along with the region.
                    out.push_str(&escape_literal(&s[..s.len() - 1]));
                    let (end, inner) = compile_optional_at(
                        tokens,
                        i + 1,
                        route_patterns,
                        route_defaults,
                        aliases,
                        variables,
                    )?;
                    out.push_str("\\/?(?:");
                    out.push_str(&inner);
                    out.push_str(")?");
                    i = end + 1;
                } else {
                    out.push_str(&escape_literal(s));
                    i += 1;
                }
            }
            Token::OptStart => {
                let (end, inner) = compile_optional_at(
                    tokens,
                    i,
                    route_patterns,
                    route_defaults,
                    aliases,
                    variables,
                )?;
                out.push_str("(?:");
                out.push_str(&inner);
                out.push_str(")?");
                i = end + 1;
            }
            Token::OptEnd => unreachable!("matching handled by compile_optional_at"),
            Token::Var {
                name,
                constraint,
                default,
            } => {
                let fragment = match constraint {
                    Some(raw) => resolve(raw, aliases),
                    None => match route_patterns.get(name) {
                        Some(raw) => resolve(raw, aliases),
                        None => "[^/]+".to_string(),
                    },
                };
                if fragment.is_empty() {
                    return Err(BuildError::EmptyConstraint { name: name.clone() });
                }
                regex::Regex::new(&fragment).map_err(|e| BuildError::InvalidConstraint {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
                out.push_str("(?P<");
                out.push_str(name);
                out.push('>');
                out.push_str(&fragment);
                out.push(')');

                let resolved_default = default
                    .clone()
                    .or_else(|| route_defaults.get(name).cloned());
                variables.push(VariableDef {
                    name: name.clone(),
                    default: resolved_default,
                });
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Given `tokens[start] == OptStart`, find its matching `OptEnd`, compile the
/// interior, and return `(matching_end_index, inner_regex)`.
fn compile_optional_at(
    tokens: &[Token],
    start: usize,
    route_patterns: &HashMap<String, String>,
    route_defaults: &HashMap<String, String>,
    aliases: &HashMap<String, String>,
    variables: &mut Vec<VariableDef>,
) -> Result<(usize, String), BuildError> {
    let mut depth = 0;
    let mut end = None;
    for (off, tok) in tokens[start..].iter().enumerate() {
        match tok {
            Token::OptStart => depth += 1,
            Token::OptEnd => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + off);
                    break;
                }
            }
            _ => {}
        }
    }
    let end = end.expect("bracket nesting already validated by tokenize()");
    let inner = build_regex(
        &tokens[start + 1..end],
        route_patterns,
        route_defaults,
        aliases,
        variables,
    )?;
    Ok((end, inner))
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
