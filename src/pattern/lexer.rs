//! Tokenizer for the pattern DSL (§4.A).
//!
//! Paths and host patterns share this grammar: literal characters, variable
//! holes `{name[:constraint][=default]}`, and optional regions `[...]` that
//! may nest.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Lit(String),
    Var {
        name: String,
        constraint: Option<String>,
        default: Option<String>,
    },
    OptStart,
    OptEnd,
}

const MAX_VAR_NAME_LEN: usize = 32;

/// Tokenize a pattern, validating variable names and bracket nesting as it
/// goes (§4.A errors).
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, BuildError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut depth: i32 = 0;
    let mut lit = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' => {
                if !lit.is_empty() {
                    tokens.push(Token::Lit(std::mem::take(&mut lit)));
                }
                tokens.push(Token::OptStart);
                depth += 1;
                i += 1;
            }
            ']' => {
                if !lit.is_empty() {
                    tokens.push(Token::Lit(std::mem::take(&mut lit)));
                }
                depth -= 1;
                if depth < 0 {
                    return Err(BuildError::UnmatchedOptional {
                        pattern: pattern.to_string(),
                    });
                }
                tokens.push(Token::OptEnd);
                i += 1;
            }
            '{' => {
                if !lit.is_empty() {
                    tokens.push(Token::Lit(std::mem::take(&mut lit)));
                }
                // A constraint fragment may itself contain braces (e.g. a
                // `{2}` regex quantifier), so the matching `}` is found by
                // brace-depth counting, not a bare first-match search.
                let mut brace_depth = 1;
                let mut close = None;
                for (off, &c) in chars[i + 1..].iter().enumerate() {
                    match c {
                        '{' => brace_depth += 1,
                        '}' => {
                            brace_depth -= 1;
                            if brace_depth == 0 {
                                close = Some(i + 1 + off);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let close = close.ok_or_else(|| BuildError::UnmatchedOptional {
                    pattern: pattern.to_string(),
                })?;
                let body: String = chars[i + 1..close].iter().collect();
                let token = parse_var_body(&body, &mut seen_names)?;
                tokens.push(token);
                i = close + 1;
            }
            c => {
                lit.push(c);
                i += 1;
            }
        }
    }
    if !lit.is_empty() {
        tokens.push(Token::Lit(lit));
    }
    if depth != 0 {
        return Err(BuildError::UnmatchedOptional {
            pattern: pattern.to_string(),
        });
    }
    Ok(tokens)
}

fn parse_var_body(body: &str, seen_names: &mut HashSet<String>) -> Result<Token, BuildError> {
    // Split on the first ':' (constraint) then the first '=' (default),
    // in that order, matching the `{name[:constraint][=default]}` grammar.
    let (name_and_constraint, default) = match body.find('=') {
        Some(pos) => (&body[..pos], Some(body[pos + 1..].to_string())),
        None => (body, None),
    };
    let (name, constraint) = match name_and_constraint.find(':') {
        Some(pos) => {
            let constraint = &name_and_constraint[pos + 1..];
            if constraint.is_empty() {
                return Err(BuildError::EmptyConstraint {
                    name: name_and_constraint[..pos].to_string(),
                });
            }
            (
                name_and_constraint[..pos].to_string(),
                Some(constraint.to_string()),
            )
        }
        None => (name_and_constraint.to_string(), None),
    };

    if name.is_empty() {
        return Err(BuildError::VariableStartsWithDigit { name });
    }
    let first = name.chars().next().expect("non-empty name");
    if first.is_ascii_digit() {
        return Err(BuildError::VariableStartsWithDigit { name });
    }
    if name.chars().count() > MAX_VAR_NAME_LEN {
        return Err(BuildError::VariableNameTooLong { name });
    }
    if !seen_names.insert(name.clone()) {
        return Err(BuildError::DuplicateVariable { name });
    }

    Ok(Token::Var {
        name,
        constraint,
        default,
    })
}
