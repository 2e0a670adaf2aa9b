//! Named-type constraint dictionary (§4.A).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The fixed dictionary of named types. A constraint token that exactly
/// matches one of these keys resolves to the associated regex fragment;
/// anything else is treated as an inline regex fragment.
static BUILTINS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("int", r"\d+");
    m.insert("lower", r"[a-z]+");
    m.insert("upper", r"[A-Z]+");
    m.insert("alpha", r"[A-Za-z]+");
    m.insert("alnum", r"[A-Za-z0-9]+");
    m.insert("year", r"[12][0-9]{3}");
    m.insert("month", r"0[1-9]|1[012]");
    m.insert("day", r"0[1-9]|[12][0-9]|3[01]");
    m.insert(
        "uuid",
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    );
    m
});

pub fn builtin(name: &str) -> Option<&'static str> {
    BUILTINS.get(name).copied()
}

/// Strip the anchors a caller might mistakenly include in an inline
/// constraint (`^`, `$`, `\A`, `\z`) — §4.A: "escaping ^/$/\A/\z is stripped".
pub fn strip_anchors(fragment: &str) -> String {
    let mut s = fragment;
    loop {
        let trimmed = s
            .strip_prefix('^')
            .or_else(|| s.strip_prefix("\\A"))
            .unwrap_or(s);
        if trimmed.len() == s.len() {
            break;
        }
        s = trimmed;
    }
    loop {
        let trimmed = s
            .strip_suffix('$')
            .or_else(|| s.strip_suffix("\\z"))
            .unwrap_or(s);
        if trimmed.len() == s.len() {
            break;
        }
        s = trimmed;
    }
    s.to_string()
}

/// Resolve a raw constraint token (either a named-type keyword or an inline
/// fragment) against the built-in dictionary plus any collection-registered
/// aliases (SPEC_FULL §F.2), returning the final regex fragment.
pub fn resolve(raw: &str, aliases: &HashMap<String, String>) -> String {
    if let Some(frag) = aliases.get(raw) {
        return frag.clone();
    }
    if let Some(frag) = builtin(raw) {
        return frag.to_string();
    }
    strip_anchors(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_the_fixed_dictionary() {
        assert_eq!(builtin("int"), Some(r"\d+"));
        assert_eq!(builtin("uuid").is_some(), true);
        assert_eq!(builtin("nonsense"), None);
    }

    #[test]
    fn strip_anchors_removes_leading_and_trailing() {
        assert_eq!(strip_anchors("^[a-z]+$"), "[a-z]+");
        assert_eq!(strip_anchors(r"\A\d+\z"), r"\d+");
        assert_eq!(strip_anchors("[a-z]+"), "[a-z]+");
    }

    #[test]
    fn resolve_prefers_alias_then_builtin_then_inline() {
        let mut aliases = HashMap::new();
        aliases.insert("int".to_string(), "OVERRIDDEN".to_string());
        assert_eq!(resolve("int", &aliases), "OVERRIDDEN");

        let aliases = HashMap::new();
        assert_eq!(resolve("int", &aliases), r"\d+");
        assert_eq!(resolve("[0-9]+", &aliases), "[0-9]+");
    }
}
