//! Operation classification: confirmation, target strictness, read-only verbs.
//!
//! Confirmation precedence (first match wins):
//!  1. arbitrary editor method invocation → always confirm
//!  2. configured denylist → confirm
//!  3. configured allowlist → no confirm
//!  4. global toggle off → no confirm
//!  5. bridge diagnostics → no confirm
//!  6. import-settings mutation → confirm
//!  7. read-only verb on the final segment → no confirm
//!  8. dangerous verb / `set<Subsystem>Settings` → confirm

use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::config::BridgeConfig;

/// Runs any static editor method by reflection.
pub const INVOKE_METHOD_OPERATION: &str = "unity.editor.invokeMethod";

/// Rewrites persisted importer settings (`.meta` files) for an asset.
pub const IMPORT_SETTINGS_OPERATION: &str = "unity.asset.applyImportSettings";

const DIAGNOSTIC_PREFIXES: &[&str] = &["bridge.", "unity.diagnostics."];

const READ_ONLY_VERBS: &[&str] = &["get", "list", "find", "analyze", "validate", "status", "ping"];

const DANGEROUS_VERBS: &[&str] = &[
    "destroy", "delete", "remove", "build", "import", "export", "pack", "embed", "execute",
];

/// Objects living in the scene hierarchy (or assets that behave like them).
const UNITY_OBJECT_NOUNS: &[&str] = &[
    "gameobject", "asset", "component", "prefab", "listener", "light", "camera",
];

/// Namespaces whose operations take a hierarchy path as their target.
const TREE_NAMESPACES: &[&str] = &[
    "gameobject", "component", "transform", "prefab", "light", "camera", "ui", "uitoolkit",
    "animator", "physics", "selection",
];

fn settings_verb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^set(player|project|quality|graphics|physics|physics2d|lighting|editor|build|time|audio|input|tags?andlayers|render|xr)settings",
        )
        .expect("static regex")
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Allow / deny patterns
// ─────────────────────────────────────────────────────────────────────────────

/// Escapes every glob metacharacter except `*`; runs of `*` collapse to one.
fn star_only(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for (i, part) in pattern.split('*').enumerate() {
        if i > 0 && !out.ends_with('*') {
            out.push('*');
        }
        out.push_str(&Pattern::escape(part));
    }
    out
}

/// Case-insensitive operation-name patterns; `*` matches any remainder.
#[derive(Debug, Clone, Default)]
pub struct NamePatterns {
    raw: Vec<String>,
    compiled: Vec<Pattern>,
}

impl NamePatterns {
    pub fn new(patterns: &[String]) -> Self {
        let mut raw = Vec::new();
        let mut compiled = Vec::new();
        for p in patterns.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            match Pattern::new(&star_only(&p.to_ascii_lowercase())) {
                Ok(pat) => {
                    raw.push(p.to_string());
                    compiled.push(pat);
                }
                Err(e) => tracing::warn!(pattern = p, error = %e, "ignoring invalid confirm pattern"),
            }
        }
        Self { raw, compiled }
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        let opts = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        let lower = name.to_ascii_lowercase();
        self.compiled.iter().any(|p| p.matches_with(&lower, opts))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Verdict
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub requires_confirmation: bool,
    pub requires_unambiguous_target: bool,
    pub is_read_only: bool,
    pub is_likely_tree_target: bool,
}

pub fn classify(name: &str, config: &BridgeConfig) -> Classification {
    Classification {
        requires_confirmation: requires_confirmation(name, config),
        requires_unambiguous_target: requires_unambiguous_target(name, config),
        is_read_only: is_read_only(name),
        is_likely_tree_target: is_likely_tree_target(name),
    }
}

pub fn requires_confirmation(name: &str, config: &BridgeConfig) -> bool {
    if name.eq_ignore_ascii_case(INVOKE_METHOD_OPERATION) {
        return true;
    }
    if config.confirm_denylist.matches(name) {
        return true;
    }
    if config.confirm_allowlist.matches(name) {
        return false;
    }
    if !config.require_confirmation {
        return false;
    }
    if is_diagnostic_name(name) {
        return false;
    }
    if name.eq_ignore_ascii_case(IMPORT_SETTINGS_OPERATION) {
        return true;
    }
    if is_read_only(name) {
        return false;
    }
    is_dangerous(name)
}

pub fn requires_unambiguous_target(name: &str, config: &BridgeConfig) -> bool {
    if !config.require_unambiguous_targets || is_diagnostic_name(name) {
        return false;
    }
    let lower = name.to_ascii_lowercase();
    if lower.contains("destroy") || lower.contains("delete") {
        return true;
    }
    lower.contains("remove") && UNITY_OBJECT_NOUNS.iter().any(|n| lower.contains(n))
}

pub fn is_diagnostic_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DIAGNOSTIC_PREFIXES.iter().any(|p| lower.starts_with(p))
}

pub fn is_read_only(name: &str) -> bool {
    starts_with_any_verb(last_segment(name), READ_ONLY_VERBS)
}

/// Dangerous verb on the final segment, or a project-wide settings mutation.
pub fn is_dangerous(name: &str) -> bool {
    let last = last_segment(name);
    starts_with_any_verb(last, DANGEROUS_VERBS) || settings_verb_re().is_match(last)
}

/// Operations that address a node in the scene hierarchy.
pub fn is_likely_tree_target(name: &str) -> bool {
    if is_diagnostic_name(name) {
        return false;
    }
    let segments: Vec<&str> = name.split('.').collect();
    let Some((_, namespaces)) = segments.split_last() else {
        return false;
    };
    namespaces
        .iter()
        .skip(1)
        .any(|s| TREE_NAMESPACES.contains(&s.to_ascii_lowercase().as_str()))
}

pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `getComponents` starts with `get`, `getaway` does not: the verb must be the
/// whole segment or be followed by an uppercase letter, digit or `_`.
fn starts_with_any_verb(segment: &str, verbs: &[&str]) -> bool {
    verbs.iter().any(|verb| {
        if segment.len() < verb.len() || !segment.is_char_boundary(verb.len()) {
            return false;
        }
        let (head, rest) = segment.split_at(verb.len());
        if !head.eq_ignore_ascii_case(verb) {
            return false;
        }
        match rest.chars().next() {
            None => true,
            Some(c) => c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_',
        }
    })
}
