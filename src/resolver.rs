//! Target resolution over a fresh hierarchy snapshot.
//!
//! Exactly one match resolves silently and the canonical path is written back
//! into the call. Zero or several matches produce a disambiguation payload the
//! agent can retry from.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::normalize::{non_empty_str, OBJECT_PATH_KEY};
use crate::reserved::{ALLOW_AMBIGUOUS_KEY, CONFIRM_KEY, CONFIRM_NOTE_KEY};
use crate::tree::{TreeNode, TreeSnapshot};

/// Argument keys that may carry a target, most canonical first.
pub const TARGET_PATH_KEYS: &[&str] = &[OBJECT_PATH_KEY, "targetPath", "objectPath", "path", "instancePath"];
pub const TARGET_NAME_KEYS: &[&str] = &["gameObjectName", "targetName", "objectName"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact match on the ancestor-joined path.
    Path,
    /// Exact match on the leaf name.
    Name,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution<'a> {
    /// At most `limit + 1` entries.
    pub matches: Vec<&'a TreeNode>,
    /// Non-matching nodes containing the query (case-insensitive); at most `limit + 1`.
    pub suggestions: Vec<&'a TreeNode>,
}

/// Where the query came from in the caller's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuery {
    pub key: String,
    pub value: String,
}

/// Name-bearing fields force name mode; otherwise a `/` means path mode.
pub fn choose_match_mode(query: &TargetQuery) -> MatchMode {
    if TARGET_NAME_KEYS.contains(&query.key.as_str()) || query.key.to_ascii_lowercase().ends_with("name") {
        MatchMode::Name
    } else if query.value.contains('/') {
        MatchMode::Path
    } else {
        MatchMode::Name
    }
}

pub fn find_target_query(args: &Map<String, Value>) -> Option<TargetQuery> {
    TARGET_PATH_KEYS
        .iter()
        .chain(TARGET_NAME_KEYS.iter())
        .find_map(|k| {
            non_empty_str(args, k).map(|v| TargetQuery {
                key: k.to_string(),
                value: v.to_string(),
            })
        })
}

/// Stack-based depth-first walk. Stops as soon as more than `limit` matches
/// are known; nodes deeper than `max_depth` are not visited.
pub fn resolve<'a>(
    query: &str,
    snapshot: &'a TreeSnapshot,
    mode: MatchMode,
    limit: usize,
    max_depth: usize,
) -> Resolution<'a> {
    let mut out = Resolution::default();
    let q = match mode {
        MatchMode::Path => query.trim().trim_start_matches('/'),
        MatchMode::Name => query.trim(),
    };
    if q.is_empty() {
        return out;
    }
    let q_lower = q.to_lowercase();
    let bound = limit.max(1) + 1;

    let mut stack: Vec<(&TreeNode, usize)> = snapshot.roots.iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth || node.name.is_empty() {
            continue;
        }

        let is_match = match mode {
            MatchMode::Path => node.path == q,
            MatchMode::Name => node.name == q,
        };
        if is_match {
            out.matches.push(node);
            if out.matches.len() >= bound {
                break;
            }
        } else if out.suggestions.len() < bound
            && (node.name.to_lowercase().contains(&q_lower) || node.path.to_lowercase().contains(&q_lower))
        {
            out.suggestions.push(node);
        }

        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the payload needs besides the resolution itself.
#[derive(Debug, Clone)]
pub struct DisambiguationContext<'a> {
    pub operation: &'a str,
    pub query: &'a TargetQuery,
    pub mode: MatchMode,
    pub search_depth: usize,
    pub limit: usize,
    /// Forwardable arguments (reserved keys already stripped).
    pub args: &'a Map<String, Value>,
    pub requires_confirmation: bool,
}

pub fn disambiguation_payload(ctx: &DisambiguationContext<'_>, resolution: &Resolution<'_>) -> Value {
    let limit = ctx.limit.max(1);
    let found = resolution.matches.len();
    let candidates: Vec<Value> = resolution.matches.iter().take(limit).map(|n| n.summary()).collect();
    let suggestions: Vec<Value> = resolution.suggestions.iter().take(limit).map(|n| n.summary()).collect();
    let truncated = found > limit || resolution.suggestions.len() > limit;

    let mut retry_args = ctx.args.clone();
    let placeholder = resolution
        .matches
        .first()
        .or_else(|| resolution.suggestions.first())
        .map(|n| n.path.clone())
        .unwrap_or_else(|| "<exact hierarchy path>".to_string());
    retry_args.insert(OBJECT_PATH_KEY.to_string(), Value::String(placeholder));
    if ctx.query.key != OBJECT_PATH_KEY {
        retry_args.remove(&ctx.query.key);
    }
    if ctx.requires_confirmation {
        retry_args.insert(CONFIRM_KEY.to_string(), Value::Bool(true));
        retry_args.insert(CONFIRM_NOTE_KEY.to_string(), Value::String("<why this change is intended>".into()));
    }

    let mut guidance = if found == 0 {
        format!(
            "No object matches {} '{}'. Pick one of the suggestions (if any) and retry with its exact `{OBJECT_PATH_KEY}`.",
            mode_label(ctx.mode),
            ctx.query.value
        )
    } else {
        format!(
            "'{}' matches {}{} objects by {}; '{}' requires exactly one. Retry with the exact `{OBJECT_PATH_KEY}` of the intended candidate, or pass `{ALLOW_AMBIGUOUS_KEY}: true` to let the editor pick.",
            ctx.query.value,
            found,
            if found > limit { "+" } else { "" },
            mode_label(ctx.mode),
            ctx.operation,
        )
    };
    if ctx.requires_confirmation {
        guidance.push_str(&format!(
            " This operation also requires confirmation: the retry must include `{CONFIRM_KEY}: true`."
        ));
    }

    let kind = if found == 0 { "target_not_found" } else { "ambiguous_target" };
    json!({
        "error": kind,
        "operation": ctx.operation,
        "query": ctx.query.value,
        "queryKey": ctx.query.key,
        "matchMode": ctx.mode,
        "searchDepth": ctx.search_depth,
        "matchesFound": found,
        "candidates": candidates,
        "suggestions": suggestions,
        "truncated": truncated,
        "retryTemplate": { "name": ctx.operation, "arguments": retry_args },
        "guidance": guidance,
    })
}

fn mode_label(mode: MatchMode) -> &'static str {
    match mode {
        MatchMode::Path => "path",
        MatchMode::Name => "name",
    }
}

/// Write the resolved path back into every path-bearing key that held the raw query.
pub fn substitute_canonical_path(args: &mut Map<String, Value>, query: &TargetQuery, canonical: &str) {
    for key in TARGET_PATH_KEYS {
        let holds_query = args.get(*key).and_then(|v| v.as_str()).map(str::trim) == Some(query.value.as_str());
        if holds_query {
            args.insert(key.to_string(), Value::String(canonical.to_string()));
        }
    }
    let current = args.get(OBJECT_PATH_KEY).and_then(|v| v.as_str()).unwrap_or("");
    if current.trim().is_empty() {
        args.insert(OBJECT_PATH_KEY.to_string(), Value::String(canonical.to_string()));
    }
}

/// Non-blocking hint for tree-target operations outside strict resolution.
pub fn bare_identifier_warning(operation: &str, args: &Map<String, Value>) -> Option<String> {
    TARGET_PATH_KEYS.iter().find_map(|key| {
        let v = non_empty_str(args, key)?;
        if v.contains('/') {
            return None;
        }
        Some(format!(
            "'{operation}' received bare identifier '{v}' in `{key}`. If several objects share that name the editor acts on the first one it finds; prefer the full hierarchy path (e.g. 'Parent/{v}')."
        ))
    })
}
