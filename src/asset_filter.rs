//! Asset filter strings (`t:Material name:"Hero Ship" guid:… path:… free words`).
//!
//! The parser is shared by the `unity.asset.find` lookup and by the argument
//! normalizer, which lifts `type:` out of free-text list filters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFilter {
    pub asset_type: Option<String>,
    pub name: Option<String>,
    pub guid: Option<String>,
    pub path: Option<String>,
    /// Free-text tokens; each must appear in `name + path`.
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCandidate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default, rename = "type", alias = "assetType")]
    pub asset_type: Option<String>,
}

/// Direct lookup key handed to `unity.asset.getInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLookup {
    Guid(String),
    Path(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetMatch<'a> {
    Lookup(AssetLookup),
    NoMatch,
    Many {
        items: Vec<&'a AssetCandidate>,
        total: usize,
        truncated: bool,
    },
}

/// Whitespace split that keeps `"quoted runs"` (or `'…'`) together. Quote marks are dropped.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => cur.push(ch),
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch.is_whitespace() => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
            None => cur.push(ch),
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

pub fn parse_asset_filter(input: &str) -> AssetFilter {
    let tokens = tokenize(input);
    let mut filter = AssetFilter::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        let Some((key, value)) = token.split_once(':') else {
            filter.tokens.push(token.clone());
            continue;
        };
        let slot = match key.trim().to_ascii_lowercase().as_str() {
            "t" | "type" => &mut filter.asset_type,
            "name" => &mut filter.name,
            "guid" => &mut filter.guid,
            "path" => &mut filter.path,
            _ => {
                filter.tokens.push(token.clone());
                continue;
            }
        };

        // `t: Material`: the value is the next token.
        let value = if value.trim().is_empty() {
            match tokens.get(i) {
                Some(next) => {
                    i += 1;
                    next.trim().to_string()
                }
                None => continue,
            }
        } else {
            value.trim().to_string()
        };

        if slot.is_none() && !value.is_empty() {
            *slot = Some(value);
        }
    }

    filter
}

/// Parse candidates out of a `unity.asset.list` payload (`{assets: [...]}`, `{items: [...]}` or a bare array).
pub fn candidates_from_value(v: &Value) -> Vec<AssetCandidate> {
    let arr = v
        .get("assets")
        .or_else(|| v.get("items"))
        .or_else(|| v.get("results"))
        .and_then(|a| a.as_array())
        .or_else(|| v.as_array());
    arr.map(|items| {
        items
            .iter()
            .filter_map(|it| serde_json::from_value::<AssetCandidate>(it.clone()).ok())
            .filter(|c| !c.path.is_empty() || c.guid.is_some())
            .collect()
    })
    .unwrap_or_default()
}

pub fn match_assets<'a>(
    filter: &AssetFilter,
    candidates: &'a [AssetCandidate],
    limit: usize,
) -> AssetMatch<'a> {
    if let Some(guid) = &filter.guid {
        return AssetMatch::Lookup(AssetLookup::Guid(guid.clone()));
    }
    if let Some(path) = &filter.path {
        return AssetMatch::Lookup(AssetLookup::Path(path.clone()));
    }

    let needle = filter.name.as_deref().map(str::to_lowercase);
    let tokens: Vec<String> = filter.tokens.iter().map(|t| t.to_lowercase()).collect();

    let survivors: Vec<&AssetCandidate> = candidates
        .iter()
        .filter(|c| {
            let name = c.name.to_lowercase();
            if let Some(n) = &needle {
                if !name.contains(n.as_str()) {
                    return false;
                }
            }
            let haystack = format!("{name} {}", c.path.to_lowercase());
            tokens.iter().all(|t| haystack.contains(t.as_str()))
        })
        .collect();

    match survivors.len() {
        0 => AssetMatch::NoMatch,
        1 => {
            let only = survivors[0];
            match &only.guid {
                Some(g) if !g.is_empty() => AssetMatch::Lookup(AssetLookup::Guid(g.clone())),
                _ => AssetMatch::Lookup(AssetLookup::Path(only.path.clone())),
            }
        }
        total => {
            let limit = limit.max(1);
            AssetMatch::Many {
                items: survivors.into_iter().take(limit).collect(),
                total,
                truncated: total > limit,
            }
        }
    }
}
