use serde::Serialize;
use serde_json::{json, Value};

/// One scene-hierarchy node as reported by `unity.scene.list`.
///
/// Snapshots are fetched fresh for every resolution and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    /// Ancestor-joined path, e.g. `Environment/Props/Crate`.
    pub path: String,
    pub active: bool,
    pub child_count: usize,
    pub transform: Option<Value>,
    pub components: Vec<String>,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub roots: Vec<TreeNode>,
    /// Depth the editor actually walked; `None` when it did not say.
    pub max_depth: Option<usize>,
}

const ROOT_KEYS: &[&str] = &["rootObjects", "roots", "gameObjects", "hierarchy"];

impl TreeSnapshot {
    /// Lenient parse: nodes without a name are skipped, missing paths are rebuilt
    /// from ancestors, `childCount` falls back to the number of children listed.
    pub fn from_value(v: &Value) -> Option<Self> {
        let roots = ROOT_KEYS
            .iter()
            .find_map(|k| v.get(*k).and_then(|r| r.as_array()))
            .or_else(|| v.as_array())?;

        let max_depth = ["maxDepth", "depth", "searchDepth"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|d| d.as_u64()))
            .map(|d| d as usize);

        Some(Self {
            roots: roots.iter().filter_map(|n| TreeNode::from_value(n, None)).collect(),
            max_depth,
        })
    }
}

impl TreeNode {
    pub fn from_value(v: &Value, parent_path: Option<&str>) -> Option<Self> {
        let obj = v.as_object()?;
        let name = obj.get("name")?.as_str()?.to_string();
        if name.is_empty() {
            return None;
        }

        let path = obj
            .get("path")
            .and_then(|p| p.as_str())
            .map(|p| p.trim_start_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| match parent_path {
                Some(parent) => format!("{parent}/{name}"),
                None => name.clone(),
            });

        let children: Vec<TreeNode> = obj
            .get("children")
            .and_then(|c| c.as_array())
            .map(|arr| arr.iter().filter_map(|c| TreeNode::from_value(c, Some(&path))).collect())
            .unwrap_or_default();

        let components = obj
            .get("components")
            .and_then(|c| c.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|c| match c {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(o) => o
                            .get("type")
                            .or_else(|| o.get("name"))
                            .and_then(|t| t.as_str())
                            .map(str::to_string),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            active: obj
                .get("active")
                .or_else(|| obj.get("activeSelf"))
                .and_then(|a| a.as_bool())
                .unwrap_or(true),
            child_count: obj
                .get("childCount")
                .and_then(|c| c.as_u64())
                .map(|c| c as usize)
                .unwrap_or(children.len()),
            transform: obj.get("transform").filter(|t| !t.is_null()).cloned(),
            components,
            children,
            name,
            path,
        })
    }

    /// Stable, child-free summary used in disambiguation payloads.
    pub fn summary(&self) -> Value {
        json!({
            "name": self.name,
            "path": self.path,
            "active": self.active,
            "childCount": self.child_count,
            "transform": self.transform,
            "components": self.components,
        })
    }
}
