//! Argument normalization.
//!
//! Agents spell the same argument many ways (`targetPath`, `objectPath`,
//! `instancePath`, …). Each family rule only *adds* a canonical key when it is
//! missing, so `normalize(normalize(x)) == normalize(x)` and caller-supplied
//! values are never overwritten.

use serde_json::{Map, Value};

use crate::asset_filter::parse_asset_filter;

/// Canonical hierarchy-path key understood by every editor operation.
pub const OBJECT_PATH_KEY: &str = "gameObjectPath";
pub const ASSET_PATH_KEY: &str = "assetPath";

const ASSET_ROOTS: &[&str] = &["Assets/", "Packages/"];

const COMPONENT_HINTS: &[&str] = &[
    "component", "transform", "rigidbody", "collider", "renderer", "animator", "audiosource",
    "camera", "light", "script", "behaviour", "behavior",
];

const DELETE_ASSET_OPERATION: &str = "unity.asset.delete";

/// Argument shape implied by the operation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentFamily {
    ReferenceSetting,
    PrefabLifecycle,
    Ui { runtime_query: bool },
    CreateShorthand,
    FolderCreation,
    AssetListing,
    Other,
}

impl ArgumentFamily {
    pub fn of(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let last = lower.rsplit('.').next().unwrap_or(&lower);

        if last.starts_with("set") && last.contains("reference") {
            ArgumentFamily::ReferenceSetting
        } else if lower.starts_with("unity.prefab.") {
            ArgumentFamily::PrefabLifecycle
        } else if lower.starts_with("unity.ui.") || lower.starts_with("unity.uitoolkit.") {
            ArgumentFamily::Ui {
                runtime_query: lower.contains(".runtime.") || last.starts_with("query"),
            }
        } else if last == "createfolder" {
            ArgumentFamily::FolderCreation
        } else if lower.starts_with("unity.gameobject.") && last.starts_with("create") {
            ArgumentFamily::CreateShorthand
        } else if lower.starts_with("unity.asset.")
            && ["list", "find", "search"].iter().any(|v| last.starts_with(v))
        {
            ArgumentFamily::AssetListing
        } else {
            ArgumentFamily::Other
        }
    }
}

pub fn normalize(name: &str, raw: &Map<String, Value>) -> Map<String, Value> {
    let mut args = raw.clone();

    match ArgumentFamily::of(name) {
        ArgumentFamily::ReferenceSetting => normalize_reference(&mut args),
        ArgumentFamily::PrefabLifecycle => {
            alias_first(&mut args, OBJECT_PATH_KEY, &["instancePath", "prefabInstancePath"]);
        }
        ArgumentFamily::Ui { runtime_query } => {
            alias_first(&mut args, OBJECT_PATH_KEY, &["targetPath", "objectPath", "target"]);
            if runtime_query {
                normalize_selector(&mut args);
            }
        }
        ArgumentFamily::CreateShorthand => {
            alias_first(&mut args, "primitiveType", &["type"]);
        }
        ArgumentFamily::FolderCreation => normalize_folder(&mut args),
        ArgumentFamily::AssetListing => {
            let lifted = non_empty_str(&args, "filter").and_then(|f| parse_asset_filter(f).asset_type);
            if let (true, Some(t)) = (is_missing(args.get("assetType")), lifted) {
                args.insert("assetType".into(), Value::String(t));
            }
        }
        ArgumentFamily::Other => {}
    }

    // Universal fallback: a generic `path` addresses the object.
    alias_first(&mut args, OBJECT_PATH_KEY, &["path"]);
    if name.eq_ignore_ascii_case(DELETE_ASSET_OPERATION) {
        alias_first(&mut args, ASSET_PATH_KEY, &["path"]);
    }

    args
}

// ─────────────────────────────────────────────────────────────────────────────
// Family rules
// ─────────────────────────────────────────────────────────────────────────────

fn normalize_reference(args: &mut Map<String, Value>) {
    if is_missing(args.get("referenceType")) {
        let generic = non_empty_str(args, "referencePath").map(str::to_string);
        let inferred = if !is_missing(args.get("referenceAssetPath")) {
            Some("asset")
        } else if generic.as_deref().is_some_and(is_under_asset_root) {
            Some("asset")
        } else if generic.is_some() || !is_missing(args.get("referenceGameObjectPath")) {
            if field_hints_component(args) {
                Some("component")
            } else {
                Some("gameObject")
            }
        } else {
            None
        };
        if let Some(kind) = inferred {
            args.insert("referenceType".into(), Value::String(kind.into()));
        }
    }

    let kind_key = match non_empty_str(args, "referenceType").map(str::to_ascii_lowercase).as_deref() {
        Some("asset") => Some("referenceAssetPath"),
        Some("gameobject") | Some("component") => Some("referenceGameObjectPath"),
        _ => None,
    };
    if let Some(key) = kind_key {
        alias_first(args, key, &["referencePath"]);
    }
}

fn normalize_selector(args: &mut Map<String, Value>) {
    if !is_missing(args.get("selector")) {
        return;
    }
    if let Some(q) = non_empty_str(args, "query").map(str::to_string) {
        args.insert("selector".into(), Value::String(q));
        return;
    }
    if let Some(el) = non_empty_str(args, "elementName").map(str::to_string) {
        let selector = if looks_like_selector(&el) { el } else { format!("#{el}") };
        args.insert("selector".into(), Value::String(selector));
    }
}

fn normalize_folder(args: &mut Map<String, Value>) {
    if !is_missing(args.get("path")) {
        return;
    }
    let parent = ["parentFolder", "parentPath"].iter().find_map(|k| non_empty_str(args, k));
    let folder = ["newFolderName", "folderName"].iter().find_map(|k| non_empty_str(args, k));
    if let (Some(parent), Some(folder)) = (parent, folder) {
        let full = format!("{}/{}", parent.trim_end_matches('/'), folder.trim_start_matches('/'));
        args.insert("path".into(), Value::String(full));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Absent, null, or a blank string.
pub fn is_missing(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn non_empty_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Copy the first non-empty source into `target` when `target` is missing.
fn alias_first(args: &mut Map<String, Value>, target: &str, sources: &[&str]) {
    if !is_missing(args.get(target)) {
        return;
    }
    let found = sources
        .iter()
        .filter(|s| **s != target)
        .find_map(|s| non_empty_str(args, s).map(str::to_string));
    if let Some(v) = found {
        args.insert(target.to_string(), Value::String(v));
    }
}

fn is_under_asset_root(value: &str) -> bool {
    ASSET_ROOTS.iter().any(|root| value.starts_with(root))
}

fn field_hints_component(args: &Map<String, Value>) -> bool {
    ["fieldName", "propertyName", "field"]
        .iter()
        .filter_map(|k| non_empty_str(args, k))
        .any(|f| {
            let f = f.to_ascii_lowercase();
            COMPONENT_HINTS.iter().any(|h| f.contains(h))
        })
}

fn looks_like_selector(s: &str) -> bool {
    s.starts_with('#')
        || s.starts_with('.')
        || s.starts_with(':')
        || s.contains(|c: char| c.is_whitespace() || matches!(c, '>' | '[' | ']' | '*' | '+' | '~'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn create_folder_synthesizes_path() {
        let raw = map(json!({"parentFolder": "Assets", "newFolderName": "Foo"}));
        let out = normalize("unity.asset.createFolder", &raw);
        assert_eq!(
            Value::Object(out),
            json!({
                "parentFolder": "Assets",
                "newFolderName": "Foo",
                "path": "Assets/Foo",
                "gameObjectPath": "Assets/Foo"
            })
        );
        assert_eq!(raw.len(), 2, "input is not mutated");
    }

    #[test]
    fn explicit_folder_path_is_kept() {
        let raw = map(json!({"path": "Assets/Bar", "parentFolder": "Assets", "newFolderName": "Foo"}));
        let out = normalize("unity.asset.createFolder", &raw);
        assert_eq!(out["path"], "Assets/Bar");
    }

    #[test]
    fn reference_kind_inferred_from_asset_root() {
        let out = normalize(
            "unity.component.setReference",
            &map(json!({"referencePath": "Assets/Mats/Red.mat", "fieldName": "material"})),
        );
        assert_eq!(out["referenceType"], "asset");
        assert_eq!(out["referenceAssetPath"], "Assets/Mats/Red.mat");
    }

    #[test]
    fn reference_kind_inferred_from_field_hint() {
        let out = normalize(
            "unity.component.setObjectReference",
            &map(json!({"referencePath": "Player", "fieldName": "targetTransform"})),
        );
        assert_eq!(out["referenceType"], "component");
        assert_eq!(out["referenceGameObjectPath"], "Player");
    }

    #[test]
    fn reference_kind_defaults_to_game_object() {
        let out = normalize(
            "unity.component.setReference",
            &map(json!({"referencePath": "Enemies/Boss", "fieldName": "target"})),
        );
        assert_eq!(out["referenceType"], "gameObject");
        assert_eq!(out["referenceGameObjectPath"], "Enemies/Boss");
    }

    #[test]
    fn caller_reference_type_is_respected() {
        let out = normalize(
            "unity.component.setReference",
            &map(json!({"referencePath": "Assets/X.asset", "referenceType": "gameObject"})),
        );
        assert_eq!(out["referenceType"], "gameObject");
        assert_eq!(out["referenceGameObjectPath"], "Assets/X.asset");
        assert!(!out.contains_key("referenceAssetPath"));
    }

    #[test]
    fn prefab_instance_path_aliased() {
        let out = normalize("unity.prefab.applyOverrides", &map(json!({"instancePath": "Env/Tree"})));
        assert_eq!(out[OBJECT_PATH_KEY], "Env/Tree");
    }

    #[test]
    fn ui_target_spellings_unify() {
        for key in ["targetPath", "objectPath", "target"] {
            let mut raw = Map::new();
            raw.insert(key.into(), json!("Canvas/Button"));
            let out = normalize("unity.ui.setText", &raw);
            assert_eq!(out[OBJECT_PATH_KEY], "Canvas/Button", "{key}");
        }
    }

    #[test]
    fn runtime_query_selector_synthesis() {
        let out = normalize("unity.uitoolkit.runtime.click", &map(json!({"elementName": "PlayButton"})));
        assert_eq!(out["selector"], "#PlayButton");

        let out = normalize("unity.uitoolkit.runtime.click", &map(json!({"elementName": ".menu > Button"})));
        assert_eq!(out["selector"], ".menu > Button");

        let out = normalize("unity.uitoolkit.queryElements", &map(json!({"query": "Button", "elementName": "x"})));
        assert_eq!(out["selector"], "Button");

        let out = normalize("unity.ui.setText", &map(json!({"elementName": "Title"})));
        assert!(!out.contains_key("selector"), "only the runtime query subfamily gets selectors");
    }

    #[test]
    fn create_shorthand_aliases_type() {
        let out = normalize("unity.gameObject.create", &map(json!({"type": "Cube", "name": "Box"})));
        assert_eq!(out["primitiveType"], "Cube");
        let out = normalize("unity.gameObject.create", &map(json!({"type": "Cube", "primitiveType": "Sphere"})));
        assert_eq!(out["primitiveType"], "Sphere");
    }

    #[test]
    fn listing_lifts_type_from_filter() {
        let out = normalize("unity.asset.list", &map(json!({"filter": "hero t:Material"})));
        assert_eq!(out["assetType"], "Material");
        let out = normalize("unity.asset.list", &map(json!({"filter": "t:Material", "assetType": "Texture2D"})));
        assert_eq!(out["assetType"], "Texture2D");
    }

    #[test]
    fn delete_asset_mirrors_path_into_both_keys() {
        let out = normalize("unity.asset.delete", &map(json!({"path": "Assets/Old.mat"})));
        assert_eq!(out[ASSET_PATH_KEY], "Assets/Old.mat");
        assert_eq!(out[OBJECT_PATH_KEY], "Assets/Old.mat");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let out = normalize("unity.gameObject.setActive", &map(json!({"path": "Root/A", "gameObjectPath": "  "})));
        assert_eq!(out[OBJECT_PATH_KEY], "Root/A");
    }

    #[test]
    fn normalize_is_a_fixed_point() {
        let cases = [
            ("unity.asset.createFolder", json!({"parentFolder": "Assets/", "newFolderName": "Foo"})),
            ("unity.component.setReference", json!({"referencePath": "Player", "fieldName": "rigidbody"})),
            ("unity.uitoolkit.runtime.click", json!({"elementName": "Play", "target": "UI"})),
            ("unity.asset.delete", json!({"path": "Assets/A.mat"})),
        ];
        for (name, raw) in cases {
            let once = normalize(name, &map(raw));
            let twice = normalize(name, &once);
            assert_eq!(once, twice, "{name}");
        }
    }

    #[test]
    fn family_detection() {
        assert_eq!(ArgumentFamily::of("unity.component.setReference"), ArgumentFamily::ReferenceSetting);
        assert_eq!(ArgumentFamily::of("unity.prefab.unpack"), ArgumentFamily::PrefabLifecycle);
        assert_eq!(
            ArgumentFamily::of("unity.uitoolkit.runtime.query"),
            ArgumentFamily::Ui { runtime_query: true }
        );
        assert_eq!(ArgumentFamily::of("unity.asset.createFolder"), ArgumentFamily::FolderCreation);
        assert_eq!(ArgumentFamily::of("unity.scene.save"), ArgumentFamily::Other);
    }
}
