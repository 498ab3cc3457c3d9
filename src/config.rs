use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::classify::NamePatterns;

pub const DEFAULT_PORT: u16 = 5051;
pub const DEFAULT_URL: &str = "http://localhost:5051";

/// Per-call time budgets, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub default_ms: u64,
    /// Budget for build/import/bake style operations.
    pub heavy_ms: u64,
    /// Hard ceiling; every computed or caller-supplied budget is capped here.
    pub max_ms: u64,
    /// Health probes and tree snapshot fetches.
    pub preflight_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_ms: 30_000,
            heavy_ms: 300_000,
            max_ms: 600_000,
            preflight_ms: 5_000,
        }
    }
}

/// On-disk config (`.unity-mcp.json` or a `.toml` file named by `UNITY_MCP_CONFIG`).
///
/// Every field is optional; environment variables win over anything set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub unity_url: Option<String>,
    pub runtime_file: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub heavy_timeout_ms: Option<u64>,
    pub max_timeout_ms: Option<u64>,
    pub preflight_timeout_ms: Option<u64>,
    pub require_confirmation: Option<bool>,
    pub require_unambiguous_targets: Option<bool>,
    pub allow_remote_url: Option<bool>,
    pub strict_local_url: Option<bool>,
    pub enable_unsafe_editor_invoke: Option<bool>,
    pub scene_search_max_depth: Option<usize>,
    pub target_candidate_limit: Option<usize>,
    pub confirm_allowlist: Option<Vec<String>>,
    pub confirm_denylist: Option<Vec<String>>,
}

/// Where the endpoint URL came from. Only non-explicit URLs follow the runtime file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlSource {
    Env,
    File,
    Runtime,
    Default,
}

/// Process-wide bridge configuration. Built once by [`build_config`], never mutated.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub unity_url: String,
    pub url_source: UrlSource,
    pub runtime_file: Option<PathBuf>,
    pub timeouts: TimeoutConfig,
    /// Global toggle for the confirmation heuristics (deny/allow lists still apply).
    pub require_confirmation: bool,
    pub require_unambiguous_targets: bool,
    pub allow_remote_url: bool,
    pub strict_local_url: bool,
    pub enable_unsafe_editor_invoke: bool,
    pub scene_search_max_depth: usize,
    pub target_candidate_limit: usize,
    pub confirm_allowlist: NamePatterns,
    pub confirm_denylist: NamePatterns,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            unity_url: DEFAULT_URL.to_string(),
            url_source: UrlSource::Default,
            runtime_file: None,
            timeouts: TimeoutConfig::default(),
            require_confirmation: true,
            require_unambiguous_targets: true,
            allow_remote_url: false,
            strict_local_url: false,
            enable_unsafe_editor_invoke: false,
            scene_search_max_depth: 50,
            target_candidate_limit: 25,
            confirm_allowlist: NamePatterns::default(),
            confirm_denylist: NamePatterns::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────────────────────

/// Read the process environment and optional config file exactly once.
pub fn load_config() -> BridgeConfig {
    let env: HashMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with("UNITY_MCP_"))
        .collect();

    let file_path = env
        .get("UNITY_MCP_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".unity-mcp.json"));
    let file = load_file_config(&file_path);

    let mut cfg = build_config(file, &env);
    if cfg.url_source == UrlSource::Default {
        if let Some(runtime) = cfg.runtime_file.as_deref().and_then(read_runtime_file) {
            cfg.unity_url = format!("http://localhost:{}", runtime.port);
            cfg.url_source = UrlSource::Runtime;
        }
    }
    cfg
}

pub fn load_file_config(path: &Path) -> FileConfig {
    let Ok(text) = std::fs::read_to_string(path) else {
        return FileConfig::default();
    };

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let parsed = if is_toml {
        toml::from_str::<FileConfig>(&text).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<FileConfig>(&text).map_err(|e| e.to_string())
    };

    parsed.unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
        FileConfig::default()
    })
}

/// Layer environment variables over a file config. Env wins.
pub fn build_config(file: FileConfig, env: &HashMap<String, String>) -> BridgeConfig {
    let defaults = BridgeConfig::default();

    let (unity_url, url_source) = match env_string(env, "UNITY_MCP_URL") {
        Some(u) => (u, UrlSource::Env),
        None => match file.unity_url.filter(|u| !u.trim().is_empty()) {
            Some(u) => (u.trim().to_string(), UrlSource::File),
            None => (defaults.unity_url.clone(), UrlSource::Default),
        },
    };

    let runtime_file = env_string(env, "UNITY_MCP_RUNTIME_FILE")
        .map(PathBuf::from)
        .or(file.runtime_file)
        .or_else(default_runtime_file);

    let d = &defaults.timeouts;
    let max_ms = env_u64(env, "UNITY_MCP_MAX_TIMEOUT_MS")
        .or(file.max_timeout_ms)
        .unwrap_or(d.max_ms)
        .max(1);
    let cap = |v: u64| v.clamp(1, max_ms);
    let timeouts = TimeoutConfig {
        default_ms: cap(env_u64(env, "UNITY_MCP_TIMEOUT_MS").or(file.timeout_ms).unwrap_or(d.default_ms)),
        heavy_ms: cap(env_u64(env, "UNITY_MCP_HEAVY_TIMEOUT_MS").or(file.heavy_timeout_ms).unwrap_or(d.heavy_ms)),
        max_ms,
        preflight_ms: cap(
            env_u64(env, "UNITY_MCP_PREFLIGHT_TIMEOUT_MS")
                .or(file.preflight_timeout_ms)
                .unwrap_or(d.preflight_ms),
        ),
    };

    let flag = |key: &str, from_file: Option<bool>, default: bool| {
        env_bool(env, key).or(from_file).unwrap_or(default)
    };

    let allow = env_list(env, "UNITY_MCP_CONFIRM_ALLOWLIST")
        .or(file.confirm_allowlist)
        .unwrap_or_default();
    let deny = env_list(env, "UNITY_MCP_CONFIRM_DENYLIST")
        .or(file.confirm_denylist)
        .unwrap_or_default();

    BridgeConfig {
        unity_url,
        url_source,
        runtime_file,
        timeouts,
        require_confirmation: flag("UNITY_MCP_REQUIRE_CONFIRMATION", file.require_confirmation, true),
        require_unambiguous_targets: flag(
            "UNITY_MCP_REQUIRE_UNAMBIGUOUS_TARGETS",
            file.require_unambiguous_targets,
            true,
        ),
        allow_remote_url: flag("UNITY_MCP_ALLOW_REMOTE_URL", file.allow_remote_url, false),
        strict_local_url: flag("UNITY_MCP_STRICT_LOCAL_URL", file.strict_local_url, false),
        enable_unsafe_editor_invoke: flag(
            "UNITY_MCP_ENABLE_UNSAFE_EDITOR_INVOKE",
            file.enable_unsafe_editor_invoke,
            false,
        ),
        scene_search_max_depth: env_u64(env, "UNITY_MCP_SCENE_SEARCH_MAX_DEPTH")
            .map(|v| v as usize)
            .or(file.scene_search_max_depth)
            .unwrap_or(defaults.scene_search_max_depth)
            .max(1),
        target_candidate_limit: env_u64(env, "UNITY_MCP_TARGET_CANDIDATE_LIMIT")
            .map(|v| v as usize)
            .or(file.target_candidate_limit)
            .unwrap_or(defaults.target_candidate_limit)
            .max(1),
        confirm_allowlist: NamePatterns::new(&allow),
        confirm_denylist: NamePatterns::new(&deny),
    }
}

fn default_runtime_file() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".unity-mcp").join("runtime.json"))
}

fn env_string(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(env: &HashMap<String, String>, key: &str) -> Option<u64> {
    let raw = env_string(env, key)?;
    match raw.parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric environment value");
            None
        }
    }
}

fn env_bool(env: &HashMap<String, String>, key: &str) -> Option<bool> {
    let raw = env_string(env, key)?;
    match parse_bool(&raw) {
        Some(b) => Some(b),
        None => {
            tracing::warn!(key, value = %raw, "ignoring non-boolean environment value");
            None
        }
    }
}

fn env_list(env: &HashMap<String, String>, key: &str) -> Option<Vec<String>> {
    let raw = env_string(env, key)?;
    Some(
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime file (written by the editor plugin)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeInfo {
    pub port: u16,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub pid: Option<u32>,
}

/// Read the live port. Missing or unparsable files yield `None`.
pub fn read_runtime_file(path: &Path) -> Option<RuntimeInfo> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<RuntimeInfo>(&text) {
        Ok(info) if info.port > 0 => Some(info),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "runtime file unreadable");
            None
        }
    }
}
