//! Per-call orchestration.
//!
//! One `tools/call` goes through: reserved-key extraction, normalization,
//! classification, the confirmation and capability gates, the schema check,
//! target resolution, and finally the forwarded call with its one permitted
//! retry. Every outcome is a [`ToolOutput`]; nothing escapes as a fault.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::asset_filter::{candidates_from_value, match_assets, parse_asset_filter, AssetLookup, AssetMatch};
use crate::classify::{classify, Classification, INVOKE_METHOD_OPERATION};
use crate::client::{fetch_tree, EditorTransport, HealthReport, ToolOutput};
use crate::config::{read_runtime_file, BridgeConfig, UrlSource};
use crate::error::BridgeError;
use crate::normalize::{is_missing, non_empty_str, normalize, ASSET_PATH_KEY};
use crate::output::truncate_content;
use crate::reserved::{
    read_confirm_flags, read_output_limits, strip_reserved, ALLOW_AMBIGUOUS_KEY, CONFIRM_KEY,
    CONFIRM_NOTE_KEY, LOG_MAX_CHARS_KEY, LOG_MAX_LINES_KEY, TIMEOUT_KEYS,
};
use crate::resolver::{
    bare_identifier_warning, choose_match_mode, disambiguation_payload, find_target_query, resolve,
    substitute_canonical_path, DisambiguationContext,
};
use crate::timeout::effective_timeout;
use crate::url_safety::{analyze_url, apply_url_policy};

pub const STATUS_TOOL: &str = "bridge.status";
pub const PING_TOOL: &str = "bridge.ping";
pub const ASSET_FIND_OPERATION: &str = "unity.asset.find";
const ASSET_LIST_OPERATION: &str = "unity.asset.list";
const ASSET_INFO_OPERATION: &str = "unity.asset.getInfo";

// ─────────────────────────────────────────────────────────────────────────────
// Connection status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    /// No call or probe has completed yet.
    Unknown,
    Connected,
    Unreachable,
    /// The endpoint could not be parsed; nothing is attempted.
    Misconfigured,
}

/// The only mutable state in the bridge. Written from the request loop alone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    endpoint: String,
    state: ConnectionState,
    /// Unix milliseconds of the last successful health probe.
    last_health_at: Option<u64>,
    last_warning: Option<String>,
    project_name: Option<String>,
    version: Option<String>,
}

impl ConnectionStatus {
    fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            state: ConnectionState::Unknown,
            last_health_at: None,
            last_warning: None,
            project_name: None,
            version: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_health_at(&self) -> Option<u64> {
        self.last_health_at
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.last_warning.as_deref()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn record_health(&mut self, report: &HealthReport) {
        self.state = ConnectionState::Connected;
        self.last_health_at = Some(now_ms());
        if report.project_name.is_some() {
            self.project_name = report.project_name.clone();
        }
        if report.version.is_some() {
            self.version = report.version.clone();
        }
    }

    fn record_reachable(&mut self) {
        if self.state != ConnectionState::Misconfigured {
            self.state = ConnectionState::Connected;
        }
    }

    fn record_failure(&mut self, err: &BridgeError) {
        if err.is_connectivity() {
            self.state = ConnectionState::Unreachable;
        }
        self.last_warning = Some(err.to_string());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.last_warning = Some(message.into());
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

pub struct Dispatcher {
    config: BridgeConfig,
    config_error: Option<String>,
    transport: Box<dyn EditorTransport>,
    status: ConnectionStatus,
    /// Input schemas from the last successful `tools/list`, keyed by operation name.
    schemas: HashMap<String, Value>,
}

impl Dispatcher {
    /// Applies the endpoint safety policy once. An unparsable endpoint is
    /// reported here and turns every later forwarded call into a config error.
    pub fn new(config: BridgeConfig, transport: Box<dyn EditorTransport>) -> Self {
        let mut status = ConnectionStatus::new(config.unity_url.clone());
        let mut config_error = None;

        match analyze_url(&config.unity_url) {
            Ok(analysis) => {
                let decision = apply_url_policy(&analysis, &config);
                for w in &decision.warnings {
                    warn!(endpoint = %analysis.url, "{w}");
                }
                if let Some(last) = decision.warnings.last() {
                    status.warn(last.clone());
                }
                status.endpoint = decision.url;
            }
            Err(e) => {
                error!(error = %e, "Unity endpoint unusable; forwarded calls are disabled");
                status.state = ConnectionState::Misconfigured;
                status.warn(e.to_string());
                config_error = Some(e.to_string());
            }
        }

        Self {
            config,
            config_error,
            transport,
            status,
            schemas: HashMap::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn config_error(&self) -> Option<&str> {
        self.config_error.as_deref()
    }

    // ── tools/list ──────────────────────────────────────────────────────────

    /// Editor catalogue merged with the bridge-local tools. Falls back to the
    /// local tools alone when the editor cannot be reached.
    pub fn list_tools(&mut self) -> Vec<Value> {
        let mut tools = local_tools();
        if self.config_error.is_some() {
            return tools;
        }

        let endpoint = self.status.endpoint.clone();
        let remote = match self.transport.list_tools(&endpoint, self.config.timeouts.preflight_ms) {
            Ok(remote) => {
                self.status.record_reachable();
                remote
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "editor tool catalogue unavailable; listing bridge tools only");
                self.status.record_failure(&e);
                self.reload_runtime_port();
                return tools;
            }
        };

        self.schemas.clear();
        let mut has_find = false;
        for tool in remote {
            let Some(name) = tool.get("name").and_then(|n| n.as_str()).map(str::to_string) else {
                continue;
            };
            if name == STATUS_TOOL || name == PING_TOOL {
                continue;
            }
            has_find |= name == ASSET_FIND_OPERATION;
            if let Some(schema) = tool.get("inputSchema").filter(|s| s.is_object()) {
                self.schemas.insert(name.clone(), schema.clone());
            }
            let verdict = classify(&name, &self.config);
            tools.push(annotate_tool(tool, &verdict));
        }
        if !has_find {
            tools.push(asset_find_tool());
        }
        debug!(count = tools.len(), "tool catalogue assembled");
        tools
    }

    // ── tools/call ──────────────────────────────────────────────────────────

    pub fn call_tool(&mut self, name: &str, raw_args: &Map<String, Value>) -> ToolOutput {
        match name {
            STATUS_TOOL => return self.status_report(),
            PING_TOOL => return self.ping(),
            _ => {}
        }

        if let Some(reason) = &self.config_error {
            return ToolOutput::json(
                &json!({
                    "error": "config_error",
                    "operation": name,
                    "message": reason,
                    "guidance": "Fix UNITY_MCP_URL (or unityUrl in the config file) and restart the bridge.",
                }),
                true,
            );
        }

        let flags = read_confirm_flags(raw_args);
        let limits = read_output_limits(raw_args);
        let timeout_ms = effective_timeout(name, raw_args, &self.config);
        let mut args = normalize(name, &strip_reserved(raw_args));
        let verdict = classify(name, &self.config);
        debug!(operation = %name, timeout_ms, ?verdict, "dispatching");

        if name.eq_ignore_ascii_case(INVOKE_METHOD_OPERATION) && !self.config.enable_unsafe_editor_invoke {
            return capability_disabled(name);
        }

        if verdict.requires_confirmation && !flags.confirm {
            return confirmation_required(name, &args, &verdict);
        }

        if let Some(missing) = self.missing_required(name, &args) {
            return ToolOutput::json(
                &json!({
                    "error": "missing_required_arguments",
                    "operation": name,
                    "missing": missing,
                    "guidance": format!("'{name}' requires {}; add them and retry.", missing.join(", ")),
                }),
                true,
            );
        }

        let mut warnings = Vec::new();
        if verdict.requires_unambiguous_target && verdict.is_likely_tree_target && !flags.allow_ambiguous {
            if let Err(refusal) = self.resolve_target(name, &mut args, &verdict) {
                return refusal;
            }
        } else if verdict.is_likely_tree_target {
            if let Some(w) = bare_identifier_warning(name, &args) {
                debug!(operation = %name, "{w}");
                warnings.push(w);
            }
        }

        if flags.confirm {
            if let Some(note) = &flags.confirm_note {
                info!(operation = %name, note = %note, "forwarding confirmed operation");
            }
        }

        let result = if name == ASSET_FIND_OPERATION {
            self.find_asset(&args, timeout_ms)
        } else {
            self.invoke(name, &args, timeout_ms, verdict.is_read_only)
        };

        let mut out = match result {
            Ok(out) => out,
            Err(e) => self.failure_output(name, &e),
        };
        truncate_content(&mut out.content, &limits);
        for w in warnings {
            out.content.push(json!({"type": "text", "text": format!("Warning: {w}")}));
        }
        out
    }

    /// Strict resolution. `Ok` means the call may proceed (possibly with a
    /// rewritten path); `Err` carries the response to return instead.
    fn resolve_target(
        &mut self,
        name: &str,
        args: &mut Map<String, Value>,
        verdict: &Classification,
    ) -> Result<(), ToolOutput> {
        let Some(query) = find_target_query(args) else {
            return Ok(());
        };

        let depth = self.config.scene_search_max_depth;
        let limit = self.config.target_candidate_limit;
        let endpoint = self.status.endpoint.clone();
        let snapshot = match fetch_tree(self.transport.as_ref(), &endpoint, depth, self.config.timeouts.preflight_ms) {
            Ok(s) => s,
            Err(e) => {
                warn!(operation = %name, error = %e, "hierarchy snapshot unavailable; refusing unverified target");
                self.status.record_failure(&e);
                if e.is_connectivity() {
                    self.reload_runtime_port();
                }
                return Err(ToolOutput::json(
                    &json!({
                        "error": "target_verification_failed",
                        "operation": name,
                        "query": query.value,
                        "reason": e.to_string(),
                        "guidance": format!(
                            "'{name}' needs a verified target but the scene hierarchy could not be read. \
                             Retry once the editor is responsive, or pass `{ALLOW_AMBIGUOUS_KEY}: true` to skip verification."
                        ),
                    }),
                    true,
                ));
            }
        };
        self.status.record_reachable();

        let mode = choose_match_mode(&query);
        let search_depth = snapshot.max_depth.unwrap_or(depth).min(depth);
        let resolution = resolve(&query.value, &snapshot, mode, limit, search_depth);
        if let [only] = resolution.matches.as_slice() {
            debug!(operation = %name, path = %only.path, "target resolved");
            let canonical = only.path.clone();
            substitute_canonical_path(args, &query, &canonical);
            return Ok(());
        }

        info!(
            operation = %name,
            query = %query.value,
            matches = resolution.matches.len(),
            "target not unique; returning candidates"
        );
        let ctx = DisambiguationContext {
            operation: name,
            query: &query,
            mode,
            search_depth,
            limit,
            args: &*args,
            requires_confirmation: verdict.requires_confirmation,
        };
        Err(ToolOutput::json(&disambiguation_payload(&ctx, &resolution), true))
    }

    fn missing_required(&self, name: &str, args: &Map<String, Value>) -> Option<Vec<String>> {
        let required = self.schemas.get(name)?.get("required")?.as_array()?;
        let missing: Vec<String> = required
            .iter()
            .filter_map(|k| k.as_str())
            .filter(|k| !k.starts_with("__") && is_missing(args.get(*k)))
            .map(str::to_string)
            .collect();
        (!missing.is_empty()).then_some(missing)
    }

    // ── forwarding ──────────────────────────────────────────────────────────

    /// Forward one call. Read-only calls get exactly one retry after a fresh probe.
    fn invoke(
        &mut self,
        name: &str,
        args: &Map<String, Value>,
        timeout_ms: u64,
        read_only: bool,
    ) -> Result<ToolOutput, BridgeError> {
        let endpoint = self.status.endpoint.clone();
        match self.transport.call(&endpoint, name, args, timeout_ms) {
            Ok(out) => {
                self.status.record_reachable();
                Ok(out)
            }
            Err(e) if read_only && e.is_transient() => {
                warn!(operation = %name, error = %e, "read-only call failed; re-probing before one retry");
                self.status.record_failure(&e);
                self.reprobe();
                let endpoint = self.status.endpoint.clone();
                let out = self.transport.call(&endpoint, name, args, timeout_ms)?;
                self.status.record_reachable();
                Ok(out)
            }
            Err(e) => Err(e),
        }
    }

    fn failure_output(&mut self, name: &str, e: &BridgeError) -> ToolOutput {
        self.status.record_failure(e);
        if e.is_connectivity() {
            self.reload_runtime_port();
        }
        warn!(operation = %name, error = %e, "editor call failed");

        let (kind, guidance) = match e {
            BridgeError::Connection { .. } | BridgeError::Timeout { .. } => (
                "editor_unreachable",
                format!(
                    "The Unity editor at {} did not answer. Check that the editor is open with the MCP bridge \
                     package running; it may be recompiling or reloading domains. Retry shortly, or call `{PING_TOOL}`.",
                    self.status.endpoint
                ),
            ),
            BridgeError::MalformedResponse { .. } => (
                "malformed_response",
                "The editor answered with an unexpected envelope; the bridge package may be out of date.".to_string(),
            ),
            BridgeError::Upstream { .. } => (
                "upstream_error",
                "The editor rejected the operation; check the arguments against the tool schema.".to_string(),
            ),
            BridgeError::Http { .. } => ("http_error", "The editor bridge returned an HTTP error.".to_string()),
            BridgeError::Config { .. } => ("config_error", "Fix the bridge configuration and restart.".to_string()),
        };
        let mut body = json!({
            "error": kind,
            "operation": name,
            "message": e.to_string(),
            "guidance": guidance,
        });
        if let BridgeError::Upstream { code: Some(code), .. } = e {
            body["code"] = code.clone();
        }
        ToolOutput::json(&body, true)
    }

    // ── reconnect ───────────────────────────────────────────────────────────

    fn reprobe(&mut self) {
        self.reload_runtime_port();
        let endpoint = self.status.endpoint.clone();
        match self.transport.health(&endpoint, self.config.timeouts.preflight_ms) {
            Ok(report) => self.status.record_health(&report),
            Err(e) => {
                debug!(endpoint = %endpoint, error = %e, "health re-probe failed");
                self.status.record_failure(&e);
            }
        }
    }

    /// Follow the port published by the editor, unless the URL was pinned explicitly.
    fn reload_runtime_port(&mut self) {
        if matches!(self.config.url_source, UrlSource::Env | UrlSource::File) {
            return;
        }
        let Some(runtime) = self.config.runtime_file.as_deref().and_then(read_runtime_file) else {
            return;
        };
        let Some(next) = with_port(&self.status.endpoint, runtime.port) else {
            return;
        };
        if next != self.status.endpoint {
            info!(from = %self.status.endpoint, to = %next, "editor port changed; switching endpoint");
            self.status.endpoint = next;
        }
    }

    // ── local tools ─────────────────────────────────────────────────────────

    fn status_report(&self) -> ToolOutput {
        let cfg = &self.config;
        ToolOutput::json(
            &json!({
                "connection": self.status,
                "configError": self.config_error,
                "policy": {
                    "configuredUrl": cfg.unity_url,
                    "urlSource": cfg.url_source,
                    "requireConfirmation": cfg.require_confirmation,
                    "requireUnambiguousTargets": cfg.require_unambiguous_targets,
                    "allowRemoteUrl": cfg.allow_remote_url,
                    "strictLocalUrl": cfg.strict_local_url,
                    "enableUnsafeEditorInvoke": cfg.enable_unsafe_editor_invoke,
                    "sceneSearchMaxDepth": cfg.scene_search_max_depth,
                    "targetCandidateLimit": cfg.target_candidate_limit,
                    "confirmAllowlist": cfg.confirm_allowlist.raw(),
                    "confirmDenylist": cfg.confirm_denylist.raw(),
                    "timeouts": cfg.timeouts,
                },
                "knownOperations": self.schemas.len(),
            }),
            false,
        )
    }

    fn ping(&mut self) -> ToolOutput {
        if let Some(reason) = &self.config_error {
            return ToolOutput::json(&json!({"ok": false, "error": "config_error", "message": reason}), true);
        }
        self.reload_runtime_port();
        let endpoint = self.status.endpoint.clone();
        match self.transport.health(&endpoint, self.config.timeouts.preflight_ms) {
            Ok(report) => {
                self.status.record_health(&report);
                ToolOutput::json(&json!({"ok": true, "endpoint": endpoint, "health": report}), false)
            }
            Err(e) => {
                self.status.record_failure(&e);
                ToolOutput::json(
                    &json!({"ok": false, "endpoint": endpoint, "error": e.to_string()}),
                    true,
                )
            }
        }
    }

    // ── unity.asset.find ────────────────────────────────────────────────────

    fn find_asset(&mut self, args: &Map<String, Value>, timeout_ms: u64) -> Result<ToolOutput, BridgeError> {
        let Some(text) = non_empty_str(args, "filter").or_else(|| non_empty_str(args, "query")) else {
            return Ok(ToolOutput::json(
                &json!({
                    "error": "missing_filter",
                    "operation": ASSET_FIND_OPERATION,
                    "guidance": "Pass `filter`, e.g. 't:Material name:Hero' or 'guid:…' or 'path:Assets/…'.",
                }),
                true,
            ));
        };
        let filter = parse_asset_filter(text);
        let limit = args
            .get("limit")
            .and_then(|l| l.as_u64())
            .map(|l| l as usize)
            .unwrap_or(self.config.target_candidate_limit)
            .max(1);

        let candidates = if filter.guid.is_some() || filter.path.is_some() {
            Vec::new()
        } else {
            let mut list_args = Map::new();
            if let Some(t) = filter.asset_type.as_deref().or_else(|| non_empty_str(args, "assetType")) {
                list_args.insert("assetType".into(), json!(t));
            }
            if let Some(folder) = non_empty_str(args, "folder") {
                list_args.insert("folder".into(), json!(folder));
            }
            let listed = self.invoke(ASSET_LIST_OPERATION, &list_args, timeout_ms, true)?;
            if listed.is_error {
                return Ok(listed);
            }
            candidates_from_value(&listed.first_json().unwrap_or(Value::Null))
        };

        match match_assets(&filter, &candidates, limit) {
            AssetMatch::Lookup(lookup) => {
                let mut info_args = Map::new();
                match lookup {
                    AssetLookup::Guid(g) => info_args.insert("guid".into(), json!(g)),
                    AssetLookup::Path(p) => info_args.insert(ASSET_PATH_KEY.into(), json!(p)),
                };
                self.invoke(ASSET_INFO_OPERATION, &info_args, timeout_ms, true)
            }
            AssetMatch::NoMatch => Ok(ToolOutput::json(
                &json!({
                    "matches": [],
                    "total": 0,
                    "filter": filter,
                    "guidance": "No asset matched. Loosen the name or drop free-text words; `t:` narrows by type.",
                }),
                false,
            )),
            AssetMatch::Many { items, total, truncated } => Ok(ToolOutput::json(
                &json!({
                    "matches": items,
                    "total": total,
                    "truncated": truncated,
                    "guidance": "Several assets matched. Retry with `guid:` or `path:` for the one you mean.",
                }),
                false,
            )),
        }
    }
}

fn with_port(endpoint: &str, port: u16) -> Option<String> {
    let mut url = Url::parse(endpoint).ok()?;
    url.set_port(Some(port)).ok()?;
    Some(url.as_str().trim_end_matches('/').to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Policy responses
// ─────────────────────────────────────────────────────────────────────────────

fn capability_disabled(name: &str) -> ToolOutput {
    ToolOutput::json(
        &json!({
            "error": "capability_disabled",
            "operation": name,
            "guidance": "Arbitrary editor method invocation is disabled. Set UNITY_MCP_ENABLE_UNSAFE_EDITOR_INVOKE=1 \
                         to enable it; every call will still require confirmation.",
        }),
        true,
    )
}

fn confirmation_required(name: &str, args: &Map<String, Value>, verdict: &Classification) -> ToolOutput {
    let mut retry = args.clone();
    retry.insert(CONFIRM_KEY.into(), Value::Bool(true));
    retry.insert(CONFIRM_NOTE_KEY.into(), json!("<why this change is intended>"));

    let mut guidance = format!(
        "'{name}' changes project or scene state and needs explicit confirmation. \
         Check the arguments, then retry with `{CONFIRM_KEY}: true` and a short `{CONFIRM_NOTE_KEY}`."
    );
    if verdict.requires_unambiguous_target && verdict.is_likely_tree_target {
        guidance.push_str(" The target must also resolve to exactly one object; use its full hierarchy path.");
    }

    info!(operation = %name, "confirmation required");
    ToolOutput::json(
        &json!({
            "error": "confirmation_required",
            "operation": name,
            "classification": verdict,
            "retryTemplate": { "name": name, "arguments": retry },
            "guidance": guidance,
        }),
        true,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalogue
// ─────────────────────────────────────────────────────────────────────────────

fn reserved_properties() -> Map<String, Value> {
    [
        (CONFIRM_KEY, "boolean", "Confirm a state-changing operation."),
        (CONFIRM_NOTE_KEY, "string", "Why the change is intended (logged)."),
        (ALLOW_AMBIGUOUS_KEY, "boolean", "Skip unique-target verification."),
        (TIMEOUT_KEYS[0], "integer", "Per-call timeout override in milliseconds."),
        (LOG_MAX_CHARS_KEY, "integer", "Truncate each text result to this many chars."),
        (LOG_MAX_LINES_KEY, "integer", "Truncate each text result to this many lines."),
    ]
    .into_iter()
    .map(|(key, ty, description)| (key.to_string(), json!({"type": ty, "description": description})))
    .collect()
}

fn annotate_tool(mut tool: Value, verdict: &Classification) -> Value {
    let mut notes = Vec::new();
    if verdict.requires_confirmation {
        notes.push(format!("Requires confirmation: pass `{CONFIRM_KEY}: true`."));
    }
    if verdict.requires_unambiguous_target && verdict.is_likely_tree_target {
        notes.push("Target must match exactly one object; use the full hierarchy path.".to_string());
    }
    if !notes.is_empty() {
        let base = tool.get("description").and_then(|d| d.as_str()).unwrap_or("").trim().to_string();
        let joined = notes.join(" ");
        tool["description"] = json!(if base.is_empty() { joined } else { format!("{base} [{joined}]") });
    }

    if !tool.get("inputSchema").is_some_and(|s| s.is_object()) {
        tool["inputSchema"] = json!({"type": "object", "properties": {}});
    }
    let schema = &mut tool["inputSchema"];
    if !schema.get("properties").is_some_and(|p| p.is_object()) {
        schema["properties"] = json!({});
    }
    if let Some(props) = schema["properties"].as_object_mut() {
        for (k, v) in reserved_properties() {
            props.entry(k).or_insert(v);
        }
    }
    tool
}

fn local_tools() -> Vec<Value> {
    vec![
        json!({
            "name": STATUS_TOOL,
            "description": "Bridge connection state (endpoint, last health check, last warning) and the effective safety policy. Does not contact the editor.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": PING_TOOL,
            "description": "Probe the Unity editor now and report its health (status, project name, version).",
            "inputSchema": { "type": "object", "properties": {} }
        }),
    ]
}

fn asset_find_tool() -> Value {
    json!({
        "name": ASSET_FIND_OPERATION,
        "description": "Find one asset by filter ('t:Material name:Hero', 'guid:…', 'path:Assets/…', free words). A single hit returns its info; several return a bounded list.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "filter": { "type": "string" },
                "limit": { "type": "integer", "minimum": 1 },
                "folder": { "type": "string" }
            },
            "required": ["filter"]
        }
    })
}
