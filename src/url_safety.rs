//! Endpoint safety: the editor bridge executes state-mutating operations, so a
//! non-loopback endpoint is either warned about, allowed, or refused.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde::Serialize;
use url::Url;

use crate::config::{BridgeConfig, DEFAULT_PORT};
use crate::error::BridgeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlAnalysis {
    pub url: String,
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub is_http: bool,
    pub is_loopback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlDecision {
    /// Endpoint to actually use (trailing `/` trimmed).
    pub url: String,
    pub warnings: Vec<String>,
    /// True when strict mode replaced a remote endpoint with loopback.
    pub replaced: bool,
}

pub fn analyze_url(raw: &str) -> Result<UrlAnalysis, BridgeError> {
    let parsed = Url::parse(raw.trim()).map_err(|e| BridgeError::Config {
        reason: format!("unparsable Unity endpoint '{raw}': {e}"),
    })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| BridgeError::Config {
            reason: format!("Unity endpoint '{raw}' has no host"),
        })?
        .to_string();
    let scheme = parsed.scheme().to_ascii_lowercase();

    Ok(UrlAnalysis {
        url: raw.trim().trim_end_matches('/').to_string(),
        is_http: scheme == "http" || scheme == "https",
        is_loopback: is_loopback_host(&host),
        port: parsed.port(),
        scheme,
        host,
    })
}

/// Three independent checks: reserved names, 127.0.0.0/8, `::1`.
pub fn is_loopback_host(host: &str) -> bool {
    let h = host.trim().trim_end_matches('.').to_ascii_lowercase();
    if is_reserved_loopback_name(&h) {
        return true;
    }
    if let Ok(v4) = h.parse::<Ipv4Addr>() {
        return v4.octets()[0] == 127;
    }
    let bare = h.trim_start_matches('[').trim_end_matches(']');
    bare.parse::<Ipv6Addr>().is_ok_and(|v6| v6 == Ipv6Addr::LOCALHOST)
}

fn is_reserved_loopback_name(h: &str) -> bool {
    h == "localhost" || h.ends_with(".localhost") || h == "localhost.localdomain"
}

/// Apply the configured remote-endpoint policy. Strict mode wins over allow-remote.
pub fn apply_url_policy(analysis: &UrlAnalysis, config: &BridgeConfig) -> UrlDecision {
    let mut warnings = Vec::new();
    if !analysis.is_http {
        warnings.push(format!(
            "Unity endpoint uses scheme '{}'; the editor bridge speaks HTTP.",
            analysis.scheme
        ));
    }

    if analysis.is_loopback {
        return UrlDecision { url: analysis.url.clone(), warnings, replaced: false };
    }

    if config.strict_local_url {
        let fallback = format!("http://localhost:{}", analysis.port.unwrap_or(DEFAULT_PORT));
        warnings.push(format!(
            "Refusing non-loopback Unity endpoint {} (strict local mode); using {fallback}.",
            analysis.url
        ));
        return UrlDecision { url: fallback, warnings, replaced: true };
    }

    if !config.allow_remote_url {
        warnings.push(format!(
            "Unity endpoint {} is not loopback; editor operations will run on host '{}'. \
             Set UNITY_MCP_ALLOW_REMOTE_URL=1 to silence or UNITY_MCP_STRICT_LOCAL_URL=1 to refuse.",
            analysis.url, analysis.host
        ));
    }
    UrlDecision { url: analysis.url.clone(), warnings, replaced: false }
}
