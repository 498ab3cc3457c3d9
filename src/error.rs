//! Bridge error types.
//!
//! Policy rejections are not errors: they are ordinary tool results built by
//! the dispatcher. These variants cover configuration and transport faults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Endpoint or config value that cannot be used at all.
    #[error("config error: {reason}")]
    Config { reason: String },

    /// TCP/HTTP connection to the editor bridge failed.
    #[error("connection failed to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// The call did not complete within its budget.
    #[error("'{operation}' timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Non-2xx HTTP response without a usable error envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The editor answered with an explicit `{error: {message, code}}`.
    #[error("editor error{}: {message}", code_suffix(code))]
    Upstream {
        message: String,
        code: Option<serde_json::Value>,
    },

    /// The response envelope was missing the fields we rely on.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

fn code_suffix(code: &Option<serde_json::Value>) -> String {
    match code {
        Some(serde_json::Value::String(s)) => format!(" [{s}]"),
        Some(other) => format!(" [{other}]"),
        None => String::new(),
    }
}

impl BridgeError {
    /// Failures worth one retry after a fresh health probe (read-only calls only).
    pub fn is_transient(&self) -> bool {
        match self {
            BridgeError::Connection { .. }
            | BridgeError::Timeout { .. }
            | BridgeError::Upstream { .. } => true,
            BridgeError::Http { status, .. } => *status >= 500,
            BridgeError::Config { .. } | BridgeError::MalformedResponse { .. } => false,
        }
    }

    /// Connection-level failure: the editor may have moved port or be reloading.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            BridgeError::Connection { .. } | BridgeError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_code_when_present() {
        let err = BridgeError::Upstream {
            message: "GameObject not found".into(),
            code: Some(serde_json::json!("NOT_FOUND")),
        };
        assert_eq!(err.to_string(), "editor error [NOT_FOUND]: GameObject not found");

        let err = BridgeError::Upstream { message: "boom".into(), code: None };
        assert_eq!(err.to_string(), "editor error: boom");
    }

    #[test]
    fn malformed_response_is_not_retried() {
        let err = BridgeError::MalformedResponse { reason: "missing content".into() };
        assert!(!err.is_transient());
        assert!(!err.is_connectivity());
    }

    #[test]
    fn server_side_http_errors_are_transient() {
        assert!(BridgeError::Http { status: 503, body: String::new() }.is_transient());
        assert!(!BridgeError::Http { status: 404, body: String::new() }.is_transient());
    }

    #[test]
    fn timeouts_count_as_connectivity() {
        let err = BridgeError::Timeout { operation: "unity.scene.list".into(), timeout_ms: 5_000 };
        assert!(err.is_connectivity());
        assert!(err.is_transient());
    }
}
