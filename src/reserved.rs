//! Engine-private `__` argument keys. Read here, stripped before forwarding.

use serde_json::{Map, Value};

pub const CONFIRM_KEY: &str = "__confirm";
pub const CONFIRM_NOTE_KEY: &str = "__confirmNote";
pub const ALLOW_AMBIGUOUS_KEY: &str = "__allowAmbiguous";
pub const TIMEOUT_KEYS: &[&str] = &["__timeoutMs", "__timeout_ms", "__timeout"];
pub const LOG_MAX_CHARS_KEY: &str = "__logMaxChars";
pub const LOG_MAX_LINES_KEY: &str = "__logMaxLines";

/// Per-call flags. Live for one dispatch only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmFlags {
    pub confirm: bool,
    pub confirm_note: Option<String>,
    pub allow_ambiguous: bool,
}

/// Output truncation requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputLimits {
    pub max_chars: Option<usize>,
    pub max_lines: Option<usize>,
}

impl OutputLimits {
    pub fn is_empty(&self) -> bool {
        self.max_chars.is_none() && self.max_lines.is_none()
    }
}

pub fn read_confirm_flags(args: &Map<String, Value>) -> ConfirmFlags {
    ConfirmFlags {
        confirm: truthy(args.get(CONFIRM_KEY)),
        confirm_note: args
            .get(CONFIRM_NOTE_KEY)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        allow_ambiguous: truthy(args.get(ALLOW_AMBIGUOUS_KEY)),
    }
}

pub fn read_output_limits(args: &Map<String, Value>) -> OutputLimits {
    OutputLimits {
        max_chars: positive(args.get(LOG_MAX_CHARS_KEY)),
        max_lines: positive(args.get(LOG_MAX_LINES_KEY)),
    }
}

/// Copy of `args` without any double-underscore key.
pub fn strip_reserved(args: &Map<String, Value>) -> Map<String, Value> {
    args.iter()
        .filter(|(k, _)| !k.starts_with("__"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn truthy(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => crate::config::parse_bool(s).unwrap_or(false),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

fn positive(v: Option<&Value>) -> Option<usize> {
    let n = match v? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (n > 0).then_some(n as usize)
}
