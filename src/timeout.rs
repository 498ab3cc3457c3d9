use serde_json::{Map, Value};

use crate::config::BridgeConfig;
use crate::reserved::TIMEOUT_KEYS;

/// Substrings marking long-running editor work.
const HEAVY_VOCABULARY: &[&str] = &[
    "build", "import", "export", "pack", "compile", "test", "bake", "lighting", "optimize",
];

/// Base budget for an operation, before clamping.
pub fn get_timeout(name: &str, config: &BridgeConfig) -> u64 {
    let lower = name.to_ascii_lowercase();
    if HEAVY_VOCABULARY.iter().any(|w| lower.contains(w)) {
        config.timeouts.heavy_ms
    } else {
        config.timeouts.default_ms
    }
}

/// Always lands in `(0, max_ms]`. Non-finite or non-positive input means "use the default".
pub fn clamp(value: f64, config: &BridgeConfig) -> u64 {
    let max = config.timeouts.max_ms.max(1);
    if !value.is_finite() || value <= 0.0 {
        return config.timeouts.default_ms.clamp(1, max);
    }
    let ms = value.ceil();
    if ms >= max as f64 {
        max
    } else {
        (ms as u64).max(1)
    }
}

/// Caller override (any of the reserved spellings) wins over the name-based budget.
pub fn effective_timeout(name: &str, raw_args: &Map<String, Value>, config: &BridgeConfig) -> u64 {
    match timeout_override(raw_args) {
        Some(v) => clamp(v, config),
        None => clamp(get_timeout(name, config) as f64, config),
    }
}

fn timeout_override(args: &Map<String, Value>) -> Option<f64> {
    TIMEOUT_KEYS.iter().find_map(|k| match args.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
