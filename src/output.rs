//! Per-call output truncation (`__logMaxLines`, `__logMaxChars`).

use serde_json::Value;

use crate::reserved::OutputLimits;

pub const TRUNCATION_MARKER: &str = "…[truncated]";

/// Lines first, then chars. Returns the input untouched when within limits.
pub fn truncate_text(text: &str, limits: &OutputLimits) -> String {
    let mut out = text.to_string();
    let mut cut = false;

    if let Some(max_lines) = limits.max_lines {
        if out.lines().count() > max_lines {
            out = out.lines().take(max_lines).collect::<Vec<_>>().join("\n");
            cut = true;
        }
    }
    if let Some(max_chars) = limits.max_chars {
        if out.chars().count() > max_chars {
            out = out.chars().take(max_chars).collect();
            cut = true;
        }
    }

    if cut {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(TRUNCATION_MARKER);
    }
    out
}

/// Apply limits to every text item of a result's content array.
pub fn truncate_content(content: &mut [Value], limits: &OutputLimits) {
    if limits.is_empty() {
        return;
    }
    for item in content.iter_mut() {
        if item.get("type").and_then(|t| t.as_str()) != Some("text") {
            continue;
        }
        if let Some(Value::String(text)) = item.get_mut("text") {
            let shortened = truncate_text(text, limits);
            *text = shortened;
        }
    }
}
