use tracing_subscriber::EnvFilter;

/// Structured logging to stderr. `RUST_LOG` wins; default `unity_mcp_bridge=info`.
///
/// stdout carries the JSON-RPC stream, so nothing may ever be written there.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("unity_mcp_bridge=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging();
        init_logging();
    }
}
