use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use unity_mcp_bridge::classify::classify;
use unity_mcp_bridge::client::{EditorTransport, HttpEditorClient};
use unity_mcp_bridge::config::load_config;
use unity_mcp_bridge::logging::init_logging;
use unity_mcp_bridge::server::run_stdio_server;
use unity_mcp_bridge::timeout::effective_timeout;
use unity_mcp_bridge::url_safety::{analyze_url, apply_url_policy};

#[derive(Debug, Parser)]
#[command(name = "unity-mcp-bridge")]
#[command(version)]
#[command(about = "MCP stdio bridge to the Unity editor with confirmation and target-safety policy")]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start MCP stdio server (default)
    Mcp,
    /// Probe the configured editor endpoint once and print the health report
    Health,
    /// Print the policy verdict and timeout budget for an operation name
    Classify {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.cmd.unwrap_or(Command::Mcp) {
        Command::Mcp => run_stdio_server(),
        Command::Health => {
            let cfg = load_config();
            let analysis = analyze_url(&cfg.unity_url)?;
            let decision = apply_url_policy(&analysis, &cfg);
            for w in &decision.warnings {
                tracing::warn!("{w}");
            }
            let report = HttpEditorClient
                .health(&decision.url, cfg.timeouts.preflight_ms)
                .with_context(|| format!("health probe against {}", decision.url))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({"endpoint": decision.url, "health": report}))?
            );
            Ok(())
        }
        Command::Classify { name } => {
            let cfg = load_config();
            let verdict = classify(&name, &cfg);
            let out = json!({
                "name": name,
                "classification": verdict,
                "timeoutMs": effective_timeout(&name, &serde_json::Map::new(), &cfg),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}
