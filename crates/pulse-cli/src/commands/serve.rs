//! Server command implementation

use anyhow::Result;
use pulse_core::PulseConfig;

pub async fn cmd_serve(mut config: PulseConfig, host: Option<&str>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host.to_string();
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("🚀 Starting Pulse web server...");
    println!(
        "   Listening: http://{}:{}",
        config.server.host, config.server.port
    );
    if config.ai.is_active() {
        println!(
            "   🤖 AI provider: {} ({})",
            config.ai.provider,
            config.ai.resolved_model()
        );
    } else {
        println!("   📊 Heuristic only: {}", config.ai.inactive_reason().unwrap_or("AI inactive"));
    }
    if !config.server.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {}",
            config.server.allowed_origins.join(", ")
        );
    }
    println!();

    pulse_server::serve_with_config(config).await
}
