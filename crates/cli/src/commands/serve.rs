//! `laozihao serve`: Start the HTTP server.

use laozihao_config::AppConfig;
use std::path::PathBuf;

pub async fn run(
    port_override: Option<u16>,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(config_path.as_deref())
        .map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.server.port = port;
    }

    println!("🏮 Laozihao");
    println!("   Listening: {}:{}", config.server.host, config.server.port);
    println!("   Data dir:  {}", config.data_dir.display());
    println!(
        "   Chat:      {}",
        if config.has_api_key() { "enabled" } else { "disabled (DEEPSEEK_API_KEY not set)" }
    );

    laozihao_gateway::start(config).await?;

    Ok(())
}
