//! `laozihao status`: Show the effective configuration.

use laozihao_config::{AppConfig, redact};
use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path.as_deref())
        .map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🏮 Laozihao Status");
    println!("==================");
    println!("  API URL:       {}", config.api_url);
    println!("  API key:       {}", redact(&config.api_key));
    println!("  Model:         {}", config.model);
    println!("  Temperature:   {}", config.temperature);
    println!("  Max tokens:    {}", config.max_tokens);
    println!("  Timeout:       {}s", config.request_timeout_secs);
    println!("  Server:        {}:{}", config.server.host, config.server.port);
    println!("  Static dir:    {}", config.server.static_dir.display());
    println!("  Data dir:      {}", config.data_dir.display());
    println!(
        "  Sessions:      {} turns each, at most {}",
        config.sessions.history_limit, config.sessions.max_sessions
    );

    Ok(())
}
