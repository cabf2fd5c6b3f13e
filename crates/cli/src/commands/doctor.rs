//! `laozihao doctor`: Diagnose data files and credentials.

use laozihao_config::AppConfig;
use laozihao_store::RecordStore;
use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Laozihao Doctor: System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration before running other checks.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured");
    } else {
        println!("  ⚠️  No API key, set DEEPSEEK_API_KEY to enable /api/chat");
        issues += 1;
    }

    let records = RecordStore::new(&config.data_dir);
    match records.load_brands() {
        Ok(brands) => println!("  ✅ {} brands loaded from {}", brands.len(), config.brands_path().display()),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }
    match records.load_timeline() {
        Ok(events) => println!("  ✅ {} timeline events loaded from {}", events.len(), config.timeline_path().display()),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    if config.server.static_dir.is_dir() {
        println!("  ✅ Static directory {} found", config.server.static_dir.display());
    } else {
        println!("  ⚠️  No static directory at {}, only the API will be served", config.server.static_dir.display());
        issues += 1;
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
