//! `genie init` — first-time setup.

use genie_catalog::CapabilityCatalog;
use genie_config::AppConfig;
use std::path::Path;

pub async fn run(
    config: &AppConfig,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));

    println!("Genie setup");
    println!("===========\n");

    if config_path.exists() {
        println!("  Config exists:  {}", config_path.display());
    } else {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  Created config: {}", config_path.display());
    }

    for dir in [&config.agent.workspace_dir, &config.agent.report_dir] {
        std::fs::create_dir_all(dir)?;
    }
    println!("  Workspace:      {}", config.agent.workspace_dir.display());
    println!("  Reports:        {}", config.agent.report_dir.display());

    let catalog = CapabilityCatalog::open(&config.catalog.path).await?;
    let inserted = catalog.seed_defaults().await?;
    let total = catalog.count().await?;
    catalog.close().await;

    if inserted > 0 {
        println!("  Catalog:        seeded {inserted} capabilities at {}", config.catalog.path);
    } else {
        println!("  Catalog:        {total} capabilities at {}", config.catalog.path);
    }

    println!("\nNext: genie run --query \"点击登录按钮\"");
    Ok(())
}
