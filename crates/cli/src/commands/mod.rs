pub mod init;
pub mod run;
pub mod search;

use genie_config::AppConfig;
use std::path::Path;

/// Load `path` if given, else the default location; env overrides apply to both.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load()?,
    };
    Ok(config)
}
