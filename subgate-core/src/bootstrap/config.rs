//! Configuration loading

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::Config;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SUBGATE_CONFIG_PATH";

fn existing(path: &str) -> Option<String> {
    Path::new(path).exists().then(|| path.to_string())
}

/// Load configuration from a config file and environment variables
///
/// Config file search order:
/// 1. `explicit` (the `--config` flag)
/// 2. `SUBGATE_CONFIG_PATH` environment variable
/// 3. ./config.yaml (current working directory)
/// 4. /config/config.yaml (container mount path)
/// 5. Environment variables only
///
/// Runs before logging is initialised, so progress goes to stderr.
pub fn load_config(explicit: Option<&str>) -> Result<Config> {
    let config_path = explicit
        .and_then(existing)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().as_deref().and_then(existing))
        .or_else(|| existing("config.yaml"))
        .or_else(|| existing("/config/config.yaml"));

    let config = if let Some(path) = config_path {
        eprintln!("Loading config from {path}");
        Config::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load config from {path}: {e}"))?
    } else {
        if let Some(path) = explicit {
            eprintln!("Config file {path} not found, using environment variables");
        }
        Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?
    };

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Config validation error: {error}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    info!(http_address = %config.http_address(), "Configuration loaded and validated");

    Ok(config)
}
