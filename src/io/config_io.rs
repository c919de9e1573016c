use std::fs;
use std::path::Path;

use crate::model::config::AppConfig;

/// Read config.toml from the data directory, degrading to defaults when the
/// file is missing or malformed.
pub fn load_config(dir: &Path) -> AppConfig {
    let path = dir.join("config.toml");
    fs::read_to_string(&path)
        .ok()
        .and_then(|text| toml::from_str(&text).ok())
        .unwrap_or_default()
}
