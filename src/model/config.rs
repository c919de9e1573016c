use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme color overrides (hex strings like "#3DDC84"), keyed by the
    /// theme field names in `tui::theme::Theme`.
    #[serde(default)]
    pub colors: HashMap<String, String>,
}
