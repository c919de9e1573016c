use serde::{Deserialize, Serialize};

/// Narrowest the sidebar can be resized to (columns)
pub const MIN_SIDEBAR_WIDTH: u16 = 20;
/// Widest the sidebar can be resized to (columns)
pub const MAX_SIDEBAR_WIDTH: u16 = 80;

fn default_sidebar_width() -> u16 {
    40
}

/// Persisted UI preferences (written to prefs.json).
/// Missing keys fall back to the defaults: sidebar open, 40 columns wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPrefs {
    #[serde(default)]
    pub is_sidebar_collapsed: bool,
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u16,
}

impl Default for UiPrefs {
    fn default() -> Self {
        UiPrefs {
            is_sidebar_collapsed: false,
            sidebar_width: default_sidebar_width(),
        }
    }
}

impl UiPrefs {
    pub fn clamp_width(width: u16) -> u16 {
        width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_defaults_on_empty_object() {
        let prefs: UiPrefs = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UiPrefs::default());
        assert!(!prefs.is_sidebar_collapsed);
        assert_eq!(prefs.sidebar_width, 40);
    }

    #[test]
    fn test_serde_keys_are_camel_case() {
        let prefs = UiPrefs {
            is_sidebar_collapsed: true,
            sidebar_width: 55,
        };
        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["isSidebarCollapsed"], true);
        assert_eq!(json["sidebarWidth"], 55);
    }

    #[test]
    fn test_clamp_width() {
        assert_eq!(UiPrefs::clamp_width(5), MIN_SIDEBAR_WIDTH);
        assert_eq!(UiPrefs::clamp_width(40), 40);
        assert_eq!(UiPrefs::clamp_width(500), MAX_SIDEBAR_WIDTH);
    }
}
