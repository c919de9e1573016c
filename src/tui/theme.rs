use ratatui::style::Color;

use crate::model::config::UiConfig;
use crate::model::task::{CompletionStatus, Priority};

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub blue: Color,
    pub purple: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0A, 0x12, 0x0D),
            text: Color::Rgb(0xA9, 0xC5, 0xAF),
            text_bright: Color::Rgb(0xF2, 0xFF, 0xF5),
            highlight: Color::Rgb(0x3D, 0xDC, 0x84),
            dim: Color::Rgb(0x5E, 0x75, 0x64),
            red: Color::Rgb(0xFF, 0x5C, 0x57),
            yellow: Color::Rgb(0xE5, 0xC0, 0x7B),
            green: Color::Rgb(0x5A, 0xF7, 0x8E),
            cyan: Color::Rgb(0x57, 0xC7, 0xFF),
            blue: Color::Rgb(0x6C, 0xA0, 0xF0),
            purple: Color::Rgb(0xC7, 0x92, 0xEA),
            selection_bg: Color::Rgb(0x14, 0x32, 0x20),
            selection_border: Color::Rgb(0x3D, 0xDC, 0x84),
        }
    }
}

/// Parse a hex color string like "#3DDC84" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from the data-dir config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            if let Some(color) = parse_hex_color(value) {
                match key.as_str() {
                    "background" => theme.background = color,
                    "text" => theme.text = color,
                    "text_bright" => theme.text_bright = color,
                    "highlight" => theme.highlight = color,
                    "dim" => theme.dim = color,
                    "red" => theme.red = color,
                    "yellow" => theme.yellow = color,
                    "green" => theme.green = color,
                    "cyan" => theme.cyan = color,
                    "blue" => theme.blue = color,
                    "purple" => theme.purple = color,
                    "selection_bg" => theme.selection_bg = color,
                    "selection_border" => theme.selection_border = color,
                    _ => {}
                }
            }
        }

        theme
    }

    /// Get the color for a task status
    pub fn status_color(&self, status: CompletionStatus) -> Color {
        match status {
            CompletionStatus::Todo => self.text,
            CompletionStatus::InProgress => self.cyan,
            CompletionStatus::Paused => self.yellow,
            CompletionStatus::Completed => self.green,
        }
    }

    /// Get the color for a task priority
    pub fn priority_color(&self, priority: Priority) -> Color {
        match priority {
            Priority::Low => self.dim,
            Priority::Medium => self.text,
            Priority::High => self.yellow,
            Priority::Urgent => self.red,
        }
    }
}
