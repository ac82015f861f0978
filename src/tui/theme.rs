//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

/// Color palette for the history browser
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Entry kind colors
    pub decision: Color,
    pub reflection: Color,
    pub log: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Detail pane
    pub divider_color: Color,
    pub field_label: Color,
    pub search_match: Style,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            decision: Color::Cyan,
            reflection: Color::Magenta,
            log: Color::Gray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            divider_color: Color::Indexed(238),
            field_label: Color::Yellow,
            search_match: Style::new().fg(Color::Black).bg(Color::Yellow),
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    /// Color for an entry label as produced by the summarizer
    pub fn label_color(&self, label: &str) -> Color {
        match label {
            "DECISION" => self.decision,
            "REFLECTION" => self.reflection,
            _ => self.log,
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::dark()
    }
}
