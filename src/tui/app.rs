use crate::journal::{matches, summarize, EntrySummary};
use crate::tui::theme::ThemeColors;
use std::path::PathBuf;
use std::time::Instant;

/// How long a flash message stays in the status bar
const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Search,
    Help,
}

pub struct App {
    /// Journal entries in file order (oldest first)
    pub entries: Vec<String>,
    /// Indices into `entries` currently shown, newest first
    pub visible: Vec<usize>,
    pub table_state: ratatui::widgets::TableState,
    pub input_mode: InputMode,
    pub search_input: String,
    pub filter: Option<String>,
    pub flash_message: Option<(String, Instant)>,
    pub detail_scroll: u16,
    pub should_quit: bool,
    pub journal_path: PathBuf,
    pub theme: ThemeColors,
}

impl App {
    pub fn new(entries: Vec<String>, journal_path: PathBuf) -> Self {
        let mut app = Self {
            entries,
            visible: Vec::new(),
            table_state: ratatui::widgets::TableState::default(),
            input_mode: InputMode::Normal,
            search_input: String::new(),
            filter: None,
            flash_message: None,
            detail_scroll: 0,
            should_quit: false,
            journal_path,
            theme: ThemeColors::default(),
        };
        app.apply_filter();
        app
    }

    fn apply_filter(&mut self) {
        let entries = &self.entries;
        self.visible = match &self.filter {
            Some(keyword) => (0..entries.len())
                .rev()
                .filter(|&i| matches(&entries[i], keyword))
                .collect(),
            None => (0..entries.len()).rev().collect(),
        };
        self.table_state
            .select(if self.visible.is_empty() { None } else { Some(0) });
        self.detail_scroll = 0;
    }

    pub fn visible_summaries(&self) -> Vec<EntrySummary> {
        self.visible
            .iter()
            .map(|&i| summarize(&self.entries[i]))
            .collect()
    }

    pub fn selected_entry(&self) -> Option<&String> {
        self.table_state
            .selected()
            .and_then(|row| self.visible.get(row))
            .map(|&i| &self.entries[i])
    }

    pub fn next_row(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
        self.detail_scroll = 0;
    }

    pub fn previous_row(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
        self.detail_scroll = 0;
    }

    pub fn scroll_detail_down(&mut self) {
        let max = self
            .selected_entry()
            .map(|entry| entry.lines().count().saturating_sub(1) as u16)
            .unwrap_or(0);
        self.detail_scroll = (self.detail_scroll + 1).min(max);
    }

    pub fn scroll_detail_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input = self.filter.clone().unwrap_or_default();
    }

    pub fn confirm_search(&mut self) {
        self.input_mode = InputMode::Normal;
        let keyword = std::mem::take(&mut self.search_input);

        if keyword.trim().is_empty() {
            self.filter = None;
            self.apply_filter();
            self.show_flash("No keyword entered".to_string());
            return;
        }

        self.filter = Some(keyword.clone());
        self.apply_filter();
        if self.visible.is_empty() {
            self.show_flash(format!("No entries match '{}'", keyword));
        } else {
            self.show_flash(format!(
                "Found {} entries matching '{}'",
                self.visible.len(),
                keyword
            ));
        }
    }

    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
    }

    pub fn clear_filter(&mut self) {
        if self.filter.take().is_some() {
            self.apply_filter();
            self.show_flash("Filter cleared".to_string());
        }
    }

    /// Swap in a fresh copy of the journal, keeping the current filter.
    pub fn replace_entries(&mut self, entries: Vec<String>) {
        self.entries = entries;
        self.apply_filter();
        self.show_flash(format!("Reloaded {} entries", self.entries.len()));
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }
}
