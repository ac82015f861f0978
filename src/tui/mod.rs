pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::ThemeColors;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use crate::journal::Journal;

/// Browse the journal full screen until the user quits.
pub async fn run_browser(journal: &Journal) -> anyhow::Result<()> {
    let entries = journal.load_entries()?;
    let mut app = App::new(entries, journal.path().to_path_buf());

    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app, journal).await;
    ratatui::restore();

    // Flush buffered log lines now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

async fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    journal: &Journal,
) -> anyhow::Result<()> {
    let mut events = EventHandler::new(250);

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match events.next().await {
            Event::Key(key) => {
                if handle_key_event(app, key) == Action::Reload {
                    match journal.load_entries() {
                        Ok(entries) => app.replace_entries(entries),
                        Err(e) => {
                            tracing::warn!(error = %e, "journal reload failed");
                            app.show_flash(format!("Failed to reload: {}", e));
                        }
                    }
                }
            }
            Event::Tick => app.update_flash(),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Work the key handler can't do without the journal
#[derive(Debug, PartialEq, Eq)]
enum Action {
    None,
    Reload,
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> Action {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            // Quit
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Char('J') | KeyCode::PageDown => app.scroll_detail_down(),
            KeyCode::Char('K') | KeyCode::PageUp => app.scroll_detail_up(),

            // Search
            KeyCode::Char('/') => app.start_search(),
            KeyCode::Esc => app.clear_filter(),

            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Char('?') => app.show_help(),

            _ => {}
        },
        app::InputMode::Search => match key.code {
            KeyCode::Enter => app.confirm_search(),
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Backspace => {
                app.search_input.pop();
            }
            KeyCode::Char(c) => app.search_input.push(c),
            // Ignore all other keys (don't propagate to Normal mode)
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
    Action::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn sample_app() -> App {
        App::new(
            vec![
                "[2024-01-01 09:00:00] NEW DECISION\nDecision: Learn Rust".to_string(),
                "[2024-01-02 09:00:00] NEW DECISION\nDecision: Buy a bike".to_string(),
            ],
            PathBuf::from("journal.txt"),
        )
    }

    #[test]
    fn test_search_keys_filter_entries() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('/'));
        // 'q' and 'j' are text while searching
        type_text(&mut app, "qjx");
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "BIKE");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.visible, vec![1]);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.visible, vec![1, 0]);
    }

    #[test]
    fn test_escape_cancels_search_input() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "rust");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(app.filter.is_none());
        assert_eq!(app.visible.len(), 2);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = sample_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, app::InputMode::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_and_reload_keys() {
        let mut app = sample_app();
        assert_eq!(press(&mut app, KeyCode::Char('r')), Action::Reload);
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
