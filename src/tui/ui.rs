use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use crate::output::truncate_title;
use crate::tui::app::{App, InputMode};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 6 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    // Body: list on the left, full entry on the right
    let body = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_title(frame, chunks[0], app);
    render_table(frame, body[0], app);
    render_detail(frame, body[1], app);
    render_status_bar(frame, chunks[2], app);

    if app.input_mode == InputMode::Help {
        render_help_popup(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        "Decision Journal",
        Style::default().fg(theme.title_color).bold(),
    )];

    let path_text = app.journal_path.display().to_string();
    let left_len = "Decision Journal".len();
    let padding_len = (area.width as usize).saturating_sub(left_len + path_text.chars().count());
    if padding_len > 0 {
        spans.push(Span::raw(" ".repeat(padding_len)));
        spans.push(Span::styled(path_text, Style::default().fg(theme.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme.clone();
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(theme.divider_color));

    if app.visible.is_empty() {
        let text = match &app.filter {
            Some(keyword) => format!("No entries match '{}'", keyword),
            None => "No journal entries yet".to_string(),
        };
        let empty_msg = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.muted))
            .block(block);
        frame.render_widget(empty_msg, area);
        return;
    }

    // Space left for the title after index, date and kind columns
    let title_width = (area.width as usize).saturating_sub(4 + 11 + 11 + 4).max(8);

    let rows: Vec<Row> = app
        .visible_summaries()
        .into_iter()
        .enumerate()
        .map(|(idx, summary)| {
            let date = summary
                .header
                .strip_prefix('[')
                .and_then(|rest| rest.get(..10))
                .unwrap_or("")
                .to_string();
            let title = summary
                .title
                .unwrap_or_else(|| summary.header.clone());

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(date).style(Style::default().fg(theme.muted)),
                Cell::from(summary.label)
                    .style(Style::default().fg(theme.label_color(summary.label))),
                Cell::from(truncate_title(&title, title_width)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Date", "Kind", "Title"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected)
        .block(block);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(entry) = app.selected_entry() else {
        return;
    };

    let mut lines = entry.lines();
    let mut text: Vec<Line> = Vec::new();
    if let Some(header) = lines.next() {
        text.push(Line::from(Span::styled(
            header.to_string(),
            Style::default().fg(theme.title_color).bold(),
        )));
    }
    for line in lines {
        text.push(detail_line(line, app));
    }

    let detail = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0))
        .block(Block::default().padding(ratatui::widgets::Padding::horizontal(1)));
    frame.render_widget(detail, area);
}

/// Style a body line: field labels highlighted, filter hits marked.
fn detail_line<'a>(line: &'a str, app: &App) -> Line<'a> {
    let theme = &app.theme;
    if let Some(keyword) = &app.filter {
        let lower = line.to_lowercase();
        let needle = keyword.to_lowercase();
        // Byte offsets only line up when lowercasing kept the length
        if lower.len() == line.len() {
            if let Some(start) = lower.find(&needle) {
                let end = start + needle.len();
                return Line::from(vec![
                    Span::raw(&line[..start]),
                    Span::styled(&line[start..end], theme.search_match),
                    Span::raw(&line[end..]),
                ]);
            }
        }
    }

    match line.split_once(": ") {
        Some((label, value)) if !label.starts_with(' ') && !label.starts_with('-') => {
            Line::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(theme.field_label)),
                Span::raw(value),
            ])
        }
        _ => Line::from(line),
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let text = if app.input_mode == InputMode::Search {
        Line::from(vec![
            Span::styled("/", Style::default().fg(theme.status_key_color)),
            Span::raw(format!("{}|", app.search_input)),
            Span::styled(
                "  Enter:search Esc:cancel",
                Style::default().fg(theme.muted),
            ),
        ])
    } else if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("No ") || msg.starts_with("Failed") {
            theme.flash_error
        } else {
            theme.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let count = match &app.filter {
            Some(keyword) => format!("{} of {} entries matching '{}'", app.visible.len(), app.entries.len(), keyword),
            None => format!("{} entries", app.entries.len()),
        };

        let hints = [
            ("j/k", ":nav "),
            ("J/K", ":scroll "),
            ("/", ":search "),
            ("Esc", ":clear "),
            ("r", ":reload "),
            ("?", ":help "),
            ("q", ":quit"),
        ];

        let mut spans = vec![
            Span::styled(count, Style::default().fg(theme.muted)),
            Span::raw("  "),
        ];
        for (key, label) in hints {
            spans.push(Span::styled(key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_help_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered_rect_fixed(46, 13, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let rows = [
        ("j / Down      ", "Next entry"),
        ("k / Up        ", "Previous entry"),
        ("J / PgDn      ", "Scroll entry down"),
        ("K / PgUp      ", "Scroll entry up"),
        ("/             ", "Search by keyword"),
        ("Esc           ", "Clear search"),
        ("r             ", "Reload journal"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Back to menu"),
    ];

    let mut help_lines: Vec<Line> = rows
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}
