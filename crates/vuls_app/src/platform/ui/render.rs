use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use vuls_core::{help_entries, AppViewModel, HelpEntry, Keymap, ModalView};

use super::theme::Theme;

const APP_TITLE: &str = "HITCON ZeroDay Vulnerabilities";
const HINT_ENTRIES: usize = 6;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub show_page_numbers: bool,
    pub show_help_bar: bool,
    /// Bottom-bar summary of the active mode's main bindings.
    pub key_hints: String,
}

impl RenderOptions {
    /// Hint line built from the first few help entries of `keymap`.
    pub fn key_hints_for(keymap: &Keymap) -> String {
        help_entries(keymap)
            .iter()
            .take(HINT_ENTRIES)
            .map(|entry| format!("{}: {}", entry.keys, entry.description.to_lowercase()))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Draws one full frame from the view model.
pub fn render(frame: &mut Frame, view: &AppViewModel, options: &RenderOptions, clock: &str) {
    let help_bar_height = if options.show_help_bar { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(help_bar_height),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], options, clock);
    render_status(frame, chunks[1], view, options);
    render_table(frame, chunks[2], view, options);
    if options.show_help_bar {
        render_help_bar(frame, chunks[3], view, options);
    }

    match &view.modal {
        Some(ModalView::Help { entries }) => render_help_modal(frame, entries, options),
        Some(ModalView::JumpPrompt { input }) => render_jump_prompt(frame, input, options),
        None => {}
    }
}

fn render_header(frame: &mut Frame, area: Rect, options: &RenderOptions, clock: &str) {
    let title_style = Style::default()
        .fg(options.theme.primary)
        .add_modifier(Modifier::BOLD);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(clock.len() as u16 + 1)])
        .split(area);
    frame.render_widget(
        Paragraph::new(Span::styled(APP_TITLE, title_style)),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(clock, Style::default().fg(options.theme.secondary))),
        columns[1],
    );
}

fn render_status(frame: &mut Frame, area: Rect, view: &AppViewModel, options: &RenderOptions) {
    let status_style = if view.loading {
        Style::default()
            .fg(options.theme.accent)
            .add_modifier(Modifier::BOLD)
    } else if view.degraded {
        Style::default().fg(Color::LightRed)
    } else {
        Style::default().fg(options.theme.primary)
    };
    let mut spans = vec![Span::styled(view.status_line(), status_style)];
    if !view.loading {
        spans.push(Span::styled(
            " | Press ? for help",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(options.theme.border))
        .title(format!("Mode: {}", view.mode));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_table(frame: &mut Frame, area: Rect, view: &AppViewModel, options: &RenderOptions) {
    let zebra = Style::default().bg(Color::Rgb(28, 28, 36));
    let rows = view.rows.iter().enumerate().map(|(idx, row)| {
        let mut cells = Vec::with_capacity(3);
        if options.show_page_numbers {
            cells.push(Cell::from(row.index.to_string()));
        }
        cells.push(Cell::from(row.title.clone()));
        cells.push(Cell::from(row.url.clone()).style(Style::default().fg(options.theme.secondary)));
        let row_widget = Row::new(cells);
        if idx % 2 == 1 {
            row_widget.style(zebra)
        } else {
            row_widget
        }
    });

    let (widths, header): (Vec<Constraint>, Vec<&str>) = if options.show_page_numbers {
        (
            vec![
                Constraint::Length(4),
                Constraint::Percentage(55),
                Constraint::Min(20),
            ],
            vec!["ID", "Title", "URL"],
        )
    } else {
        (
            vec![Constraint::Percentage(60), Constraint::Min(20)],
            vec!["Title", "URL"],
        )
    };

    let title = if view.loading {
        format!("Page {} (loading)", view.page)
    } else {
        format!("Page {} ({} entries)", view.page, view.rows.len())
    };

    let table = Table::new(rows, widths)
        .header(
            Row::new(header).style(
                Style::default()
                    .fg(options.theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(options.theme.border)),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    state.select(view.cursor);
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_help_bar(frame: &mut Frame, area: Rect, view: &AppViewModel, options: &RenderOptions) {
    let text = match &view.modal {
        Some(ModalView::JumpPrompt { .. }) => "enter: jump  escape: cancel  backspace: delete",
        Some(ModalView::Help { .. }) => "escape/q: close help",
        None => options.key_hints.as_str(),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(options.theme.accent))),
        area,
    );
}

fn render_help_modal(frame: &mut Frame, entries: &[HelpEntry], options: &RenderOptions) {
    let area = centered_rect(64, 70, frame.area());
    frame.render_widget(Clear, area);

    let key_width = entries
        .iter()
        .map(|entry| entry.keys.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{:<key_width$}", entry.keys),
                    Style::default()
                        .fg(options.theme.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(entry.description),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press esc or q to close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title("Help")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(options.theme.accent)),
            )
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_jump_prompt(frame: &mut Frame, input: &str, options: &RenderOptions) {
    let area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("Enter page number:"),
        Line::from(Span::styled(
            format!("> {input}_"),
            Style::default()
                .fg(options.theme.primary)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title("Jump to page")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(options.theme.accent)),
        ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
