use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::filter::Filter;
use crate::render::{Row, View};

use super::app::{Mode, StatusKind, UiState};
use super::editor::LineInput;

const PLACEHOLDER: &str = "What needs to be done?";
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_INPUT: Color = Color::Rgb(180, 156, 92);

pub fn render(frame: &mut Frame, state: &UiState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_tabs(frame, &state.view, chunks[0]);
    render_input(frame, state, chunks[1]);
    render_list(frame, state, chunks[2]);
    render_footer(frame, state, chunks[3]);
}

fn tab_color(filter: Filter) -> Color {
    match filter {
        Filter::All => COLOR_INFO,
        Filter::Active => COLOR_WARNING,
        Filter::Completed => COLOR_SUCCESS,
    }
}

fn tab_count(view: &View, filter: Filter) -> usize {
    match filter {
        Filter::All => view.total,
        Filter::Active => view.remaining,
        Filter::Completed => view.total - view.remaining,
    }
}

fn render_tabs(frame: &mut Frame, view: &View, area: Rect) {
    let mut spans = Vec::new();
    for (idx, tab) in view.filters.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let text = format!(
            "{} {} ({})",
            idx + 1,
            tab.filter.label(),
            tab_count(view, tab.filter)
        );
        let style = if tab.active {
            Style::default()
                .fg(tab_color(tab.filter))
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_input(frame: &mut Frame, state: &UiState, area: Rect) {
    let (title, input, focused) = match &state.mode {
        Mode::Browse => ("New task", &state.new_task, false),
        Mode::Adding => ("New task", &state.new_task, true),
        Mode::Editing { .. } => ("Edit task", &state.edit, true),
    };

    let line = if input.is_empty() && !focused {
        Line::from(Span::styled(
            PLACEHOLDER,
            Style::default()
                .fg(COLOR_MUTED_DARK)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from(Span::styled(
            input.value().to_string(),
            Style::default().fg(COLOR_TEXT),
        ))
    };

    let border = if focused {
        COLOR_BORDER_INPUT
    } else {
        COLOR_BG_MUTED
    };
    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(widget, area);

    if focused {
        place_cursor(frame, input, area);
    }
}

fn place_cursor(frame: &mut Frame, input: &LineInput, area: Rect) {
    let max = area.width.saturating_sub(3);
    let offset = (input.cursor() as u16).min(max);
    frame.set_cursor(area.x + 1 + offset, area.y + 1);
}

fn render_list(frame: &mut Frame, state: &UiState, area: Rect) {
    let view = &state.view;
    let content_width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();

    if view.rows.is_empty() {
        let message = match view.filter {
            _ if view.total == 0 => "No tasks".to_string(),
            Filter::All => "No tasks".to_string(),
            other => format!("No {} tasks", other.as_str()),
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let height = area.height.saturating_sub(2) as usize;
        let (start, end) = list_window(view.rows.len(), state.selected, height);
        let editing = match &state.mode {
            Mode::Editing { id } => Some(id.as_str()),
            _ => None,
        };
        for (pos, row) in view.rows.iter().enumerate().take(end).skip(start) {
            let selected = pos == state.selected && state.mode == Mode::Browse;
            let editing = editing == Some(row.id.as_str());
            lines.push(render_row(row, selected, editing, content_width));
        }
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Tasks: {}", view.filter.label()))
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

fn render_row(row: &Row, selected: bool, editing: bool, width: usize) -> Line<'static> {
    let cursor = if selected || editing { "> " } else { "  " };
    let (mark, mark_style) = if row.completed {
        ("[x]", Style::default().fg(COLOR_SUCCESS))
    } else {
        ("[ ]", Style::default().fg(COLOR_MUTED))
    };
    let mut title_style = if row.completed {
        Style::default()
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(COLOR_TEXT)
    };
    if editing {
        title_style = title_style.fg(COLOR_BORDER_INPUT);
    }

    let title_width = width.saturating_sub(cursor.len() + mark.len() + 1);
    let mut line = Line::from(vec![
        Span::styled(cursor, Style::default().fg(COLOR_ACCENT)),
        Span::styled(mark, mark_style),
        Span::raw(" "),
        Span::styled(truncate(&row.title, title_width), title_style),
    ]);
    if selected {
        line = line.style(Style::default().bg(COLOR_BG_MUTED));
    }
    line
}

fn render_footer(frame: &mut Frame, state: &UiState, area: Rect) {
    let hint_span = Span::styled(state.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = state.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status.to_string(), status_style),
        ])
    } else {
        Line::from(hint_span)
    };

    let mut counts = vec![Span::styled(
        state.view.remaining_label.clone(),
        Style::default().fg(COLOR_ACCENT),
    )];
    if state.view.has_completed {
        counts.push(Span::raw("  "));
        counts.push(Span::styled(
            "c clear completed",
            Style::default().fg(COLOR_MUTED),
        ));
    }

    let widget = Paragraph::new(vec![line, Line::from(counts)])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

/// Visible `[start, end)` range keeping `selected` on screen.
fn list_window(len: usize, selected: usize, height: usize) -> (usize, usize) {
    if height == 0 || len <= height {
        return (0, len);
    }
    let start = selected.saturating_sub(height - 1).min(len - height);
    (start, start + height)
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }
    let mut out: String = value.chars().take(width - 3).collect();
    out.push_str("...");
    out
}
