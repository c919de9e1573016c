pub mod confirm_popup;
pub mod detail_view;
pub mod help_overlay;
pub mod sidebar;
pub mod status_row;
pub mod task_form;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::ops::forest;

use super::app::{App, Mode};

/// Main render function — dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (1 row) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    // Content: collapsible sidebar tree + detail pane
    if app.sidebar_collapsed {
        detail_view::render_detail(frame, app, chunks[1]);
    } else {
        let sidebar_width = app.sidebar_width.min(chunks[1].width.saturating_sub(10));
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(1)])
            .split(chunks[1]);
        sidebar::render_sidebar(frame, app, columns[0]);
        detail_view::render_detail(frame, app, columns[1]);
    }

    status_row::render_status_row(frame, app, chunks[2]);

    // Popups render on top of everything
    if app.mode == Mode::Form && app.form.is_some() {
        task_form::render_task_form(frame, app, area);
    }
    if app.mode == Mode::Confirm && app.confirm.is_some() {
        confirm_popup::render_confirm_popup(frame, app, area);
    }
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let counts = forest::count_statuses(app.store.tasks());
    let line = Line::from(vec![
        Span::styled(
            " canopy",
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  hierarchical tasks",
            Style::default().fg(app.theme.dim),
        ),
        Span::styled(
            format!("  ·  {}/{} done", counts.completed, counts.total),
            Style::default().fg(app.theme.dim),
        ),
    ]);
    let header =
        Paragraph::new(line).style(Style::default().bg(app.theme.background));
    frame.render_widget(header, area);
}

/// A centered rect of at most the given size, for popups
pub(super) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
