use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::forest;

use super::super::app::App;

/// Render the bottom status row: persistence errors take priority over the
/// ambient hints.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(error) = app.store.error() {
        Line::from(vec![Span::styled(
            format!(" ✗ {} (Esc to dismiss)", error),
            Style::default()
                .fg(app.theme.red)
                .add_modifier(Modifier::BOLD),
        )])
    } else {
        let counts = forest::count_statuses(app.store.tasks());
        Line::from(vec![
            Span::styled(
                format!(
                    " {} open · {} in progress · {} done",
                    counts.todo, counts.in_progress, counts.completed
                ),
                Style::default().fg(app.theme.dim),
            ),
            Span::styled("   ? help · q quit", Style::default().fg(app.theme.dim)),
        ])
    };

    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(app.theme.background)),
        area,
    );
}
