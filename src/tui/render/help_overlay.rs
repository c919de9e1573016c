use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::super::app::App;
use super::centered_rect;

const KEYS: &[(&str, &str)] = &[
    ("j / k", "move cursor"),
    ("g / G", "jump to top / bottom"),
    ("Enter", "select task (reveals it in the tree)"),
    ("1-9", "jump to the nth subtask of the selection"),
    ("Space", "toggle completion (cascades to subtasks)"),
    ("s", "cycle status: todo → in-progress → paused → completed"),
    ("p", "cycle priority: low → medium → high → urgent"),
    ("a / A", "add root task / add subtask under cursor"),
    ("e", "edit task under cursor"),
    ("d", "delete task under cursor (with subtree)"),
    ("D", "delete all tasks"),
    ("m", "seed sample tasks"),
    ("Tab / l / h", "toggle / expand / collapse subtasks"),
    ("b", "collapse or restore the sidebar"),
    ("[ / ]", "shrink / grow the sidebar"),
    ("Esc", "dismiss the error message"),
    ("?", "toggle this help"),
    ("q", "quit"),
];

/// Render the scrollable help overlay
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let height = (KEYS.len() as u16 + 4).min(area.height);
    let popup = centered_rect(58, height, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight))
        .title(Span::styled(
            " Keys ",
            Style::default()
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(app.theme.background));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let scroll = app.help_scroll.min(KEYS.len().saturating_sub(1));
    let lines: Vec<Line> = KEYS
        .iter()
        .skip(scroll)
        .map(|(key, description)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<12}", key),
                    Style::default().fg(app.theme.highlight),
                ),
                Span::styled(*description, Style::default().fg(app.theme.text)),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(app.theme.background)),
        inner,
    );
}
