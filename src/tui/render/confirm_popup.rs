use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::super::app::{App, Confirm};
use super::centered_rect;

/// Render the destructive-action confirmation popup
pub fn render_confirm_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(confirm) = &app.confirm else {
        return;
    };

    let message = match confirm {
        Confirm::Delete(_, title, 0) => format!("Delete '{}'?", title),
        Confirm::Delete(_, title, descendants) => {
            format!("Delete '{}' and {} subtask(s)?", title, descendants)
        }
        Confirm::ClearAll => "Delete ALL tasks? This cannot be undone.".to_string(),
        Confirm::Sample => "Replace the current tasks with the sample tree?".to_string(),
    };

    let width = (message.len() as u16 + 6).max(30);
    let popup = centered_rect(width, 5, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red))
        .title(Span::styled(
            " Confirm ",
            Style::default()
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(app.theme.background));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.text_bright),
        )),
        Line::default(),
        Line::from(Span::styled(
            " y confirm · n cancel",
            Style::default().fg(app.theme.dim),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(app.theme.background)),
        inner,
    );
}
