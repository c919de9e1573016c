use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::model::task::Task;

use super::super::app::App;
use super::super::theme::Theme;

/// How many subtasks the summary lists before eliding
const SUBTASK_PREVIEW: usize = 3;

/// Render the detail pane for the selected task
pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim))
        .title(Span::styled(
            " Task Details ",
            Style::default().fg(app.theme.text_bright),
        ))
        .style(Style::default().bg(app.theme.background));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(task) = app.store.selected_task() else {
        let hint = Paragraph::new("\n\nselect a task to view details")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background))
            .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(hint, inner);
        return;
    };

    let lines = detail_lines(task, &app.theme);
    let detail = Paragraph::new(lines)
        .style(Style::default().bg(app.theme.background))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, inner);
}

fn detail_lines<'a>(task: &'a Task, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    // Status and priority badges
    lines.push(Line::from(vec![
        Span::styled(
            format!(" {} ", task.completion_status.label()),
            Style::default()
                .fg(theme.background)
                .bg(theme.status_color(task.completion_status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", task.priority.label()),
            Style::default()
                .fg(theme.background)
                .bg(theme.priority_color(task.priority))
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::default());

    lines.push(Line::from(Span::styled(
        task.title.as_str(),
        Style::default()
            .fg(theme.text_bright)
            .add_modifier(Modifier::BOLD),
    )));

    if let Some(description) = &task.description {
        for text in description.lines() {
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(theme.text),
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M")),
        Style::default().fg(theme.dim),
    )));
    lines.push(Line::from(Span::styled(
        format!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M")),
        Style::default().fg(theme.dim),
    )));

    if task.has_children() {
        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(
                "Subtasks ",
                Style::default()
                    .fg(theme.text_bright)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{}/{} completed", task.completed_children(), task.children.len()),
                Style::default().fg(theme.dim),
            ),
        ]));

        for (i, child) in task.children.iter().take(SUBTASK_PREVIEW).enumerate() {
            let checkbox = format!(
                "  {}) [{}] ",
                i + 1,
                child.completion_status.checkbox_char()
            );
            let title_style = if child.completed {
                Style::default()
                    .fg(theme.dim)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(theme.text)
            };
            lines.push(Line::from(vec![
                Span::styled(
                    checkbox,
                    Style::default().fg(theme.status_color(child.completion_status)),
                ),
                Span::styled(child.title.as_str(), title_style),
            ]));
        }
        if task.children.len() > SUBTASK_PREVIEW {
            lines.push(Line::from(Span::styled(
                format!(
                    "  and {} more subtasks…",
                    task.children.len() - SUBTASK_PREVIEW
                ),
                Style::default().fg(theme.dim),
            )));
        }
        lines.push(Line::from(Span::styled(
            "  (1-9 jumps to a subtask)",
            Style::default().fg(theme.dim),
        )));
    }

    lines
}
